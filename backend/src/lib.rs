//! # mbcrypt-backend
//!
//! Hardware abstraction layer for multi-buffer symmetric crypto kernels.
//!
//! A scheduler packs independent jobs onto the fixed-width lanes of a vector
//! kernel. This crate defines what such a kernel looks like and ships a
//! portable backend implementing it.
//!
//! ## Architecture
//!
//! 1. **[`hal::layouts`]** -- [`Job`], [`LaneSlot`], [`KernelSet`], the
//!    [`Backend`] trait and capability detection ([`CpuFeatures`],
//!    [`CapabilityTier`]).
//! 2. **[`hal::api`]** -- safe traits the scheduler programs against
//!    ([`LaneLoad`], [`LaneAdvance`], [`LaneFinish`], [`JobDirect`], grouped as
//!    [`VectorKernel`]).
//! 3. **[`hal::oep`]** -- `unsafe` extension points a backend implements.
//! 4. **`hal::delegates`** -- blanket impls wiring the api traits to the oep
//!    traits on [`KernelSet`].
//! 5. **[`implementation`]** -- backends. [`CpuRef`] drives the RustCrypto
//!    primitives one lane at a time.
//!
//! ## Lane contract
//!
//! A round hands the kernel up to `W` slots and a length `len > 0`. Every
//! [`LaneSlot::Active`] slot is advanced by exactly `len` bytes from its
//! offset, [`LaneSlot::Inactive`] slots are left alone. The kernel never
//! decides which lanes run or when a job is done: that belongs to the
//! scheduler.
//!
//! ## Non-Goals
//!
//! No claim is made about the side-channel behaviour of the kernels.

pub mod hal;
pub mod implementation;

pub use hal::{api::*, layouts::*};
pub use implementation::cpu_ref::CpuRef;
