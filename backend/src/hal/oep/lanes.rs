use crate::hal::{
    api::Completion,
    layouts::{ArgumentError, Backend, Job, KernelSet, LaneFamily, LaneSlot},
};

/// # Safety
/// The returned state must be valid input for [LaneAdvanceImpl] and
/// [LaneFinishImpl] of the same `family`.
pub unsafe trait LaneLoadImpl<B: Backend> {
    fn lane_load_impl(kernels: &KernelSet<B>, family: LaneFamily, job: &Job) -> Result<B::LaneState, ArgumentError>;
}

/// # Safety
/// Implementations must process exactly `len` bytes of every active slot and
/// must not touch inactive slots.
pub unsafe trait LaneAdvanceImpl<B: Backend> {
    fn lane_advance_impl(kernels: &KernelSet<B>, family: LaneFamily, lanes: &mut [LaneSlot<'_, B>], len: usize);
}

/// # Safety
/// See [LaneLoadImpl].
pub unsafe trait LaneFinishImpl<B: Backend> {
    fn lane_finish_impl(kernels: &KernelSet<B>, family: LaneFamily, state: B::LaneState, job: &mut Job);
}

/// # Safety
/// Implementations must fully process a validated job.
pub unsafe trait JobDirectImpl<B: Backend> {
    fn job_direct_impl(kernels: &KernelSet<B>, job: &mut Job) -> Result<Completion, ArgumentError>;
}
