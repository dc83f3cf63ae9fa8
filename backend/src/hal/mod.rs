/// Safe, user-facing kernel traits implemented on [`layouts::KernelSet`].
pub mod api;

/// Blanket implementations connecting [`api`] traits to [`oep`] traits on
/// [`layouts::KernelSet`].
pub mod delegates;

/// Backend-agnostic data types: jobs, lane families, lane slots, capability
/// tiers and the bound kernel set.
pub mod layouts;

/// Open Extension Points: `unsafe` traits that backends implement.
pub mod oep;
