use crate::hal::layouts::{ArgumentError, Backend, Job, LaneFamily, LaneSlot};

/// Outcome of a job executed outside the lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// AEAD tag mismatch, the destination has been zeroed.
    AuthFailed,
}

/// Builds the running state of a lane about to receive `job`
/// (key schedule, IV, initial chaining value).
pub trait LaneLoad<B: Backend> {
    fn lane_load(&self, family: LaneFamily, job: &Job) -> Result<B::LaneState, ArgumentError>;
}

/// Advances every [LaneSlot::Active] slot by exactly `len` bytes from its
/// offset, in a single kernel invocation. [LaneSlot::Inactive] slots are
/// left untouched.
pub trait LaneAdvance<B: Backend> {
    fn lane_advance(&self, family: LaneFamily, lanes: &mut [LaneSlot<'_, B>], len: usize);
}

/// Writes the final output (digest, tag, last chaining value) of a lane
/// whose cursor reached the end of `job`.
pub trait LaneFinish<B: Backend> {
    fn lane_finish(&self, family: LaneFamily, state: B::LaneState, job: &mut Job);
}

/// Runs a validated job to completion without a lane: width-1 families,
/// zero-length messages and modes that have no lane family.
pub trait JobDirect {
    fn job_direct(&self, job: &mut Job) -> Result<Completion, ArgumentError>;
}

/// Everything the scheduler needs from a bound kernel set.
pub trait VectorKernel<B: Backend>: LaneLoad<B> + LaneAdvance<B> + LaneFinish<B> + JobDirect {}

impl<B: Backend, T> VectorKernel<B> for T where T: LaneLoad<B> + LaneAdvance<B> + LaneFinish<B> + JobDirect {}
