use crate::hal::{
    api::{Completion, JobDirect, LaneAdvance, LaneFinish, LaneLoad},
    layouts::{ArgumentError, Backend, Job, KernelSet, LaneFamily, LaneSlot},
    oep::{JobDirectImpl, LaneAdvanceImpl, LaneFinishImpl, LaneLoadImpl},
};

impl<B> LaneLoad<B> for KernelSet<B>
where
    B: Backend + LaneLoadImpl<B>,
{
    fn lane_load(&self, family: LaneFamily, job: &Job) -> Result<B::LaneState, ArgumentError> {
        B::lane_load_impl(self, family, job)
    }
}

impl<B> LaneAdvance<B> for KernelSet<B>
where
    B: Backend + LaneAdvanceImpl<B>,
{
    fn lane_advance(&self, family: LaneFamily, lanes: &mut [LaneSlot<'_, B>], len: usize) {
        #[cfg(debug_assertions)]
        {
            assert!(len > 0, "lane_advance called with len=0");
            assert!(
                lanes.len() <= self.lane_width(family),
                "{} slots passed to a {}-wide {family:?} kernel",
                lanes.len(),
                self.lane_width(family)
            );
        }
        B::lane_advance_impl(self, family, lanes, len)
    }
}

impl<B> LaneFinish<B> for KernelSet<B>
where
    B: Backend + LaneFinishImpl<B>,
{
    fn lane_finish(&self, family: LaneFamily, state: B::LaneState, job: &mut Job) {
        B::lane_finish_impl(self, family, state, job)
    }
}

impl<B> JobDirect for KernelSet<B>
where
    B: Backend + JobDirectImpl<B>,
{
    fn job_direct(&self, job: &mut Job) -> Result<Completion, ArgumentError> {
        B::job_direct_impl(self, job)
    }
}
