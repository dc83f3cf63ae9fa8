use std::collections::VecDeque;

use mbcrypt_backend::{
    Backend, Completion, Job, JobDirect, KernelSet, LaneAdvance, LaneFamily, LaneFinish, LaneLoad, LaneSlot,
    MAX_LANES, VectorKernel,
};

use crate::lane::Lane;

/// Runs a validated job outside the lanes and settles its terminal status.
pub(crate) fn run_direct<B: Backend>(kernels: &KernelSet<B>, mut job: Job) -> Job
where
    KernelSet<B>: VectorKernel<B>,
{
    match kernels.job_direct(&mut job) {
        Ok(Completion::Done) => job.mark_completed(),
        Ok(Completion::AuthFailed) => job.mark_auth_failed(),
        Err(err) => job.mark_invalid(err),
    }
    job
}

/// Fixed-width array of lanes for one algorithm family.
///
/// Each round advances every occupied lane by the smallest remaining length
/// among them, so at least one job completes per round. Completion order is
/// therefore shortest-remaining-first, not submission order.
pub struct LaneManager<B: Backend> {
    family: LaneFamily,
    lanes: Vec<Lane<B>>,
    occupied: usize,
    finished: VecDeque<Job>,
    rounds: u64,
    synchronous: u64,
}

impl<B: Backend> LaneManager<B> {
    /// # Panics
    /// Panics if `width` is not a power of two in `1..=MAX_LANES`.
    pub fn new(family: LaneFamily, width: usize) -> Self {
        assert!(
            width.is_power_of_two() && width <= MAX_LANES,
            "invalid lane width {width} for {family:?}"
        );
        Self {
            family,
            lanes: (0..width).map(Lane::new).collect(),
            occupied: 0,
            finished: VecDeque::new(),
            rounds: 0,
            synchronous: 0,
        }
    }

    pub fn family(&self) -> LaneFamily {
        self.family
    }

    pub fn width(&self) -> usize {
        self.lanes.len()
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn lanes(&self) -> &[Lane<B>] {
        &self.lanes
    }

    /// Rounds run so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Jobs completed without entering a lane.
    pub fn synchronous(&self) -> u64 {
        self.synchronous
    }

    /// Finished jobs not handed back yet.
    pub fn pending_finished(&self) -> usize {
        self.finished.len()
    }

    /// Smallest remaining length over occupied lanes.
    pub fn min_remaining(&self) -> Option<usize> {
        self.lanes.iter().filter_map(Lane::remaining).min()
    }

    /// Places a `Queued` job of this family.
    ///
    /// Width-1 managers and zero-length jobs complete synchronously. Otherwise
    /// the job takes a free lane, or, when every lane is busy, exactly one
    /// round runs first. Whenever the call completes a job, the oldest
    /// finished job is returned and the rest stay queued behind it.
    pub fn submit(&mut self, kernels: &KernelSet<B>, mut job: Job) -> Option<Job>
    where
        KernelSet<B>: VectorKernel<B>,
    {
        if self.width() == 1 || job.len_bytes() == 0 {
            self.synchronous += 1;
            self.finished.push_back(run_direct(kernels, job));
            return self.finished.pop_front();
        }

        let state: B::LaneState = match kernels.lane_load(self.family, &job) {
            Ok(state) => state,
            Err(err) => {
                job.mark_invalid(err);
                return Some(job);
            }
        };

        let forced: bool = self.occupied == self.width();
        if forced {
            self.round(kernels);
        }

        let lane: &mut Lane<B> = match self.lanes.iter_mut().find(|lane| lane.is_free()) {
            Some(lane) => lane,
            None => panic!("{:?}: no free lane after a round", self.family),
        };
        lane.occupy(job, state);
        self.occupied += 1;
        self.check_accounting();

        if forced {
            self.finished.pop_front()
        } else {
            None
        }
    }

    /// Forces one round if any lane is occupied and returns the oldest
    /// finished job. Does nothing when no lane is occupied.
    pub fn flush(&mut self, kernels: &KernelSet<B>) -> Option<Job>
    where
        KernelSet<B>: VectorKernel<B>,
    {
        if self.occupied == 0 {
            return None;
        }
        self.round(kernels);
        self.finished.pop_front()
    }

    /// Returns the oldest finished job. Never runs a round.
    pub fn get_completed(&mut self) -> Option<Job> {
        self.finished.pop_front()
    }

    pub(crate) fn take_finished(&mut self) -> impl Iterator<Item = Job> + '_ {
        self.finished.drain(..)
    }

    /// Advances every occupied lane by the shortest remaining length and
    /// appends the jobs that finished, in lane order, to `finished`.
    fn round(&mut self, kernels: &KernelSet<B>)
    where
        KernelSet<B>: VectorKernel<B>,
    {
        assert!(self.occupied > 0, "{:?}: round without occupied lanes", self.family);

        let min_len: usize = self.min_remaining().unwrap_or(0);
        assert!(min_len > 0, "{:?}: occupied lane with nothing left to process", self.family);

        {
            let mut slots: Vec<LaneSlot<'_, B>> = self.lanes.iter_mut().map(Lane::slot).collect();
            kernels.lane_advance(self.family, &mut slots, min_len);
        }
        self.rounds += 1;

        log::trace!(
            "{:?} round {}: occupied={}/{} min_len={min_len}",
            self.family,
            self.rounds,
            self.occupied,
            self.width()
        );

        let before: usize = self.finished.len();
        for lane in self.lanes.iter_mut() {
            if !lane.advance(min_len) {
                continue;
            }
            let Some((mut job, state)) = lane.release() else {
                continue;
            };
            kernels.lane_finish(self.family, state, &mut job);
            job.mark_completed();
            self.occupied -= 1;
            self.finished.push_back(job);
        }

        self.check_accounting();
        assert!(self.finished.len() > before, "{:?}: round completed no job", self.family);
    }

    fn check_accounting(&self) {
        assert!(
            self.occupied <= self.width(),
            "{:?}: occupied={} exceeds width={}",
            self.family,
            self.occupied,
            self.width()
        );
        debug_assert_eq!(
            self.occupied,
            self.lanes.iter().filter(|lane| !lane.is_free()).count(),
            "{:?}: lane occupancy out of sync",
            self.family
        );
    }
}
