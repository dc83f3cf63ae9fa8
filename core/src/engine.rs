use std::collections::VecDeque;

use mbcrypt_backend::{
    ArgumentError, Backend, Capabilities, Job, KernelSet, KernelSetNew, LaneFamily, Operation, VectorKernel,
};

use crate::{
    config::{ConfigError, EngineConfig},
    manager::{LaneManager, run_direct},
    queue::SubmissionQueue,
};

/// Counters accumulated over the life of an [`Engine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Jobs passed to `submit` or `submit_burst`.
    pub submitted: u64,
    /// Jobs handed back to the caller, in any terminal status.
    pub returned: u64,
    /// Jobs rejected by validation.
    pub invalid: u64,
    /// Jobs completed without entering a lane.
    pub synchronous: u64,
    /// Lane rounds run across all families.
    pub rounds: u64,
}

/// Top-level scheduler: one [`LaneManager`] per [`LaneFamily`], the
/// [`SubmissionQueue`] and the kernel set bound at construction.
///
/// Jobs move in through [`Engine::submit`] and come back out exactly once,
/// through `submit`, [`Engine::flush`] or [`Engine::get_completed`].
pub struct Engine<B: Backend> {
    kernels: KernelSet<B>,
    managers: Vec<LaneManager<B>>,
    queue: SubmissionQueue,
    ready: VecDeque<Job>,
    submitted: u64,
    returned: u64,
    invalid: u64,
    synchronous: u64,
}

impl<B: Backend> Engine<B>
where
    KernelSet<B>: KernelSetNew<B>,
{
    /// Engine bound to the capabilities of the running CPU.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::detect())
    }

    /// Engine bound to the detected capabilities, lowered by
    /// `MBCRYPT_FORCE_TIER` / `MBCRYPT_SHA_EXT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_config(&EngineConfig::from_env()?))
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::with_capabilities(config.resolve(Capabilities::detect()))
    }

    pub fn with_capabilities(caps: Capabilities) -> Self {
        Self::with_kernels(KernelSet::<B>::new(caps))
    }
}

impl<B: Backend> Engine<B> {
    pub fn with_kernels(kernels: KernelSet<B>) -> Self {
        if kernels.is_degraded() {
            log::warn!(
                "baseline vector capability unavailable: {} runs every job synchronously",
                B::name()
            );
        }
        log::debug!(
            "binding {} kernels: tier={} sha_ext={}",
            B::name(),
            kernels.tier(),
            kernels.capabilities().sha_ext
        );

        let managers: Vec<LaneManager<B>> = LaneFamily::ALL
            .iter()
            .map(|family| LaneManager::new(*family, kernels.lane_width(*family)))
            .collect();

        Self {
            kernels,
            managers,
            queue: SubmissionQueue::new(),
            ready: VecDeque::new(),
            submitted: 0,
            returned: 0,
            invalid: 0,
            synchronous: 0,
        }
    }

    pub fn kernels(&self) -> &KernelSet<B> {
        &self.kernels
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kernels.capabilities()
    }

    pub fn is_degraded(&self) -> bool {
        self.kernels.is_degraded()
    }

    pub fn lane_width(&self, family: LaneFamily) -> usize {
        self.managers[family.index()].width()
    }

    pub fn occupied(&self, family: LaneFamily) -> usize {
        self.managers[family.index()].occupied()
    }

    pub fn manager(&self, family: LaneFamily) -> &LaneManager<B> {
        &self.managers[family.index()]
    }

    /// Jobs accepted but not handed back yet: queued, in a lane, or finished
    /// and waiting for [`Engine::get_completed`].
    pub fn queue_size(&self) -> usize {
        self.queue.len()
            + self.ready.len()
            + self
                .managers
                .iter()
                .map(|manager| manager.occupied() + manager.pending_finished())
                .sum::<usize>()
    }

    /// Returns a job finished by an earlier round without running one.
    pub fn get_completed(&mut self) -> Option<Job> {
        let job: Option<Job> = self.ready.pop_front();
        self.hand_back(job)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            submitted: self.submitted,
            returned: self.returned,
            invalid: self.invalid,
            synchronous: self.synchronous + self.managers.iter().map(LaneManager::synchronous).sum::<u64>(),
            rounds: self.managers.iter().map(LaneManager::rounds).sum(),
        }
    }

    fn hand_back(&mut self, job: Option<Job>) -> Option<Job> {
        if job.is_some() {
            self.returned += 1;
        }
        job
    }

    fn reject(&mut self, mut job: Job, err: ArgumentError) -> Job {
        log::debug!("job user_data={} rejected: {err}", job.user_data);
        job.mark_invalid(err);
        self.invalid += 1;
        job
    }

    fn collect_finished(&mut self, family: LaneFamily) {
        self.ready.extend(self.managers[family.index()].take_finished());
    }
}

impl<B: Backend> Engine<B>
where
    KernelSet<B>: VectorKernel<B>,
{
    /// Submits one job.
    ///
    /// A job handed back earlier may be submitted again: it is reset to
    /// `Init` first. Returns the submitted job itself when it fails
    /// validation. Otherwise, when the call completed a job (synchronously or
    /// through a forced round), returns the oldest finished job.
    pub fn submit(&mut self, mut job: Job) -> Option<Job> {
        self.submitted += 1;
        job.reset();
        if let Err(err) = job.validate() {
            let job: Job = self.reject(job, err);
            return self.hand_back(Some(job));
        }
        self.admit(job)
    }

    /// Like [`Engine::submit`] without validation.
    ///
    /// # Panics
    /// May panic on a job that [`Job::validate`] would reject.
    pub fn submit_nocheck(&mut self, mut job: Job) -> Option<Job> {
        self.submitted += 1;
        job.reset();
        self.admit(job)
    }

    /// Validates and queues every job, then drains the queue into the lanes.
    /// Returns the rejected jobs followed by as many finished jobs, oldest
    /// first, as the burst completed.
    pub fn submit_burst<I>(&mut self, jobs: I) -> Vec<Job>
    where
        I: IntoIterator<Item = Job>,
    {
        self.burst(jobs, |_| true, "mixed")
    }

    /// [`Engine::submit_burst`] restricted to cipher jobs. Any other job is
    /// rejected with [`ArgumentError::OperationClass`].
    pub fn submit_cipher_burst<I>(&mut self, jobs: I) -> Vec<Job>
    where
        I: IntoIterator<Item = Job>,
    {
        self.burst(jobs, |op| matches!(op, Operation::Cipher { .. }), "cipher")
    }

    /// [`Engine::submit_burst`] restricted to hash and MAC jobs.
    pub fn submit_hash_burst<I>(&mut self, jobs: I) -> Vec<Job>
    where
        I: IntoIterator<Item = Job>,
    {
        self.burst(jobs, |op| matches!(op, Operation::Hash(_) | Operation::Mac(_)), "hash")
    }

    /// Forces a round on the family whose shortest occupied lane finishes
    /// first and returns the oldest finished job. Does nothing when no lane
    /// is occupied.
    pub fn flush(&mut self) -> Option<Job> {
        let family: LaneFamily = self
            .managers
            .iter()
            .filter_map(|manager| manager.min_remaining().map(|rem| (rem, manager.family())))
            .min()?
            .1;

        let job: Option<Job> = self.managers[family.index()].flush(&self.kernels);
        self.ready.extend(job);
        self.collect_finished(family);
        let job: Option<Job> = self.ready.pop_front();
        self.hand_back(job)
    }

    /// Drains the engine: returns every outstanding job in completion order.
    pub fn flush_all(&mut self) -> Vec<Job> {
        let mut out: Vec<Job> = Vec::with_capacity(self.queue_size());
        loop {
            if let Some(job) = self.get_completed() {
                out.push(job);
            } else if let Some(job) = self.flush() {
                out.push(job);
            } else {
                break;
            }
        }
        debug_assert_eq!(self.queue_size(), 0);
        out
    }

    fn admit(&mut self, job: Job) -> Option<Job> {
        self.queue.push(job);
        let job: Option<Job> = if self.drain_queue() > 0 {
            self.ready.pop_front()
        } else {
            None
        };
        self.hand_back(job)
    }

    fn burst<I, F>(&mut self, jobs: I, accepts: F, class: &'static str) -> Vec<Job>
    where
        I: IntoIterator<Item = Job>,
        F: Fn(&Operation) -> bool,
    {
        let mut out: Vec<Job> = Vec::new();
        jobs.into_iter().for_each(|mut job| {
            self.submitted += 1;
            job.reset();
            let checked: Result<(), ArgumentError> = if accepts(&job.op) {
                job.validate()
            } else {
                Err(ArgumentError::OperationClass { expected: class })
            };
            match checked {
                Ok(()) => {
                    self.queue.push(job);
                }
                Err(err) => out.push(self.reject(job, err)),
            }
        });

        let finished: usize = self.drain_queue();
        out.extend(self.ready.drain(..finished));
        self.returned += out.len() as u64;
        out
    }

    /// Dispatches every queued job and returns how many jobs finished.
    fn drain_queue(&mut self) -> usize {
        let before: usize = self.ready.len();
        while let Some(job) = self.queue.pop() {
            self.dispatch(job);
        }
        self.ready.len() - before
    }

    /// Finished jobs are appended to `ready`, oldest first.
    fn dispatch(&mut self, job: Job) {
        match job.lane_family() {
            Some(family) => {
                let done: Option<Job> = self.managers[family.index()].submit(&self.kernels, job);
                self.ready.extend(done);
                self.collect_finished(family);
            }
            None => {
                self.synchronous += 1;
                let done: Job = run_direct(&self.kernels, job);
                self.ready.push_back(done);
            }
        }
    }
}

impl<B: Backend> Default for Engine<B>
where
    KernelSet<B>: KernelSetNew<B>,
{
    fn default() -> Self {
        Self::new()
    }
}
