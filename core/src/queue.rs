use std::collections::VecDeque;

use mbcrypt_backend::Job;

/// FIFO of validated jobs waiting for a lane.
///
/// Every pushed job is stamped with a monotonically increasing admission
/// index. The queue runs no cryptography.
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    jobs: VecDeque<Job>,
    next_admission: u64,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps `job` and marks it `Queued`, returning its admission index.
    pub fn push(&mut self, mut job: Job) -> u64 {
        let admission: u64 = self.next_admission;
        self.next_admission += 1;
        job.mark_queued(admission);
        self.jobs.push_back(job);
        admission
    }

    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Admission index the next pushed job will receive.
    pub fn next_admission(&self) -> u64 {
        self.next_admission
    }
}

#[cfg(test)]
mod tests {
    use mbcrypt_backend::{HashAlg, Job, JobStatus};

    use super::SubmissionQueue;

    #[test]
    fn fifo_with_monotonic_admission() {
        let mut queue: SubmissionQueue = SubmissionQueue::new();
        (0..5u64).for_each(|i| {
            assert_eq!(queue.push(Job::hash(HashAlg::Sha1, vec![0u8; 8]).with_user_data(i)), i);
        });
        assert_eq!(queue.len(), 5);
        (0..5u64).for_each(|i| {
            let job: Job = queue.pop().unwrap();
            assert_eq!(job.user_data, i);
            assert_eq!(job.admission_index(), Some(i));
            assert_eq!(job.status(), &JobStatus::Queued);
        });
        assert!(queue.is_empty());
        assert_eq!(queue.next_admission(), 5);
    }
}
