use mbcrypt_backend::{
    Backend, CipherMode, Completion, Direction, Job, JobDirect, JobStatus, KernelSet, KeyHandle, LaneFamily,
    VectorKernel,
};
use sampling::{distributions::Distributions, source::Source};

use crate::{
    manager::LaneManager,
    queue::SubmissionQueue,
    test_suite::{admit, four_wide, hmac_sha256_job},
};

fn one_shot<B: Backend>(kernels: &KernelSet<B>, job: &Job) -> Vec<u8>
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut reference: Job = job.clone();
    assert_eq!(kernels.job_direct(&mut reference), Ok(Completion::Done));
    reference.output().to_vec()
}

/// Jobs of lengths [64, 128, 64, 256] on a 4-wide manager complete as
/// [1, 3, 2, 4]: jobs 1 and 3 finish in the same round and come out in lane
/// order.
pub fn test_manager_out_of_order<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let kernels: KernelSet<B> = four_wide(&kernels);
    let mut source: Source = Source::new([0u8; 32]);
    let mut queue: SubmissionQueue = SubmissionQueue::new();
    let mut manager: LaneManager<B> = LaneManager::new(LaneFamily::HmacSha256, 4);

    let jobs: Vec<Job> = [64usize, 128, 64, 256]
        .iter()
        .zip(1u64..)
        .map(|(len, id)| hmac_sha256_job(&mut source, *len, id))
        .collect();
    let expected: Vec<Vec<u8>> = jobs.iter().map(|job| one_shot(&kernels, job)).collect();

    jobs.into_iter().for_each(|job| {
        let job: Job = admit(&mut queue, job);
        assert!(manager.submit(&kernels, job).is_none());
    });
    assert_eq!(manager.occupied(), 4);

    let mut order: Vec<u64> = Vec::new();
    let mut take = |job: Job| {
        assert_eq!(job.status(), &JobStatus::Completed);
        assert_eq!(job.output(), &expected[job.user_data as usize - 1][..]);
        order.push(job.user_data);
    };

    take(manager.flush(&kernels).unwrap());
    take(manager.get_completed().unwrap());
    assert!(manager.get_completed().is_none());
    take(manager.flush(&kernels).unwrap());
    take(manager.flush(&kernels).unwrap());
    assert!(manager.flush(&kernels).is_none());

    assert_eq!(order, vec![1, 3, 2, 4]);
    assert_eq!(manager.rounds(), 3);
    assert_eq!(manager.occupied(), 0);
}

/// A submit that finds every lane busy pays exactly one round.
pub fn test_manager_full_submit_runs_one_round<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let kernels: KernelSet<B> = four_wide(&kernels);
    let mut source: Source = Source::new([1u8; 32]);
    let mut queue: SubmissionQueue = SubmissionQueue::new();
    let mut manager: LaneManager<B> = LaneManager::new(LaneFamily::HmacSha256, 4);

    [64usize, 32, 96, 32].iter().zip(1u64..).for_each(|(len, id)| {
        let job: Job = admit(&mut queue, hmac_sha256_job(&mut source, *len, id));
        assert!(manager.submit(&kernels, job).is_none());
    });
    assert_eq!(manager.rounds(), 0);

    let fifth: Job = admit(&mut queue, hmac_sha256_job(&mut source, 128, 5));
    let done: Job = manager.submit(&kernels, fifth).unwrap();
    assert_eq!(done.user_data, 2);
    assert_eq!(manager.rounds(), 1);
    assert_eq!(manager.occupied(), 3);
    assert_eq!(manager.pending_finished(), 1);
    assert_eq!(manager.min_remaining(), Some(32));

    // The new job took the lowest freed lane; the other freed lane stays free.
    assert_eq!(manager.lanes()[1].job().map(|job| job.user_data), Some(5));
    assert_eq!(manager.lanes()[1].cursor(), Some(0));
    assert!(manager.lanes()[3].is_free());

    // Job 4 finished before anything the next round completes.
    assert_eq!(manager.flush(&kernels).map(|job| job.user_data), Some(4));
    assert_eq!(manager.get_completed().map(|job| job.user_data), Some(1));
    assert!(manager.get_completed().is_none());
}

pub fn test_manager_idle_flush<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut manager: LaneManager<B> = LaneManager::new(LaneFamily::Sha256, kernels.lane_width(LaneFamily::Sha256));
    assert!(manager.flush(&kernels).is_none());
    assert!(manager.get_completed().is_none());
    assert_eq!(manager.rounds(), 0);
}

pub fn test_manager_width_one_is_synchronous<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut source: Source = Source::new([2u8; 32]);
    let mut queue: SubmissionQueue = SubmissionQueue::new();
    let mut manager: LaneManager<B> = LaneManager::new(LaneFamily::HmacSha256, 1);

    let job: Job = hmac_sha256_job(&mut source, 300, 9);
    let expected: Vec<u8> = one_shot(&kernels, &job);
    let done: Job = manager.submit(&kernels, admit(&mut queue, job)).unwrap();

    assert_eq!(done.status(), &JobStatus::Completed);
    assert_eq!(done.output(), &expected[..]);
    assert_eq!(manager.occupied(), 0);
    assert_eq!(manager.rounds(), 0);
    assert_eq!(manager.synchronous(), 1);
}

/// Lanes are reused many times with the same key and fresh IVs: no chaining
/// value or cursor may leak from one occupant to the next.
pub fn test_manager_lane_hygiene<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let kernels: KernelSet<B> = four_wide(&kernels);
    let mut source: Source = Source::new([3u8; 32]);
    let mut queue: SubmissionQueue = SubmissionQueue::new();
    let mut manager: LaneManager<B> = LaneManager::new(LaneFamily::Aes128CbcEnc, 4);
    let key: KeyHandle = KeyHandle::from(source.bytes(16));
    let shapes: [Distributions; 2] = [Distributions::fixed(64), Distributions::uniform(1, 160)];

    let mut expected: Vec<Vec<u8>> = Vec::new();
    let mut returned: Vec<Job> = Vec::new();

    (0..64u64).for_each(|id| {
        let len: usize = shapes[id as usize % 2].sample_len_aligned(&mut source, 16);
        let job: Job = Job::cipher(
            CipherMode::AesCbc,
            Direction::Encrypt,
            key.clone(),
            &source.bytes(16),
            source.bytes(len),
        )
        .with_user_data(id);
        expected.push(one_shot(&kernels, &job));
        if let Some(done) = manager.submit(&kernels, admit(&mut queue, job)) {
            returned.push(done);
        }
        returned.extend(std::iter::from_fn(|| manager.get_completed()));
    });
    while let Some(done) = manager.flush(&kernels) {
        returned.push(done);
        returned.extend(std::iter::from_fn(|| manager.get_completed()));
    }

    assert_eq!(returned.len(), 64);
    assert!(manager.lanes().iter().all(|lane| lane.is_free()));
    returned.iter().for_each(|job| {
        assert_eq!(job.status(), &JobStatus::Completed);
        assert_eq!(job.output(), &expected[job.user_data as usize][..], "job {}", job.user_data);
    });
}
