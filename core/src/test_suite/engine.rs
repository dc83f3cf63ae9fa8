use std::collections::HashMap;

use itertools::izip;
use mbcrypt_backend::{
    ArgumentError, Backend, Capabilities, CapabilityTier, CipherMode, Direction, HashAlg, Job, JobStatus, KernelSet, KernelSetNew,
    KeyHandle, LaneFamily, MacAlg, VectorKernel,
};
use sampling::source::Source;

use crate::{
    engine::{Engine, EngineStats},
    test_suite::{four_wide, hmac_sha256_job, random_job},
};

fn reference_engine<B: Backend>() -> Engine<B>
where
    KernelSet<B>: KernelSetNew<B>,
{
    Engine::with_capabilities(Capabilities::new(CapabilityTier::Scalar, false))
}

/// Output of `job` computed by a degraded engine, where every job runs
/// synchronously.
fn reference_output<B: Backend>(reference: &mut Engine<B>, job: &Job) -> (JobStatus, Vec<u8>, Vec<u8>)
where
    KernelSet<B>: VectorKernel<B> + KernelSetNew<B>,
{
    match reference.submit(job.clone()) {
        Some(done) => (done.status().clone(), done.dst.clone(), done.tag.clone()),
        None => panic!("degraded engine kept job {} in a lane", job.user_data),
    }
}

/// Every submitted job comes back exactly once, completed, with the same
/// output as the synchronous path.
pub fn test_engine_completeness<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B> + KernelSetNew<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut reference: Engine<B> = reference_engine();
    let mut source: Source = Source::new([4u8; 32]);

    let jobs: Vec<Job> = (0..300u64).map(|id| random_job(&mut source, id)).collect();
    let expected: HashMap<u64, (JobStatus, Vec<u8>, Vec<u8>)> = jobs
        .iter()
        .map(|job| (job.user_data, reference_output(&mut reference, job)))
        .collect();

    let mut returned: Vec<Job> = Vec::new();
    jobs.into_iter().for_each(|job| {
        returned.extend(engine.submit(job));
        assert!(engine.queue_size() <= 300);
    });
    returned.extend(engine.flush_all());

    assert_eq!(returned.len(), 300);
    assert_eq!(engine.queue_size(), 0);
    let mut seen: Vec<bool> = vec![false; 300];
    returned.iter().for_each(|job| {
        let id: usize = job.user_data as usize;
        assert!(!seen[id], "job {id} returned twice");
        seen[id] = true;

        let (status, dst, tag) = &expected[&job.user_data];
        assert_eq!(job.status(), &JobStatus::Completed, "job {id}");
        assert_eq!(job.status(), status, "job {id}");
        assert_eq!(&job.dst, dst, "job {id} dst");
        assert_eq!(&job.tag, tag, "job {id} tag");
    });

    let stats: EngineStats = engine.stats();
    assert_eq!(stats.submitted, 300);
    assert_eq!(stats.returned, 300);
    assert_eq!(stats.invalid, 0);
}

/// Every round completes at least one lane job, so rounds never exceed the
/// number of jobs that went through lanes.
pub fn test_engine_progress<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([5u8; 32]);

    let mut returned: usize = 0;
    (0..200u64).for_each(|id| {
        returned += engine.submit(random_job(&mut source, id)).into_iter().count();
    });
    returned += engine.flush_all().len();

    let stats: EngineStats = engine.stats();
    assert_eq!(returned, 200);
    assert!(stats.rounds + stats.synchronous <= 200, "{stats:?}");
}

/// A family never holds more jobs than its width and widths follow the
/// bound capabilities.
pub fn test_engine_width_bound<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let caps: Capabilities = kernels.capabilities();
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([6u8; 32]);

    LaneFamily::ALL.iter().for_each(|family| {
        assert_eq!(engine.lane_width(*family), caps.lane_width(*family), "{family:?}");
    });

    (0..200u64).for_each(|id| {
        let _ = engine.submit(random_job(&mut source, id));
        LaneFamily::ALL.iter().for_each(|family| {
            assert!(engine.occupied(*family) <= engine.lane_width(*family), "{family:?}");
        });
    });
    let _ = engine.flush_all();
}

pub fn test_engine_idle_flush<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    assert!(engine.flush().is_none());
    assert!(engine.get_completed().is_none());
    assert_eq!(engine.stats(), EngineStats::default());

    let mut source: Source = Source::new([7u8; 32]);
    let _ = engine.submit(hmac_sha256_job(&mut source, 640, 0));
    let _ = engine.flush_all();
    assert!(engine.flush().is_none());
    assert_eq!(engine.queue_size(), 0);
}

/// Invalid jobs come straight back, never occupy a lane and leave
/// `queue_size` untouched.
pub fn test_engine_validation<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([8u8; 32]);

    let _ = engine.submit(hmac_sha256_job(&mut source, 1000, 0));
    let before: usize = engine.queue_size();
    let rounds: u64 = engine.stats().rounds;

    let ragged: Job = Job::cipher(
        CipherMode::AesCbc,
        Direction::Encrypt,
        KeyHandle::from(source.bytes(16)),
        &source.bytes(16),
        source.bytes(33),
    )
    .with_user_data(1);
    let done: Job = engine.submit(ragged).unwrap();
    assert_eq!(
        done.status(),
        &JobStatus::InvalidArgs(ArgumentError::NotBlockMultiple { len: 33, block: 16 })
    );
    assert_eq!(done.admission_index(), None);

    let keyless: Job = Job::new(
        mbcrypt_backend::Operation::Mac(mbcrypt_backend::MacAlg::HmacSha1),
        source.bytes(64),
    );
    assert_eq!(
        engine.submit(keyless).unwrap().error(),
        Some(&ArgumentError::MissingKey)
    );

    assert_eq!(engine.queue_size(), before);
    assert_eq!(engine.stats().rounds, rounds);
    assert_eq!(engine.stats().invalid, 2);
    LaneFamily::ALL
        .iter()
        .filter(|family| **family != LaneFamily::HmacSha256)
        .for_each(|family| assert_eq!(engine.occupied(*family), 0));
}

/// Without the baseline capability every job completes synchronously with
/// the same results.
pub fn test_engine_degraded<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B> + KernelSetNew<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut degraded: Engine<B> = reference_engine();
    assert!(degraded.is_degraded());
    LaneFamily::ALL
        .iter()
        .for_each(|family| assert_eq!(degraded.lane_width(*family), 1));

    let mut source: Source = Source::new([9u8; 32]);
    let jobs: Vec<Job> = (0..64u64).map(|id| random_job(&mut source, id)).collect();

    let mut fast: Vec<Job> = Vec::new();
    let mut slow: Vec<Job> = Vec::new();
    jobs.into_iter().for_each(|job| {
        fast.extend(engine.submit(job.clone()));
        slow.push(degraded.submit(job).unwrap());
        assert_eq!(degraded.queue_size(), 0);
    });
    fast.extend(engine.flush_all());
    fast.sort_by_key(|job| job.user_data);

    assert_eq!(degraded.stats().rounds, 0);
    assert_eq!(degraded.stats().synchronous, 64);
    izip!(fast.iter(), slow.iter()).for_each(|(a, b)| {
        assert_eq!(a.user_data, b.user_data);
        assert_eq!(a.output(), b.output(), "job {}", a.user_data);
    });
}

pub fn test_engine_zero_length_hash<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let done: Job = engine.submit(Job::hash(HashAlg::Sha256, Vec::new())).unwrap();
    assert_eq!(done.status(), &JobStatus::Completed);
    assert_eq!(done.output()[..4], [0xe3, 0xb0, 0xc4, 0x42]);
    assert_eq!(engine.occupied(LaneFamily::Sha256), 0);
    assert_eq!(engine.queue_size(), 0);
}

pub fn test_engine_burst<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([10u8; 32]);

    let mut jobs: Vec<Job> = (0..100u64).map(|id| random_job(&mut source, id)).collect();
    jobs.push(Job::hash(HashAlg::Sha1, vec![0u8; 4]).with_tag_len(64).with_user_data(100));

    let mut returned: Vec<Job> = engine.submit_burst(jobs);
    assert!(matches!(
        returned.first().map(Job::status),
        Some(JobStatus::InvalidArgs(ArgumentError::TagLength { .. }))
    ));
    assert_eq!(engine.queue_size() + returned.len(), 101);
    returned.extend(engine.flush_all());

    let mut ids: Vec<u64> = returned.iter().map(|job| job.user_data).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..101u64).collect::<Vec<u64>>());
    assert_eq!(engine.stats().returned, 101);
}

/// `queue_size` covers jobs in lanes and jobs finished but not yet fetched.
pub fn test_engine_queue_size<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    if engine.is_degraded() {
        return;
    }
    let width: usize = engine.lane_width(LaneFamily::HmacSha256);
    let mut source: Source = Source::new([11u8; 32]);

    (0..width as u64).for_each(|id| {
        assert!(engine.submit(hmac_sha256_job(&mut source, 64, id)).is_none());
        assert_eq!(engine.queue_size(), id as usize + 1);
    });

    // All lanes finish in the same round: one is returned, the rest wait.
    assert!(engine.flush().is_some());
    assert_eq!(engine.queue_size(), width - 1);
    assert_eq!(engine.occupied(LaneFamily::HmacSha256), 0);
    assert!(engine.flush().is_none());

    (1..width).for_each(|left| {
        assert!(engine.get_completed().is_some());
        assert_eq!(engine.queue_size(), width - 1 - left);
    });
    assert!(engine.get_completed().is_none());
}

pub fn test_engine_aead<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([12u8; 32]);
    let key: KeyHandle = KeyHandle::from(source.bytes(16));
    let nonce: Vec<u8> = source.bytes(12);
    let aad: Vec<u8> = source.bytes(8);
    let pt: Vec<u8> = source.bytes(200);

    let sealed: Job = engine
        .submit(Job::aead(CipherMode::AesGcm, Direction::Encrypt, key.clone(), &nonce, &aad, pt.clone()))
        .unwrap();
    assert_eq!(sealed.status(), &JobStatus::Completed);

    let opened: Job = engine
        .submit(Job::aead(CipherMode::AesGcm, Direction::Decrypt, key.clone(), &nonce, &aad, sealed.dst.clone()).with_tag(&sealed.tag))
        .unwrap();
    assert_eq!(opened.status(), &JobStatus::Completed);
    assert_eq!(opened.output(), &pt[..]);

    let forged: Job = engine
        .submit(Job::aead(CipherMode::AesGcm, Direction::Decrypt, key, &nonce, &source.bytes(8), sealed.dst.clone()).with_tag(&sealed.tag))
        .unwrap();
    assert_eq!(forged.status(), &JobStatus::AuthFailed);
    assert!(forged.output().iter().all(|b| *b == 0));
    assert_eq!(engine.queue_size(), 0);
}

/// Jobs of lengths [64, 128, 64, 256] drained with a plain flush loop come
/// out as [1, 3, 2, 4]: a job left over from an earlier round always comes
/// out before the jobs of a later round.
pub fn test_engine_flush_order<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(four_wide(&kernels));
    let mut source: Source = Source::new([13u8; 32]);

    [64usize, 128, 64, 256].iter().zip(1u64..).for_each(|(len, id)| {
        assert!(engine.submit(hmac_sha256_job(&mut source, *len, id)).is_none());
    });

    let mut order: Vec<u64> = Vec::new();
    while let Some(job) = engine.flush() {
        order.push(job.user_data);
    }
    order.extend(std::iter::from_fn(|| engine.get_completed()).map(|job| job.user_data));
    assert_eq!(order, vec![1, 3, 2, 4]);
    assert_eq!(engine.queue_size(), 0);

    // A forced round on submit hands back the leftover of the previous round
    // before anything it completed itself.
    [64usize, 32, 96, 32].iter().zip(11u64..).for_each(|(len, id)| {
        assert!(engine.submit(hmac_sha256_job(&mut source, *len, id)).is_none());
    });
    assert_eq!(engine.submit(hmac_sha256_job(&mut source, 128, 15)).map(|job| job.user_data), Some(12));
    assert_eq!(engine.flush().map(|job| job.user_data), Some(14));
    assert_eq!(engine.get_completed().map(|job| job.user_data), Some(11));
    let rest: Vec<u64> = engine.flush_all().iter().map(|job| job.user_data).collect();
    assert_eq!(rest, vec![13, 15]);
}

/// A job rejected by validation is resubmitted after its key is corrected,
/// and a completed job can be submitted again.
pub fn test_engine_resubmit<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B> + KernelSetNew<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut reference: Engine<B> = reference_engine();
    let mut source: Source = Source::new([14u8; 32]);

    let iv: Vec<u8> = source.bytes(16);
    let pt: Vec<u8> = source.bytes(96);
    let key: KeyHandle = KeyHandle::from(source.bytes(16));
    let expected: (JobStatus, Vec<u8>, Vec<u8>) = reference_output(
        &mut reference,
        &Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key.clone(), &iv, pt.clone()),
    );

    let bad: Job =
        Job::cipher(CipherMode::AesCbc, Direction::Encrypt, KeyHandle::from(source.bytes(20)), &iv, pt).with_user_data(7);
    let mut back: Job = engine.submit(bad).unwrap();
    assert!(matches!(back.error(), Some(ArgumentError::KeyLength { got: 20, .. })));

    back.key = Some(key);
    let mut returned: Vec<Job> = engine.submit(back).into_iter().collect();
    returned.extend(engine.flush_all());
    assert_eq!(returned.len(), 1);
    let done: Job = returned.remove(0);
    assert_eq!(done.user_data, 7);
    assert_eq!(done.status(), &expected.0);
    assert_eq!(done.dst, expected.1);

    // Completed, then rejected, then accepted again.
    let mut broken: Job = done;
    broken.iv.truncate(8);
    let mut back: Job = engine.submit(broken).unwrap();
    assert!(matches!(back.error(), Some(ArgumentError::IvLength { got: 8, .. })));
    back.iv = iv;
    let mut returned: Vec<Job> = engine.submit(back).into_iter().collect();
    returned.extend(engine.flush_all());
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].status(), &JobStatus::Completed);
    assert_eq!(returned[0].dst, expected.1);

    let stats: EngineStats = engine.stats();
    assert_eq!(stats.submitted, 4);
    assert_eq!(stats.invalid, 2);
    assert_eq!(stats.returned, 4);
}

/// Cipher-only and hash-only bursts reject jobs of the other class.
pub fn test_engine_class_bursts<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut source: Source = Source::new([15u8; 32]);

    let cipher: Job = Job::cipher(
        CipherMode::AesCtr,
        Direction::Encrypt,
        KeyHandle::from(source.bytes(16)),
        &source.bytes(16),
        source.bytes(100),
    )
    .with_user_data(0);
    let hash: Job = Job::hash(HashAlg::Sha1, source.bytes(100)).with_user_data(1);
    let mac: Job = Job::mac(MacAlg::HmacSha384, KeyHandle::from(source.bytes(48)), source.bytes(100)).with_user_data(2);

    let mut returned: Vec<Job> = engine.submit_cipher_burst([cipher.clone(), hash.clone()]);
    assert_eq!(returned[0].user_data, 1);
    assert_eq!(
        returned[0].error(),
        Some(&ArgumentError::OperationClass { expected: "cipher" })
    );
    returned.extend(engine.submit_hash_burst([cipher, hash, mac]));
    returned.extend(engine.flush_all());

    let rejected: Vec<u64> = returned
        .iter()
        .filter(|job| job.error().is_some())
        .map(|job| job.user_data)
        .collect();
    assert_eq!(rejected, vec![1, 0]);
    let mut completed: Vec<u64> = returned
        .iter()
        .filter(|job| job.status() == &JobStatus::Completed)
        .map(|job| job.user_data)
        .collect();
    completed.sort_unstable();
    assert_eq!(completed, vec![0, 1, 2]);
    assert_eq!(engine.stats().invalid, 2);
}

/// Unchecked submission of valid jobs gives the same results as `submit`.
pub fn test_engine_submit_nocheck<B: Backend>(kernels: KernelSet<B>)
where
    KernelSet<B>: VectorKernel<B> + KernelSetNew<B>,
{
    let mut engine: Engine<B> = Engine::with_kernels(kernels);
    let mut reference: Engine<B> = reference_engine();
    let mut source: Source = Source::new([16u8; 32]);

    let jobs: Vec<Job> = (0..100u64).map(|id| random_job(&mut source, id)).collect();
    let expected: HashMap<u64, (JobStatus, Vec<u8>, Vec<u8>)> = jobs
        .iter()
        .map(|job| (job.user_data, reference_output(&mut reference, job)))
        .collect();

    let mut returned: Vec<Job> = Vec::new();
    jobs.into_iter().for_each(|job| returned.extend(engine.submit_nocheck(job)));
    returned.extend(engine.flush_all());

    assert_eq!(returned.len(), 100);
    returned.iter().for_each(|job| {
        let (status, dst, tag) = &expected[&job.user_data];
        assert_eq!(job.status(), status, "job {}", job.user_data);
        assert_eq!(&job.dst, dst, "job {}", job.user_data);
        assert_eq!(&job.tag, tag, "job {}", job.user_data);
    });
}
