mod engine;
mod manager;

pub use engine::*;
pub use manager::*;

use mbcrypt_backend::{Backend, CipherMode, Direction, HashAlg, Job, KernelSet, KeyHandle, LaneFamily, MacAlg};
use sampling::{distributions::Distributions, source::Source};

use crate::queue::SubmissionQueue;

#[macro_export]
macro_rules! engine_test_suite {
    (
        mod $modname:ident,
        backend = $backend:ty,
        caps = $caps:expr,
        tests = {
            $( $(#[$attr:meta])* $test_name:ident => $impl:path ),+ $(,)?
        }
    ) => {
        mod $modname {
            use $crate::backend::{KernelSet, KernelSetNew};

            $(
                $(#[$attr])*
                #[test]
                fn $test_name() {
                    ($impl)(KernelSet::<$backend>::new($caps));
                }
            )+
        }
    };
}

pub(crate) const HASHES: [HashAlg; 5] = [HashAlg::Sha1, HashAlg::Sha224, HashAlg::Sha256, HashAlg::Sha384, HashAlg::Sha512];

pub(crate) const HMACS: [MacAlg; 6] = [
    MacAlg::HmacSha1,
    MacAlg::HmacSha224,
    MacAlg::HmacSha256,
    MacAlg::HmacSha384,
    MacAlg::HmacSha512,
    MacAlg::HmacMd5,
];

/// Same capabilities as `kernels`, with every family four lanes wide.
pub(crate) fn four_wide<B: Backend>(kernels: &KernelSet<B>) -> KernelSet<B> {
    KernelSet::from_widths(kernels.capabilities(), [4; LaneFamily::COUNT])
}

/// Stamps `job` the way the engine does before it reaches a lane manager.
pub(crate) fn admit(queue: &mut SubmissionQueue, job: Job) -> Job {
    queue.push(job);
    match queue.pop() {
        Some(job) => job,
        None => panic!("submission queue lost a job"),
    }
}

pub(crate) fn hmac_sha256_job(source: &mut Source, len: usize, user_data: u64) -> Job {
    Job::mac(MacAlg::HmacSha256, KeyHandle::from(source.bytes(32)), source.bytes(len)).with_user_data(user_data)
}

/// A random job of any supported operation with IMIX-shaped length.
pub(crate) fn random_job(source: &mut Source, user_data: u64) -> Job {
    let shape: Distributions = Distributions::imix();
    let job: Job = match source.next_usize_inclusive(0, 7) {
        0 => {
            let key_len: usize = [16, 24, 32][source.next_usize_inclusive(0, 2)];
            let len: usize = shape.sample_len_aligned(source, 16);
            Job::cipher(
                CipherMode::AesCbc,
                Direction::Encrypt,
                KeyHandle::from(source.bytes(key_len)),
                &source.bytes(16),
                source.bytes(len),
            )
        }
        1 => {
            let (alg, key_len): (MacAlg, usize) = [(MacAlg::AesCmac, 16), (MacAlg::AesCmac, 32), (MacAlg::AesXcbc, 16)]
                [source.next_usize_inclusive(0, 2)];
            let len: usize = shape.sample_len(source);
            Job::mac(alg, KeyHandle::from(source.bytes(key_len)), source.bytes(len))
        }
        2 => {
            let alg: HashAlg = HASHES[source.next_usize_inclusive(0, HASHES.len() - 1)];
            let len: usize = shape.sample_len(source);
            Job::hash(alg, source.bytes(len))
        }
        3 => {
            let alg: MacAlg = HMACS[source.next_usize_inclusive(0, HMACS.len() - 1)];
            let key_len: usize = source.next_usize_inclusive(1, 100);
            let len: usize = shape.sample_len(source);
            Job::mac(alg, KeyHandle::from(source.bytes(key_len)), source.bytes(len))
        }
        4 => {
            let len: usize = shape.sample_len(source);
            Job::cipher(
                CipherMode::AesCtr,
                Direction::Encrypt,
                KeyHandle::from(source.bytes(16)),
                &source.bytes(12),
                source.bytes(len),
            )
        }
        5 => {
            let mode: CipherMode = [CipherMode::AesGcm, CipherMode::AesCcm][source.next_usize_inclusive(0, 1)];
            let len: usize = shape.sample_len(source);
            Job::aead(
                mode,
                Direction::Encrypt,
                KeyHandle::from(source.bytes(32)),
                &source.bytes(12),
                &source.bytes(13),
                source.bytes(len),
            )
        }
        6 => {
            let len: usize = shape.sample_len(source);
            Job::aead(
                CipherMode::ChaCha20Poly1305,
                Direction::Encrypt,
                KeyHandle::from(source.bytes(32)),
                &source.bytes(12),
                &[],
                source.bytes(len),
            )
        }
        _ => {
            let len: usize = shape.sample_len_aligned(source, 16);
            Job::cipher(
                CipherMode::AesCbc,
                Direction::Decrypt,
                KeyHandle::from(source.bytes(16)),
                &source.bytes(16),
                source.bytes(len),
            )
        }
    };
    job.with_user_data(user_data)
}
