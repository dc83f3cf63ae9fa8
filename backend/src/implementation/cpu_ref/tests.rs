use itertools::izip;
use sampling::source::Source;

use crate::{
    hal::{
        api::{Completion, JobDirect, KernelSetNew, LaneAdvance, LaneFinish, LaneLoad},
        layouts::{
            Capabilities, CapabilityTier, CipherMode, Direction, HashAlg, Job, KernelSet, KeyHandle, LaneFamily, LaneSlot, MacAlg,
        },
    },
    implementation::cpu_ref::{CpuRef, CpuRefLane},
};

const SP800_38A_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const SP800_38A_PT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";

fn kernels() -> KernelSet<CpuRef> {
    KernelSet::<CpuRef>::new(Capabilities::new(CapabilityTier::SseGfni, false))
}

fn key(hex_key: &str) -> KeyHandle {
    KeyHandle::from(hex::decode(hex_key).unwrap())
}

fn run_direct(job: &mut Job) -> Completion {
    job.validate().unwrap();
    kernels().job_direct(job).unwrap()
}

#[test]
fn sha_abc() {
    let mut sha256: Job = Job::hash(HashAlg::Sha256, b"abc".to_vec());
    assert_eq!(run_direct(&mut sha256), Completion::Done);
    assert_eq!(
        hex::encode(sha256.output()),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    let mut sha1: Job = Job::hash(HashAlg::Sha1, b"abc".to_vec());
    run_direct(&mut sha1);
    assert_eq!(hex::encode(sha1.output()), "a9993e364706816aba3e25717850c26c9cd0d89d");
}

#[test]
fn sha_empty_message() {
    let mut job: Job = Job::hash(HashAlg::Sha256, Vec::new());
    run_direct(&mut job);
    assert_eq!(
        hex::encode(job.output()),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn aes_cbc_round_trip() {
    let iv: Vec<u8> = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let pt: Vec<u8> = hex::decode(SP800_38A_PT).unwrap();

    let mut enc: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(SP800_38A_KEY), &iv, pt.clone());
    run_direct(&mut enc);
    assert_eq!(
        hex::encode(enc.output()),
        "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
    );

    let mut dec: Job = Job::cipher(CipherMode::AesCbc, Direction::Decrypt, key(SP800_38A_KEY), &iv, enc.dst.clone());
    run_direct(&mut dec);
    assert_eq!(dec.output(), &pt[..]);
}

#[test]
fn aes_ecb() {
    let pt: Vec<u8> = hex::decode(&SP800_38A_PT[..32]).unwrap();
    let mut enc: Job = Job::cipher(CipherMode::AesEcb, Direction::Encrypt, key(SP800_38A_KEY), &[], pt.clone());
    run_direct(&mut enc);
    assert_eq!(hex::encode(enc.output()), "3ad77bb40d7a3660a89ecaf32466ef97");

    let mut dec: Job = Job::cipher(CipherMode::AesEcb, Direction::Decrypt, key(SP800_38A_KEY), &[], enc.dst.clone());
    run_direct(&mut dec);
    assert_eq!(dec.output(), &pt[..]);
}

#[test]
fn aes_ctr() {
    let iv: Vec<u8> = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap();
    let pt: Vec<u8> = hex::decode(&SP800_38A_PT[..32]).unwrap();
    let mut job: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(SP800_38A_KEY), &iv, pt);
    run_direct(&mut job);
    assert_eq!(hex::encode(job.output()), "874d6191b620e3261bef6864990db6ce");
}

#[test]
fn aes_ctr_twelve_byte_iv_starts_at_counter_one() {
    let nonce: [u8; 12] = [7u8; 12];
    let mut full_iv: Vec<u8> = nonce.to_vec();
    full_iv.extend_from_slice(&[0, 0, 0, 1]);
    let pt: Vec<u8> = (0..50u8).collect();

    let mut short: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(SP800_38A_KEY), &nonce, pt.clone());
    let mut long: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(SP800_38A_KEY), &full_iv, pt);
    run_direct(&mut short);
    run_direct(&mut long);
    assert_eq!(short.output(), long.output());
}

#[test]
fn aes_ctr_bit_length_keeps_trailing_source_bits() {
    let iv: [u8; 16] = [0u8; 16];
    let pt: Vec<u8> = vec![0xA5u8; 4];

    let mut bytes: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(SP800_38A_KEY), &iv, pt.clone());
    let mut bits: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(SP800_38A_KEY), &iv, pt).with_bit_len(27);
    run_direct(&mut bytes);
    run_direct(&mut bits);

    assert_eq!(bits.output().len(), 4);
    assert_eq!(&bits.output()[..3], &bytes.output()[..3]);
    // 27 bits: the top 3 bits of byte 3 are encrypted, the low 5 come from the source.
    assert_eq!(bits.output()[3] & 0xE0, bytes.output()[3] & 0xE0);
    assert_eq!(bits.output()[3] & 0x1F, 0xA5 & 0x1F);
}

#[test]
fn aes_cmac() {
    let msg: Vec<u8> = hex::decode(&SP800_38A_PT[..32]).unwrap();
    let mut job: Job = Job::mac(MacAlg::AesCmac, key(SP800_38A_KEY), msg);
    run_direct(&mut job);
    assert_eq!(hex::encode(job.output()), "070a16b46b4d4144f79bdd9dd04a287c");
}

#[test]
fn hmac_sha256_truncated() {
    let mut job: Job = Job::mac(
        MacAlg::HmacSha256,
        KeyHandle::new(b"Jefe"),
        b"what do ya want for nothing?".to_vec(),
    );
    run_direct(&mut job);
    assert_eq!(
        hex::encode(job.output()),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );

    let mut truncated: Job = Job::mac(
        MacAlg::HmacSha256,
        KeyHandle::new(b"Jefe"),
        b"what do ya want for nothing?".to_vec(),
    )
    .with_tag_len(16);
    run_direct(&mut truncated);
    assert_eq!(hex::encode(truncated.output()), "5bdcc146bf60754e6a042426089575c7");
}

#[test]
fn hmac_md5() {
    let mut job: Job = Job::mac(MacAlg::HmacMd5, KeyHandle::new(&[0x0bu8; 16]), b"Hi There".to_vec());
    run_direct(&mut job);
    assert_eq!(hex::encode(job.output()), "9294727a3638bb1c13f48ef8158bfc9d");

    let mut jefe: Job = Job::mac(
        MacAlg::HmacMd5,
        KeyHandle::new(b"Jefe"),
        b"what do ya want for nothing?".to_vec(),
    );
    run_direct(&mut jefe);
    assert_eq!(hex::encode(jefe.output()), "750c783e6ab0b503eaa86e310a5db738");
}

#[test]
fn aes_xcbc() {
    let k: KeyHandle = key("000102030405060708090a0b0c0d0e0f");
    let msg: Vec<u8> = (0u8..34).collect();
    [
        (0usize, "75f0251d528ac01c4573dfd584d79f29"),
        (3, "5b376580ae2f19afe7219ceef172756f"),
        (16, "d2a246fa349b68a79998a4394ff7a263"),
        (20, "47f51b4564966215b8985c63055ed308"),
        (32, "f54f0ec8d2b9f3d36807734bd5283fd4"),
        (34, "becbb3bccdb518a30677d5481fb6b4d8"),
    ]
    .into_iter()
    .for_each(|(len, expected)| {
        let mut job: Job = Job::mac(MacAlg::AesXcbc, k.clone(), msg[..len].to_vec());
        run_direct(&mut job);
        assert_eq!(hex::encode(job.output()), expected, "len={len}");
    });

    let mut mac96: Job = Job::mac(MacAlg::AesXcbc, k, msg[..20].to_vec()).with_tag_len(12);
    run_direct(&mut mac96);
    assert_eq!(hex::encode(mac96.output()), "47f51b4564966215b8985c63");
}

#[test]
fn null_cipher_copies() {
    let mut job: Job = Job::new(
        crate::hal::layouts::Operation::Cipher {
            mode: CipherMode::Null,
            direction: Direction::Encrypt,
        },
        b"plaintext".to_vec(),
    );
    run_direct(&mut job);
    assert_eq!(job.output(), b"plaintext");
}

#[test]
fn aead_round_trip_and_tamper() {
    let mut source: Source = Source::new([3u8; 32]);
    [
        (CipherMode::AesGcm, 16usize),
        (CipherMode::AesGcm, 24),
        (CipherMode::AesGcm, 32),
        (CipherMode::AesCcm, 16),
        (CipherMode::AesCcm, 24),
        (CipherMode::AesCcm, 32),
        (CipherMode::ChaCha20Poly1305, 32),
    ]
    .into_iter()
    .for_each(|(mode, key_len)| {
        let k: KeyHandle = KeyHandle::from(source.bytes(key_len));
        let nonce: Vec<u8> = source.bytes(12);
        let aad: Vec<u8> = source.bytes(20);
        let pt: Vec<u8> = source.bytes(77);

        let mut enc: Job = Job::aead(mode, Direction::Encrypt, k.clone(), &nonce, &aad, pt.clone());
        assert_eq!(run_direct(&mut enc), Completion::Done);
        assert_ne!(enc.output(), &pt[..]);

        let mut dec: Job = Job::aead(mode, Direction::Decrypt, k.clone(), &nonce, &aad, enc.dst.clone()).with_tag(&enc.tag);
        assert_eq!(run_direct(&mut dec), Completion::Done);
        assert_eq!(dec.output(), &pt[..]);

        let mut bad_tag: Vec<u8> = enc.tag.clone();
        bad_tag[0] ^= 1;
        let mut forged: Job = Job::aead(mode, Direction::Decrypt, k, &nonce, &aad, enc.dst.clone()).with_tag(&bad_tag);
        assert_eq!(run_direct(&mut forged), Completion::AuthFailed, "{mode:?}");
        assert!(forged.output().iter().all(|b| *b == 0));
    });
}

/// Drives several lanes in `min remaining` chunks, the way the scheduler does,
/// and checks every lane against one-shot processing.
#[test]
fn chunked_lanes_match_one_shot() {
    let kernels: KernelSet<CpuRef> = KernelSet::from_widths(Capabilities::new(CapabilityTier::Sse, false), [4; LaneFamily::COUNT]);
    let mut source: Source = Source::new([9u8; 32]);

    [
        (LaneFamily::Sha256, MacAlg::HmacSha256, false),
        (LaneFamily::HmacSha512, MacAlg::HmacSha512, true),
        (LaneFamily::Aes128Cmac, MacAlg::AesCmac, true),
        (LaneFamily::Aes128Xcbc, MacAlg::AesXcbc, true),
        (LaneFamily::HmacMd5, MacAlg::HmacMd5, true),
    ]
    .into_iter()
    .for_each(|(family, alg, keyed)| {
        let lens: [usize; 4] = [64, 200, 17, 129];
        let mut jobs: Vec<Job> = lens
            .iter()
            .map(|len| {
                let msg: Vec<u8> = source.bytes(*len);
                if keyed {
                    Job::mac(alg, KeyHandle::from(source.bytes(16)), msg)
                } else {
                    Job::hash(HashAlg::Sha256, msg)
                }
            })
            .collect();
        let expected: Vec<Vec<u8>> = jobs
            .iter()
            .map(|job| {
                let mut one_shot: Job = job.clone();
                run_direct(&mut one_shot);
                one_shot.tag
            })
            .collect();

        let mut states: Vec<CpuRefLane> = jobs
            .iter()
            .map(|job| kernels.lane_load(family, job).unwrap())
            .collect();
        let mut cursors: [usize; 4] = [0; 4];

        while izip!(cursors.iter(), lens.iter()).any(|(c, l)| c < l) {
            let step: usize = izip!(cursors.iter(), lens.iter())
                .filter(|(c, l)| c < l)
                .map(|(c, l)| l - c)
                .min()
                .unwrap();
            let mut slots: Vec<LaneSlot<'_, CpuRef>> = izip!(states.iter_mut(), jobs.iter_mut(), cursors.iter())
                .map(|(state, job, cursor)| {
                    if *cursor < job.len_bytes() {
                        let (src, dst) = job.lane_spans();
                        LaneSlot::Active {
                            state,
                            src,
                            dst,
                            offset: *cursor,
                        }
                    } else {
                        LaneSlot::Inactive
                    }
                })
                .collect();
            kernels.lane_advance(family, &mut slots, step);
            drop(slots);
            izip!(cursors.iter_mut(), lens.iter())
                .filter(|(c, l)| **c < **l)
                .for_each(|(c, _)| *c += step);
        }

        izip!(states.into_iter(), jobs.iter_mut(), expected.iter()).for_each(|(state, job, expected)| {
            kernels.lane_finish(family, state, job);
            assert_eq!(&job.tag, expected, "{family:?}");
        });
    });
}

#[test]
fn cbc_lane_chunks_match_one_shot() {
    let kernels: KernelSet<CpuRef> = kernels();
    let mut source: Source = Source::new([1u8; 32]);
    let k: KeyHandle = KeyHandle::from(source.bytes(24));
    let iv: Vec<u8> = source.bytes(16);
    let pt: Vec<u8> = source.bytes(96);

    let mut one_shot: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, k.clone(), &iv, pt.clone());
    run_direct(&mut one_shot);

    let mut job: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, k, &iv, pt);
    assert_eq!(job.lane_family(), Some(LaneFamily::Aes192CbcEnc));
    let mut state: CpuRefLane = kernels.lane_load(LaneFamily::Aes192CbcEnc, &job).unwrap();
    [0usize, 32, 48].into_iter().zip([32usize, 16, 48]).for_each(|(offset, len)| {
        let (src, dst) = job.lane_spans();
        let mut slots: [LaneSlot<'_, CpuRef>; 2] = [
            LaneSlot::Inactive,
            LaneSlot::Active {
                state: &mut state,
                src,
                dst,
                offset,
            },
        ];
        kernels.lane_advance(LaneFamily::Aes192CbcEnc, &mut slots, len);
    });
    kernels.lane_finish(LaneFamily::Aes192CbcEnc, state, &mut job);
    assert_eq!(job.output(), one_shot.output());
}

#[test]
fn lane_load_rejects_mismatched_key() {
    let job: Job = Job::mac(MacAlg::AesCmac, KeyHandle::new(&[0u8; 24]), vec![0u8; 16]);
    assert!(kernels().lane_load(LaneFamily::Aes128Cmac, &job).is_err());
}
