use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm,
    aead::{AeadInPlace, KeyInit, Nonce, Tag, consts::U12},
};
use cbc::cipher::{
    BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, BlockSizeUser, KeyIvInit, StreamCipher,
    consts::U16, generic_array::GenericArray,
};
use ccm::Ccm;
use chacha20poly1305::ChaCha20Poly1305;

use crate::{
    hal::{
        api::Completion,
        layouts::{AES_BLOCK_SIZE, ArgumentError, CipherMode, Direction, Job, KernelSet, KeyHandle, LaneFamily, MsgLen, Operation},
        oep::{JobDirectImpl, LaneLoadImpl},
    },
    implementation::cpu_ref::{CpuRef, CpuRefLane},
};

type Aes192Gcm = AesGcm<Aes192, U12>;
type Aes128Ccm = Ccm<Aes128, U16, U12>;
type Aes192Ccm = Ccm<Aes192, U16, U12>;
type Aes256Ccm = Ccm<Aes256, U16, U12>;

unsafe impl JobDirectImpl<Self> for CpuRef {
    fn job_direct_impl(kernels: &KernelSet<Self>, job: &mut Job) -> Result<Completion, ArgumentError> {
        match job.op {
            Operation::Cipher {
                mode: CipherMode::AesCbc,
                direction: Direction::Encrypt,
            }
            | Operation::Hash(_)
            | Operation::Mac(_) => single_lane(kernels, job),
            Operation::Cipher { mode, direction } => cipher_direct(mode, direction, job),
        }
    }
}

/// Runs a lane-family job through a one-lane load/advance/finish.
fn single_lane(kernels: &KernelSet<CpuRef>, job: &mut Job) -> Result<Completion, ArgumentError> {
    let family: LaneFamily = job.lane_family().ok_or(ArgumentError::KeyLength {
        got: job.key.as_ref().map_or(0, |key| key.len()),
        expected: "a length matching a lane family",
    })?;
    let mut state: CpuRefLane = CpuRef::lane_load_impl(kernels, family, job)?;
    let len: usize = job.len_bytes();
    if len > 0 {
        let (src, dst) = job.lane_spans();
        state.advance(src, dst, 0, len);
    }
    state.finish(job);
    Ok(Completion::Done)
}

fn cipher_direct(mode: CipherMode, direction: Direction, job: &mut Job) -> Result<Completion, ArgumentError> {
    let len: usize = job.len_bytes();
    let start: usize = job.src_offset;
    job.dst[..len].copy_from_slice(&job.src[start..start + len]);

    if mode == CipherMode::Null {
        return Ok(Completion::Done);
    }

    let key_handle: KeyHandle = job.key.clone().ok_or(ArgumentError::MissingKey)?;
    let key: &[u8] = key_handle.as_bytes();
    let buf: &mut [u8] = &mut job.dst[..len];

    match mode {
        CipherMode::Null => Ok(Completion::Done),
        // Encryption goes through the lane path.
        CipherMode::AesCbc => {
            match key.len() {
                16 => cbc_decrypt::<Aes128>(key, &job.iv, buf)?,
                24 => cbc_decrypt::<Aes192>(key, &job.iv, buf)?,
                32 => cbc_decrypt::<Aes256>(key, &job.iv, buf)?,
                got => return Err(aes_key_length(got)),
            }
            Ok(Completion::Done)
        }
        CipherMode::AesEcb => {
            match key.len() {
                16 => ecb::<Aes128>(key, direction, buf)?,
                24 => ecb::<Aes192>(key, direction, buf)?,
                32 => ecb::<Aes256>(key, direction, buf)?,
                got => return Err(aes_key_length(got)),
            }
            Ok(Completion::Done)
        }
        CipherMode::AesCtr => {
            let mut iv: [u8; 16] = [0u8; 16];
            match job.iv.len() {
                12 => {
                    iv[..12].copy_from_slice(&job.iv);
                    iv[15] = 1;
                }
                16 => iv.copy_from_slice(&job.iv),
                got => {
                    return Err(ArgumentError::IvLength {
                        got,
                        expected: "12 or 16",
                    });
                }
            }
            match key.len() {
                16 => ctr_apply::<Aes128>(key, &iv, buf)?,
                24 => ctr_apply::<Aes192>(key, &iv, buf)?,
                32 => ctr_apply::<Aes256>(key, &iv, buf)?,
                got => return Err(aes_key_length(got)),
            }
            if let MsgLen::Bits(bits) = job.len {
                let rem: usize = bits % 8;
                if rem != 0 {
                    let mask: u8 = 0xFFu8 << (8 - rem);
                    let last: usize = len - 1;
                    job.dst[last] = (job.dst[last] & mask) | (job.src[start + last] & !mask);
                }
            }
            Ok(Completion::Done)
        }
        CipherMode::AesGcm => match key.len() {
            16 => aead_apply::<Aes128Gcm>(key, direction, job),
            24 => aead_apply::<Aes192Gcm>(key, direction, job),
            32 => aead_apply::<Aes256Gcm>(key, direction, job),
            got => Err(aes_key_length(got)),
        },
        CipherMode::AesCcm => match key.len() {
            16 => aead_apply::<Aes128Ccm>(key, direction, job),
            24 => aead_apply::<Aes192Ccm>(key, direction, job),
            32 => aead_apply::<Aes256Ccm>(key, direction, job),
            got => Err(aes_key_length(got)),
        },
        CipherMode::ChaCha20Poly1305 => aead_apply::<ChaCha20Poly1305>(key, direction, job),
    }
}

fn aes_key_length(got: usize) -> ArgumentError {
    ArgumentError::KeyLength {
        got,
        expected: "16, 24 or 32",
    }
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), ArgumentError>
where
    C: BlockDecryptMut + BlockCipher,
    cbc::Decryptor<C>: KeyIvInit + BlockDecryptMut,
{
    let mut dec: cbc::Decryptor<C> = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| ArgumentError::IvLength {
        got: iv.len(),
        expected: "16",
    })?;
    buf.chunks_exact_mut(AES_BLOCK_SIZE)
        .for_each(|block| dec.decrypt_block_mut(GenericArray::from_mut_slice(block)));
    Ok(())
}

fn ecb<C>(key: &[u8], direction: Direction, buf: &mut [u8]) -> Result<(), ArgumentError>
where
    C: KeyInit + BlockEncrypt + BlockDecrypt,
{
    let cipher: C = C::new_from_slice(key).map_err(|_| aes_key_length(key.len()))?;
    buf.chunks_exact_mut(AES_BLOCK_SIZE).for_each(|block| {
        let block = GenericArray::from_mut_slice(block);
        match direction {
            Direction::Encrypt => cipher.encrypt_block(block),
            Direction::Decrypt => cipher.decrypt_block(block),
        }
    });
    Ok(())
}

fn ctr_apply<C>(key: &[u8], iv: &[u8; 16], buf: &mut [u8]) -> Result<(), ArgumentError>
where
    C: BlockEncryptMut + BlockCipher + BlockSizeUser<BlockSize = U16>,
    ctr::Ctr128BE<C>: KeyIvInit + StreamCipher,
{
    let mut ctr: ctr::Ctr128BE<C> = ctr::Ctr128BE::<C>::new_from_slices(key, iv).map_err(|_| aes_key_length(key.len()))?;
    ctr.apply_keystream(buf);
    Ok(())
}

/// Encrypts in place and writes the detached tag, or verifies the supplied
/// tag and decrypts. A tag mismatch zeroes the destination.
fn aead_apply<A>(key: &[u8], direction: Direction, job: &mut Job) -> Result<Completion, ArgumentError>
where
    A: AeadInPlace + KeyInit,
{
    let len: usize = job.len_bytes();
    let cipher: A = A::new_from_slice(key).map_err(|_| ArgumentError::KeyLength {
        got: key.len(),
        expected: "a length supported by the AEAD",
    })?;
    if job.iv.len() != Nonce::<A>::default().len() {
        return Err(ArgumentError::IvLength {
            got: job.iv.len(),
            expected: "12",
        });
    }
    let nonce: &Nonce<A> = Nonce::<A>::from_slice(&job.iv);
    let buf: &mut [u8] = &mut job.dst[..len];

    match direction {
        Direction::Encrypt => {
            let tag: Tag<A> = cipher
                .encrypt_in_place_detached(nonce, &job.aad, buf)
                .map_err(|_| ArgumentError::LengthOverflow)?;
            job.tag.copy_from_slice(&tag);
            Ok(Completion::Done)
        }
        Direction::Decrypt => {
            if job.tag.len() != Tag::<A>::default().len() {
                return Err(ArgumentError::TagLength {
                    got: job.tag.len(),
                    min: Tag::<A>::default().len(),
                    max: Tag::<A>::default().len(),
                });
            }
            let tag: &Tag<A> = Tag::<A>::from_slice(&job.tag);
            match cipher.decrypt_in_place_detached(nonce, &job.aad, buf, tag) {
                Ok(()) => Ok(Completion::Done),
                Err(_) => {
                    log::debug!("AEAD tag mismatch for job user_data={}", job.user_data);
                    job.dst[..len].fill(0);
                    Ok(Completion::AuthFailed)
                }
            }
        }
    }
}
