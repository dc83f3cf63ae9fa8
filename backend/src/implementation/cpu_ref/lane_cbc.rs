use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, generic_array::GenericArray};

use crate::hal::layouts::{AES_BLOCK_SIZE, ArgumentError};

/// AES-CBC encryption chain: expanded key plus the running IV.
pub enum AesCbcLane {
    Aes128(cbc::Encryptor<Aes128>),
    Aes192(cbc::Encryptor<Aes192>),
    Aes256(cbc::Encryptor<Aes256>),
}

impl AesCbcLane {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, ArgumentError> {
        let lane = match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv).map(Self::Aes128),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv).map(Self::Aes192),
            32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv).map(Self::Aes256),
            got => {
                return Err(ArgumentError::KeyLength {
                    got,
                    expected: "16, 24 or 32",
                });
            }
        };
        lane.map_err(|_| ArgumentError::IvLength {
            got: iv.len(),
            expected: "16",
        })
    }

    /// Encrypts whole blocks of `src` into `dst`, chaining from the previous call.
    pub fn encrypt(&mut self, src: &[u8], dst: &mut [u8]) {
        debug_assert_eq!(src.len() % AES_BLOCK_SIZE, 0, "CBC lane advanced by a partial block");
        dst.copy_from_slice(src);
        match self {
            AesCbcLane::Aes128(enc) => encrypt_blocks(enc, dst),
            AesCbcLane::Aes192(enc) => encrypt_blocks(enc, dst),
            AesCbcLane::Aes256(enc) => encrypt_blocks(enc, dst),
        }
    }
}

fn encrypt_blocks<E: BlockEncryptMut>(enc: &mut E, buf: &mut [u8]) {
    buf.chunks_exact_mut(AES_BLOCK_SIZE)
        .for_each(|block| enc.encrypt_block_mut(GenericArray::from_mut_slice(block)));
}
