use aes::{Aes128, Aes256};
use cmac::{Cmac, Mac};

use crate::{hal::layouts::ArgumentError, implementation::cpu_ref::write_truncated};

pub enum CmacLane {
    Aes128(Cmac<Aes128>),
    Aes256(Cmac<Aes256>),
}

impl CmacLane {
    pub fn new(key: &[u8]) -> Result<Self, ArgumentError> {
        let invalid = || ArgumentError::KeyLength {
            got: key.len(),
            expected: "16 or 32",
        };
        match key.len() {
            16 => Cmac::<Aes128>::new_from_slice(key)
                .map(Self::Aes128)
                .map_err(|_| invalid()),
            32 => Cmac::<Aes256>::new_from_slice(key)
                .map(Self::Aes256)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            CmacLane::Aes128(mac) => mac.update(data),
            CmacLane::Aes256(mac) => mac.update(data),
        }
    }

    pub fn finalize_into(self, out: &mut [u8]) {
        match self {
            CmacLane::Aes128(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            CmacLane::Aes256(mac) => write_truncated(&mac.finalize().into_bytes(), out),
        }
    }
}
