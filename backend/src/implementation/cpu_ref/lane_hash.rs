use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::{hal::layouts::HashAlg, implementation::cpu_ref::write_truncated};

pub enum HashLane {
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl HashLane {
    pub fn new(alg: HashAlg) -> Self {
        match alg {
            HashAlg::Sha1 => HashLane::Sha1(Sha1::new()),
            HashAlg::Sha224 => HashLane::Sha224(Sha224::new()),
            HashAlg::Sha256 => HashLane::Sha256(Sha256::new()),
            HashAlg::Sha384 => HashLane::Sha384(Sha384::new()),
            HashAlg::Sha512 => HashLane::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            HashLane::Sha1(h) => h.update(data),
            HashLane::Sha224(h) => h.update(data),
            HashLane::Sha256(h) => h.update(data),
            HashLane::Sha384(h) => h.update(data),
            HashLane::Sha512(h) => h.update(data),
        }
    }

    pub fn finalize_into(self, out: &mut [u8]) {
        match self {
            HashLane::Sha1(h) => write_truncated(&h.finalize(), out),
            HashLane::Sha224(h) => write_truncated(&h.finalize(), out),
            HashLane::Sha256(h) => write_truncated(&h.finalize(), out),
            HashLane::Sha384(h) => write_truncated(&h.finalize(), out),
            HashLane::Sha512(h) => write_truncated(&h.finalize(), out),
        }
    }
}
