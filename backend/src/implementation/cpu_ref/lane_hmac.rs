use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::{
    hal::layouts::{ArgumentError, HashAlg},
    implementation::cpu_ref::write_truncated,
};

/// HMAC with the inner hash already keyed.
pub enum HmacLane {
    Sha1(Hmac<Sha1>),
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
    Md5(Hmac<Md5>),
}

impl HmacLane {
    pub fn new(alg: HashAlg, key: &[u8]) -> Result<Self, ArgumentError> {
        let lane = match alg {
            HashAlg::Sha1 => Hmac::<Sha1>::new_from_slice(key).map(HmacLane::Sha1),
            HashAlg::Sha224 => Hmac::<Sha224>::new_from_slice(key).map(HmacLane::Sha224),
            HashAlg::Sha256 => Hmac::<Sha256>::new_from_slice(key).map(HmacLane::Sha256),
            HashAlg::Sha384 => Hmac::<Sha384>::new_from_slice(key).map(HmacLane::Sha384),
            HashAlg::Sha512 => Hmac::<Sha512>::new_from_slice(key).map(HmacLane::Sha512),
        };
        lane.map_err(|_| key_length(key))
    }

    pub fn md5(key: &[u8]) -> Result<Self, ArgumentError> {
        Hmac::<Md5>::new_from_slice(key)
            .map(HmacLane::Md5)
            .map_err(|_| key_length(key))
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            HmacLane::Sha1(mac) => mac.update(data),
            HmacLane::Sha224(mac) => mac.update(data),
            HmacLane::Sha256(mac) => mac.update(data),
            HmacLane::Sha384(mac) => mac.update(data),
            HmacLane::Sha512(mac) => mac.update(data),
            HmacLane::Md5(mac) => mac.update(data),
        }
    }

    pub fn finalize_into(self, out: &mut [u8]) {
        match self {
            HmacLane::Sha1(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            HmacLane::Sha224(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            HmacLane::Sha256(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            HmacLane::Sha384(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            HmacLane::Sha512(mac) => write_truncated(&mac.finalize().into_bytes(), out),
            HmacLane::Md5(mac) => write_truncated(&mac.finalize().into_bytes(), out),
        }
    }
}

fn key_length(key: &[u8]) -> ArgumentError {
    ArgumentError::KeyLength {
        got: key.len(),
        expected: "at least 1",
    }
}
