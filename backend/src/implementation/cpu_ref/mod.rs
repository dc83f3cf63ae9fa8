//! Portable reference backend.
//!
//! Every lane kernel walks its active slots one after the other using the
//! RustCrypto primitives, so any lane width is accepted and results are
//! bit-identical to one-shot processing. It is the baseline against which
//! vectorised backends are tested.

mod direct;
mod kernel_set;
mod lane_cbc;
mod lane_cmac;
mod lane_hash;
mod lane_hmac;
mod lane_xcbc;
mod lanes;

#[cfg(test)]
mod tests;

use crate::hal::layouts::{Backend, Job};

pub use lane_cbc::AesCbcLane;
pub use lane_cmac::CmacLane;
pub use lane_hash::HashLane;
pub use lane_hmac::HmacLane;
pub use lane_xcbc::XcbcLane;

pub struct CpuRef;

impl Backend for CpuRef {
    type LaneState = CpuRefLane;

    fn name() -> &'static str {
        "cpu-ref"
    }
}

/// Running state of one [CpuRef] lane.
pub enum CpuRefLane {
    AesCbc(AesCbcLane),
    Cmac(CmacLane),
    Hash(HashLane),
    Hmac(HmacLane),
    Xcbc(XcbcLane),
}

impl CpuRefLane {
    /// Processes `src[offset..offset + len]`. Only cipher lanes write `dst`.
    pub(crate) fn advance(&mut self, src: &[u8], dst: &mut [u8], offset: usize, len: usize) {
        let data: &[u8] = &src[offset..offset + len];
        match self {
            CpuRefLane::AesCbc(lane) => lane.encrypt(data, &mut dst[offset..offset + len]),
            CpuRefLane::Cmac(lane) => lane.update(data),
            CpuRefLane::Hash(lane) => lane.update(data),
            CpuRefLane::Hmac(lane) => lane.update(data),
            CpuRefLane::Xcbc(lane) => lane.update(data),
        }
    }

    pub(crate) fn finish(self, job: &mut Job) {
        match self {
            // Ciphertext is already in place.
            CpuRefLane::AesCbc(_) => {}
            CpuRefLane::Cmac(lane) => lane.finalize_into(&mut job.tag),
            CpuRefLane::Hash(lane) => lane.finalize_into(&mut job.tag),
            CpuRefLane::Hmac(lane) => lane.finalize_into(&mut job.tag),
            CpuRefLane::Xcbc(lane) => lane.finalize_into(&mut job.tag),
        }
    }
}

/// Copies the leading `out.len()` bytes of `full` into `out`.
pub(crate) fn write_truncated(full: &[u8], out: &mut [u8]) {
    assert!(out.len() <= full.len(), "tag of {} bytes requested from a {}-byte output", out.len(), full.len());
    out.copy_from_slice(&full[..out.len()]);
}
