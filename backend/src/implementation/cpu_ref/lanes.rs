use crate::{
    hal::{
        layouts::{ArgumentError, HashAlg, Job, KernelSet, LaneFamily, LaneSlot},
        oep::{LaneAdvanceImpl, LaneFinishImpl, LaneLoadImpl},
    },
    implementation::cpu_ref::{AesCbcLane, CmacLane, CpuRef, CpuRefLane, HashLane, HmacLane, XcbcLane},
};

unsafe impl LaneLoadImpl<Self> for CpuRef {
    fn lane_load_impl(_kernels: &KernelSet<Self>, family: LaneFamily, job: &Job) -> Result<CpuRefLane, ArgumentError> {
        let state: CpuRefLane = match family {
            LaneFamily::Aes128CbcEnc | LaneFamily::Aes192CbcEnc | LaneFamily::Aes256CbcEnc => {
                CpuRefLane::AesCbc(AesCbcLane::new(job.key_bytes()?, &job.iv)?)
            }
            LaneFamily::Aes128Cmac | LaneFamily::Aes256Cmac => CpuRefLane::Cmac(CmacLane::new(job.key_bytes()?)?),
            LaneFamily::Aes128Xcbc => CpuRefLane::Xcbc(XcbcLane::new(job.key_bytes()?)?),
            LaneFamily::Sha1 | LaneFamily::Sha224 | LaneFamily::Sha256 | LaneFamily::Sha384 | LaneFamily::Sha512 => {
                CpuRefLane::Hash(HashLane::new(hash_alg(family)))
            }
            LaneFamily::HmacSha1
            | LaneFamily::HmacSha224
            | LaneFamily::HmacSha256
            | LaneFamily::HmacSha384
            | LaneFamily::HmacSha512 => CpuRefLane::Hmac(HmacLane::new(hash_alg(family), job.key_bytes()?)?),
            LaneFamily::HmacMd5 => CpuRefLane::Hmac(HmacLane::md5(job.key_bytes()?)?),
        };
        Ok(state)
    }
}

unsafe impl LaneAdvanceImpl<Self> for CpuRef {
    fn lane_advance_impl(_kernels: &KernelSet<Self>, _family: LaneFamily, lanes: &mut [LaneSlot<'_, Self>], len: usize) {
        lanes.iter_mut().for_each(|slot| {
            if let LaneSlot::Active {
                state,
                src,
                dst,
                offset,
            } = slot
            {
                state.advance(src, dst, *offset, len);
            }
        });
    }
}

unsafe impl LaneFinishImpl<Self> for CpuRef {
    fn lane_finish_impl(_kernels: &KernelSet<Self>, _family: LaneFamily, state: CpuRefLane, job: &mut Job) {
        state.finish(job);
    }
}

fn hash_alg(family: LaneFamily) -> HashAlg {
    match family.hash_alg() {
        Some(alg) => alg,
        None => panic!("{family:?} is not a hash family"),
    }
}
