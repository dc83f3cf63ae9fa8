use std::marker::PhantomData;

use crate::hal::layouts::{Backend, Capabilities, CapabilityTier, LaneFamily};

/// Upper bound on the lane width of any family.
pub const MAX_LANES: usize = 16;

/// Immutable binding of a backend's kernels to one capability value.
///
/// Built once per engine. Re-binding to a different tier means building a new
/// set.
pub struct KernelSet<B: Backend> {
    caps: Capabilities,
    widths: [usize; LaneFamily::COUNT],
    _marker: PhantomData<B>,
}

impl<B: Backend> KernelSet<B> {
    /// Binds `caps` with an explicit width per family, indexed by
    /// [`LaneFamily::index`].
    ///
    /// # Panics
    /// Panics if a width is not a power of two in `1..=MAX_LANES`.
    pub fn from_widths(caps: Capabilities, widths: [usize; LaneFamily::COUNT]) -> Self {
        LaneFamily::ALL.iter().for_each(|family| {
            let w: usize = widths[family.index()];
            assert!(
                w.is_power_of_two() && w <= MAX_LANES,
                "invalid lane width {w} for {family:?}: must be a power of two in 1..={MAX_LANES}"
            );
        });
        Self {
            caps,
            widths,
            _marker: PhantomData,
        }
    }

    /// Binds `caps` using the width table of [`Capabilities::lane_width`].
    pub fn from_capabilities(caps: Capabilities) -> Self {
        Self::from_widths(caps, LaneFamily::ALL.map(|family| caps.lane_width(family)))
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    #[inline]
    pub fn tier(&self) -> CapabilityTier {
        self.caps.tier
    }

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.caps.is_degraded()
    }

    #[inline]
    pub fn lane_width(&self, family: LaneFamily) -> usize {
        self.widths[family.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::KernelSet;
    use crate::{
        hal::layouts::{Capabilities, CapabilityTier, LaneFamily},
        implementation::cpu_ref::CpuRef,
    };

    #[test]
    #[should_panic]
    fn rejects_non_power_of_two() {
        let mut widths: [usize; LaneFamily::COUNT] = [4; LaneFamily::COUNT];
        widths[LaneFamily::Sha1.index()] = 3;
        let _ = KernelSet::<CpuRef>::from_widths(Capabilities::new(CapabilityTier::Sse, false), widths);
    }

    #[test]
    #[should_panic]
    fn rejects_too_wide() {
        let _ = KernelSet::<CpuRef>::from_widths(
            Capabilities::new(CapabilityTier::SseGfni, false),
            [32; LaneFamily::COUNT],
        );
    }
}
