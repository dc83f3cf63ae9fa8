use std::fmt;

use crate::hal::layouts::{FamilyClass, LaneFamily};

/// Ordered classification of the vector capability detected at startup.
///
/// `Scalar` means the baseline (SSE4.2 + AES-NI + PCLMULQDQ) is missing: the
/// engine then runs every job through the width-1 synchronous path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityTier {
    Scalar,
    Sse,
    SseGfni,
}

impl CapabilityTier {
    pub const ALL: [CapabilityTier; 3] = [CapabilityTier::Scalar, CapabilityTier::Sse, CapabilityTier::SseGfni];

    pub fn name(self) -> &'static str {
        match self {
            CapabilityTier::Scalar => "scalar",
            CapabilityTier::Sse => "sse",
            CapabilityTier::SseGfni => "sse-gfni",
        }
    }

    /// Case-insensitive inverse of [`CapabilityTier::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw CPU feature flags relevant to lane-width selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    pub sse4_2: bool,
    pub aesni: bool,
    pub pclmulqdq: bool,
    pub gfni: bool,
    pub sha_ni: bool,
}

impl CpuFeatures {
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        Self {
            sse4_2: std::arch::is_x86_feature_detected!("sse4.2"),
            aesni: std::arch::is_x86_feature_detected!("aes"),
            pclmulqdq: std::arch::is_x86_feature_detected!("pclmulqdq"),
            gfni: cpuid_gfni(),
            sha_ni: std::arch::is_x86_feature_detected!("sha"),
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub fn detect() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> CapabilityTier {
        if !(self.sse4_2 && self.aesni && self.pclmulqdq) {
            CapabilityTier::Scalar
        } else if self.gfni {
            CapabilityTier::SseGfni
        } else {
            CapabilityTier::Sse
        }
    }
}

// GFNI is CPUID.(EAX=7,ECX=0):ECX[bit 8].
#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
fn cpuid_gfni() -> bool {
    use std::arch::x86_64::{__cpuid_count, __get_cpuid_max};

    let (max_leaf, _) = unsafe { __get_cpuid_max(0) };
    if max_leaf < 7 {
        return false;
    }
    let leaf7 = unsafe { __cpuid_count(7, 0) };
    leaf7.ecx & (1 << 8) != 0
}

/// The capability value consumed once when a kernel set is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub tier: CapabilityTier,
    /// SHA extensions present: SHA-1/SHA-256 lanes use the 2-wide SHA-NI
    /// layout instead of the 4-wide SIMD one.
    pub sha_ext: bool,
}

impl Capabilities {
    pub const fn new(tier: CapabilityTier, sha_ext: bool) -> Self {
        Self { tier, sha_ext }
    }

    pub fn detect() -> Self {
        let features: CpuFeatures = CpuFeatures::detect();
        let caps: Capabilities = Self::new(features.tier(), features.sha_ni);
        log::debug!("detected {features:?} -> tier={} sha_ext={}", caps.tier, caps.sha_ext);
        caps
    }

    pub fn is_degraded(&self) -> bool {
        self.tier == CapabilityTier::Scalar
    }

    /// Number of lanes a family gets under these capabilities.
    pub fn lane_width(&self, family: LaneFamily) -> usize {
        if self.is_degraded() {
            return 1;
        }
        match family.class() {
            FamilyClass::Aes => {
                if self.tier >= CapabilityTier::SseGfni {
                    8
                } else {
                    4
                }
            }
            FamilyClass::Sha256 => {
                if self.sha_ext {
                    2
                } else {
                    4
                }
            }
            FamilyClass::AesXcbc => 4,
            FamilyClass::Sha512 => 2,
            FamilyClass::Md5 => 8,
        }
    }
}
