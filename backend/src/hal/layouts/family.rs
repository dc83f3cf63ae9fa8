use crate::hal::layouts::HashAlg;

/// Algorithm families that own a lane manager.
///
/// AES lanes are split by key size because a vector AES kernel runs a fixed
/// number of rounds across all of its lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaneFamily {
    Aes128CbcEnc,
    Aes192CbcEnc,
    Aes256CbcEnc,
    Aes128Cmac,
    Aes256Cmac,
    Aes128Xcbc,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
    HmacMd5,
}

/// Lane-width class of a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FamilyClass {
    Aes,
    /// AES-XCBC keeps four lanes on every vector tier.
    AesXcbc,
    Sha256,
    Sha512,
    Md5,
}

impl LaneFamily {
    pub const COUNT: usize = 17;

    pub const ALL: [LaneFamily; Self::COUNT] = [
        LaneFamily::Aes128CbcEnc,
        LaneFamily::Aes192CbcEnc,
        LaneFamily::Aes256CbcEnc,
        LaneFamily::Aes128Cmac,
        LaneFamily::Aes256Cmac,
        LaneFamily::Aes128Xcbc,
        LaneFamily::Sha1,
        LaneFamily::Sha224,
        LaneFamily::Sha256,
        LaneFamily::Sha384,
        LaneFamily::Sha512,
        LaneFamily::HmacSha1,
        LaneFamily::HmacSha224,
        LaneFamily::HmacSha256,
        LaneFamily::HmacSha384,
        LaneFamily::HmacSha512,
        LaneFamily::HmacMd5,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn class(self) -> FamilyClass {
        match self {
            LaneFamily::Aes128CbcEnc
            | LaneFamily::Aes192CbcEnc
            | LaneFamily::Aes256CbcEnc
            | LaneFamily::Aes128Cmac
            | LaneFamily::Aes256Cmac => FamilyClass::Aes,
            LaneFamily::Aes128Xcbc => FamilyClass::AesXcbc,
            LaneFamily::Sha1
            | LaneFamily::Sha224
            | LaneFamily::Sha256
            | LaneFamily::HmacSha1
            | LaneFamily::HmacSha224
            | LaneFamily::HmacSha256 => FamilyClass::Sha256,
            LaneFamily::Sha384 | LaneFamily::Sha512 | LaneFamily::HmacSha384 | LaneFamily::HmacSha512 => FamilyClass::Sha512,
            LaneFamily::HmacMd5 => FamilyClass::Md5,
        }
    }

    /// Underlying SHA hash of a plain-hash or HMAC family.
    pub const fn hash_alg(self) -> Option<HashAlg> {
        match self {
            LaneFamily::Sha1 | LaneFamily::HmacSha1 => Some(HashAlg::Sha1),
            LaneFamily::Sha224 | LaneFamily::HmacSha224 => Some(HashAlg::Sha224),
            LaneFamily::Sha256 | LaneFamily::HmacSha256 => Some(HashAlg::Sha256),
            LaneFamily::Sha384 | LaneFamily::HmacSha384 => Some(HashAlg::Sha384),
            LaneFamily::Sha512 | LaneFamily::HmacSha512 => Some(HashAlg::Sha512),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LaneFamily;

    #[test]
    fn index_matches_position() {
        LaneFamily::ALL
            .iter()
            .enumerate()
            .for_each(|(i, family)| assert_eq!(family.index(), i, "{family:?}"));
    }
}
