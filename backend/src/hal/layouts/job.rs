use std::{fmt, sync::Arc};

use crate::hal::layouts::{ArgumentError, LaneFamily};

pub const AES_BLOCK_SIZE: usize = 16;
pub const AEAD_TAG_SIZE: usize = 16;
pub const AEAD_NONCE_SIZE: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// Copies source to destination.
    Null,
    AesCbc,
    AesCtr,
    AesEcb,
    AesGcm,
    /// AES-CCM with a 12-byte nonce and a 16-byte tag.
    AesCcm,
    ChaCha20Poly1305,
}

impl CipherMode {
    pub fn is_aead(self) -> bool {
        matches!(self, CipherMode::AesGcm | CipherMode::AesCcm | CipherMode::ChaCha20Poly1305)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    pub const fn digest_size(self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha224 => 28,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MacAlg {
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
    HmacMd5,
    AesCmac,
    /// AES-XCBC-MAC (RFC 3566) with a 16-byte key. Truncate the tag to 12
    /// bytes for XCBC-MAC-96.
    AesXcbc,
}

impl MacAlg {
    pub const fn tag_size(self) -> usize {
        match self {
            MacAlg::HmacSha1 => HashAlg::Sha1.digest_size(),
            MacAlg::HmacSha224 => HashAlg::Sha224.digest_size(),
            MacAlg::HmacSha256 => HashAlg::Sha256.digest_size(),
            MacAlg::HmacSha384 => HashAlg::Sha384.digest_size(),
            MacAlg::HmacSha512 => HashAlg::Sha512.digest_size(),
            MacAlg::HmacMd5 => 16,
            MacAlg::AesCmac | MacAlg::AesXcbc => AES_BLOCK_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Cipher { mode: CipherMode, direction: Direction },
    Hash(HashAlg),
    Mac(MacAlg),
}

/// Shared, immutable key material.
///
/// Cloning only bumps a reference count, so every job of a flow can carry the
/// same handle.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyHandle(Arc<[u8]>);

impl KeyHandle {
    pub fn new(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for KeyHandle {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for KeyHandle {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHandle(<{} bytes>)", self.0.len())
    }
}

/// Requested message length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsgLen {
    Bytes(usize),
    /// Bit-granular length, AES-CTR only. Trailing bits of the last output
    /// byte are copied from the source.
    Bits(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Init,
    Queued,
    InLane,
    Completed,
    /// AEAD decryption whose tag did not verify. The destination is zeroed.
    AuthFailed,
    InvalidArgs(ArgumentError),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::AuthFailed | JobStatus::InvalidArgs(_))
    }
}

/// A single crypto request.
///
/// The job is moved into the engine on submit and handed back exactly once,
/// in a terminal status. Cipher output goes to `dst`; hash digests, MAC tags
/// and AEAD tags go to `tag`, truncated to `tag.len()`. For AEAD decryption
/// `tag` holds the expected tag.
#[derive(Clone, Debug)]
pub struct Job {
    pub op: Operation,
    pub key: Option<KeyHandle>,
    pub iv: Vec<u8>,
    pub aad: Vec<u8>,
    pub src: Vec<u8>,
    pub src_offset: usize,
    pub len: MsgLen,
    pub dst: Vec<u8>,
    pub tag: Vec<u8>,
    /// Caller correlation value, never interpreted.
    pub user_data: u64,
    status: JobStatus,
    admission: Option<u64>,
}

impl Job {
    /// A job over the whole of `src`, with a destination sized to match for
    /// cipher operations and a full-size tag buffer otherwise.
    pub fn new(op: Operation, src: Vec<u8>) -> Self {
        let len: usize = src.len();
        let (dst, tag): (Vec<u8>, Vec<u8>) = match op {
            Operation::Cipher { mode, .. } if mode.is_aead() => (vec![0u8; len], vec![0u8; AEAD_TAG_SIZE]),
            Operation::Cipher { .. } => (vec![0u8; len], Vec::new()),
            Operation::Hash(alg) => (Vec::new(), vec![0u8; alg.digest_size()]),
            Operation::Mac(alg) => (Vec::new(), vec![0u8; alg.tag_size()]),
        };
        Self {
            op,
            key: None,
            iv: Vec::new(),
            aad: Vec::new(),
            src,
            src_offset: 0,
            len: MsgLen::Bytes(len),
            dst,
            tag,
            user_data: 0,
            status: JobStatus::Init,
            admission: None,
        }
    }

    pub fn cipher(mode: CipherMode, direction: Direction, key: KeyHandle, iv: &[u8], src: Vec<u8>) -> Self {
        Self::new(Operation::Cipher { mode, direction }, src)
            .with_key(key)
            .with_iv(iv)
    }

    pub fn hash(alg: HashAlg, src: Vec<u8>) -> Self {
        Self::new(Operation::Hash(alg), src)
    }

    pub fn mac(alg: MacAlg, key: KeyHandle, src: Vec<u8>) -> Self {
        Self::new(Operation::Mac(alg), src).with_key(key)
    }

    pub fn aead(mode: CipherMode, direction: Direction, key: KeyHandle, nonce: &[u8], aad: &[u8], src: Vec<u8>) -> Self {
        Self::cipher(mode, direction, key, nonce, src).with_aad(aad)
    }

    pub fn with_key(mut self, key: KeyHandle) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_iv(mut self, iv: &[u8]) -> Self {
        self.iv = iv.to_vec();
        self
    }

    pub fn with_aad(mut self, aad: &[u8]) -> Self {
        self.aad = aad.to_vec();
        self
    }

    /// Restricts the job to `src[offset..offset + len]`.
    pub fn with_range(mut self, offset: usize, len: usize) -> Self {
        self.src_offset = offset;
        self.len = MsgLen::Bytes(len);
        self
    }

    pub fn with_bit_len(mut self, bits: usize) -> Self {
        self.len = MsgLen::Bits(bits);
        self
    }

    /// Truncated tag output.
    pub fn with_tag_len(mut self, len: usize) -> Self {
        self.tag = vec![0u8; len];
        self
    }

    /// Expected tag for AEAD decryption.
    pub fn with_tag(mut self, tag: &[u8]) -> Self {
        self.tag = tag.to_vec();
        self
    }

    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Admission index stamped by the submission queue.
    pub fn admission_index(&self) -> Option<u64> {
        self.admission
    }

    pub fn error(&self) -> Option<&ArgumentError> {
        match &self.status {
            JobStatus::InvalidArgs(err) => Some(err),
            _ => None,
        }
    }

    /// Bytes covered by the job, rounding a bit length up.
    pub fn len_bytes(&self) -> usize {
        match self.len {
            MsgLen::Bytes(n) => n,
            MsgLen::Bits(bits) => bits.div_ceil(8),
        }
    }

    /// The source span. Panics if the job was not validated.
    pub fn message(&self) -> &[u8] {
        &self.src[self.src_offset..self.src_offset + self.len_bytes()]
    }

    /// Cipher output for cipher operations, the tag otherwise.
    pub fn output(&self) -> &[u8] {
        match self.op {
            Operation::Cipher { .. } => &self.dst[..self.len_bytes().min(self.dst.len())],
            Operation::Hash(_) | Operation::Mac(_) => &self.tag,
        }
    }

    pub fn key_bytes(&self) -> Result<&[u8], ArgumentError> {
        self.key
            .as_ref()
            .map(KeyHandle::as_bytes)
            .ok_or(ArgumentError::MissingKey)
    }

    /// Lane family that schedules this job, `None` for operations that
    /// always run synchronously.
    pub fn lane_family(&self) -> Option<LaneFamily> {
        let key_len: usize = self.key.as_ref().map_or(0, KeyHandle::len);
        match self.op {
            Operation::Cipher {
                mode: CipherMode::AesCbc,
                direction: Direction::Encrypt,
            } => match key_len {
                16 => Some(LaneFamily::Aes128CbcEnc),
                24 => Some(LaneFamily::Aes192CbcEnc),
                32 => Some(LaneFamily::Aes256CbcEnc),
                _ => None,
            },
            Operation::Cipher { .. } => None,
            Operation::Hash(alg) => Some(match alg {
                HashAlg::Sha1 => LaneFamily::Sha1,
                HashAlg::Sha224 => LaneFamily::Sha224,
                HashAlg::Sha256 => LaneFamily::Sha256,
                HashAlg::Sha384 => LaneFamily::Sha384,
                HashAlg::Sha512 => LaneFamily::Sha512,
            }),
            Operation::Mac(alg) => match alg {
                MacAlg::HmacSha1 => Some(LaneFamily::HmacSha1),
                MacAlg::HmacSha224 => Some(LaneFamily::HmacSha224),
                MacAlg::HmacSha256 => Some(LaneFamily::HmacSha256),
                MacAlg::HmacSha384 => Some(LaneFamily::HmacSha384),
                MacAlg::HmacSha512 => Some(LaneFamily::HmacSha512),
                MacAlg::HmacMd5 => Some(LaneFamily::HmacMd5),
                MacAlg::AesCmac => match key_len {
                    16 => Some(LaneFamily::Aes128Cmac),
                    32 => Some(LaneFamily::Aes256Cmac),
                    _ => None,
                },
                MacAlg::AesXcbc => (key_len == AES_BLOCK_SIZE).then_some(LaneFamily::Aes128Xcbc),
            },
        }
    }

    /// Source span and the matching destination span a lane kernel works on.
    /// Hash and MAC lanes get an empty destination.
    pub fn lane_spans(&mut self) -> (&[u8], &mut [u8]) {
        let len: usize = self.len_bytes();
        let src: &[u8] = &self.src[self.src_offset..self.src_offset + len];
        let dst: &mut [u8] = match self.op {
            Operation::Cipher { .. } => &mut self.dst[..len],
            Operation::Hash(_) | Operation::Mac(_) => &mut self.dst[..0],
        };
        (src, dst)
    }

    /// Checks every argument a kernel relies on. Runs before the job is queued.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        let len: usize = self.len_bytes();

        if let MsgLen::Bits(_) = self.len {
            if !matches!(
                self.op,
                Operation::Cipher {
                    mode: CipherMode::AesCtr,
                    ..
                }
            ) {
                return Err(ArgumentError::BitLength);
            }
        }

        let end: usize = self
            .src_offset
            .checked_add(len)
            .ok_or(ArgumentError::LengthOverflow)?;
        if end > self.src.len() {
            return Err(ArgumentError::SourceTooShort {
                offset: self.src_offset,
                len,
                available: self.src.len(),
            });
        }

        match self.op {
            Operation::Cipher { mode, .. } => self.validate_cipher(mode, len),
            Operation::Hash(alg) => check_tag_len(self.tag.len(), 1, alg.digest_size()),
            Operation::Mac(alg) => {
                let key: &[u8] = self.key_bytes()?;
                match alg {
                    MacAlg::AesCmac => {
                        if !matches!(key.len(), 16 | 32) {
                            return Err(ArgumentError::KeyLength {
                                got: key.len(),
                                expected: "16 or 32",
                            });
                        }
                    }
                    MacAlg::AesXcbc => {
                        if key.len() != AES_BLOCK_SIZE {
                            return Err(ArgumentError::KeyLength {
                                got: key.len(),
                                expected: "16",
                            });
                        }
                    }
                    _ => {
                        if key.is_empty() {
                            return Err(ArgumentError::KeyLength {
                                got: 0,
                                expected: "at least 1",
                            });
                        }
                    }
                }
                check_tag_len(self.tag.len(), 1, alg.tag_size())
            }
        }
    }

    fn validate_cipher(&self, mode: CipherMode, len: usize) -> Result<(), ArgumentError> {
        if mode != CipherMode::Null {
            let key: &[u8] = self.key_bytes()?;
            let valid: bool = match mode {
                CipherMode::ChaCha20Poly1305 => key.len() == 32,
                _ => matches!(key.len(), 16 | 24 | 32),
            };
            if !valid {
                return Err(ArgumentError::KeyLength {
                    got: key.len(),
                    expected: if mode == CipherMode::ChaCha20Poly1305 {
                        "32"
                    } else {
                        "16, 24 or 32"
                    },
                });
            }
        }

        match mode {
            CipherMode::Null => {}
            CipherMode::AesCbc | CipherMode::AesEcb => {
                if len == 0 {
                    return Err(ArgumentError::EmptyMessage);
                }
                if len % AES_BLOCK_SIZE != 0 {
                    return Err(ArgumentError::NotBlockMultiple {
                        len,
                        block: AES_BLOCK_SIZE,
                    });
                }
                if mode == CipherMode::AesCbc && self.iv.len() != AES_BLOCK_SIZE {
                    return Err(ArgumentError::IvLength {
                        got: self.iv.len(),
                        expected: "16",
                    });
                }
            }
            CipherMode::AesCtr => {
                if len == 0 {
                    return Err(ArgumentError::EmptyMessage);
                }
                if !matches!(self.iv.len(), 12 | 16) {
                    return Err(ArgumentError::IvLength {
                        got: self.iv.len(),
                        expected: "12 or 16",
                    });
                }
            }
            CipherMode::AesGcm | CipherMode::AesCcm | CipherMode::ChaCha20Poly1305 => {
                if self.iv.len() != AEAD_NONCE_SIZE {
                    return Err(ArgumentError::IvLength {
                        got: self.iv.len(),
                        expected: "12",
                    });
                }
                check_tag_len(self.tag.len(), AEAD_TAG_SIZE, AEAD_TAG_SIZE)?;
            }
        }

        if self.dst.len() < len {
            return Err(ArgumentError::DestinationTooShort {
                len,
                available: self.dst.len(),
            });
        }
        Ok(())
    }

    /// Returns a handed-back job to [`JobStatus::Init`] and clears its
    /// admission index, so it can be submitted again after its inputs were
    /// corrected.
    ///
    /// # Panics
    /// Panics if the job is still queued or in a lane.
    pub fn reset(&mut self) {
        assert!(
            !matches!(self.status, JobStatus::Queued | JobStatus::InLane),
            "job reset while in flight: {:?}",
            self.status
        );
        self.status = JobStatus::Init;
        self.admission = None;
    }

    /// A terminal job is reset first; only in-flight jobs are refused.
    pub fn mark_queued(&mut self, admission: u64) {
        if self.status.is_terminal() {
            self.reset();
        }
        assert_eq!(self.status, JobStatus::Init, "job queued twice");
        self.admission = Some(admission);
        self.status = JobStatus::Queued;
    }

    pub fn mark_in_lane(&mut self) {
        assert_eq!(self.status, JobStatus::Queued, "job entered a lane without being queued");
        self.status = JobStatus::InLane;
    }

    pub fn mark_completed(&mut self) {
        assert!(!self.status.is_terminal(), "job completed twice: {:?}", self.status);
        self.status = JobStatus::Completed;
    }

    pub fn mark_auth_failed(&mut self) {
        assert!(!self.status.is_terminal(), "job completed twice: {:?}", self.status);
        self.status = JobStatus::AuthFailed;
    }

    pub fn mark_invalid(&mut self, err: ArgumentError) {
        assert!(!self.status.is_terminal(), "job completed twice: {:?}", self.status);
        self.status = JobStatus::InvalidArgs(err);
    }
}

fn check_tag_len(got: usize, min: usize, max: usize) -> Result<(), ArgumentError> {
    if (min..=max).contains(&got) {
        Ok(())
    } else {
        Err(ArgumentError::TagLength { got, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(len: usize) -> KeyHandle {
        KeyHandle::from(vec![0x2bu8; len])
    }

    #[test]
    fn cbc_rules() {
        let ok: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(16), &[0u8; 16], vec![0u8; 32]);
        assert_eq!(ok.validate(), Ok(()));
        assert_eq!(ok.lane_family(), Some(LaneFamily::Aes128CbcEnc));

        let ragged: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(16), &[0u8; 16], vec![0u8; 33]);
        assert_eq!(
            ragged.validate(),
            Err(ArgumentError::NotBlockMultiple { len: 33, block: 16 })
        );

        let empty: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(16), &[0u8; 16], Vec::new());
        assert_eq!(empty.validate(), Err(ArgumentError::EmptyMessage));

        let bad_key: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(20), &[0u8; 16], vec![0u8; 16]);
        assert!(matches!(bad_key.validate(), Err(ArgumentError::KeyLength { got: 20, .. })));
        assert_eq!(bad_key.lane_family(), None);

        let bad_iv: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(32), &[0u8; 8], vec![0u8; 16]);
        assert!(matches!(bad_iv.validate(), Err(ArgumentError::IvLength { got: 8, .. })));
    }

    #[test]
    fn missing_key() {
        let job: Job = Job::new(
            Operation::Mac(MacAlg::HmacSha256),
            b"payload".to_vec(),
        );
        assert_eq!(job.validate(), Err(ArgumentError::MissingKey));
    }

    #[test]
    fn source_bounds() {
        let job: Job = Job::hash(HashAlg::Sha256, vec![0u8; 10]).with_range(4, 7);
        assert_eq!(
            job.validate(),
            Err(ArgumentError::SourceTooShort {
                offset: 4,
                len: 7,
                available: 10
            })
        );
        let overflow: Job = Job::hash(HashAlg::Sha256, vec![0u8; 10]).with_range(usize::MAX, 2);
        assert_eq!(overflow.validate(), Err(ArgumentError::LengthOverflow));
    }

    #[test]
    fn bit_lengths_only_for_ctr() {
        let hash: Job = Job::hash(HashAlg::Sha1, vec![0u8; 4]).with_bit_len(20);
        assert_eq!(hash.validate(), Err(ArgumentError::BitLength));

        let ctr: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(16), &[0u8; 12], vec![0u8; 4]).with_bit_len(20);
        assert_eq!(ctr.validate(), Ok(()));
        assert_eq!(ctr.len_bytes(), 3);
    }

    #[test]
    fn xcbc_and_md5_families() {
        let xcbc: Job = Job::mac(MacAlg::AesXcbc, key(16), vec![0u8; 20]).with_tag_len(12);
        assert_eq!(xcbc.validate(), Ok(()));
        assert_eq!(xcbc.lane_family(), Some(LaneFamily::Aes128Xcbc));

        let wide: Job = Job::mac(MacAlg::AesXcbc, key(32), vec![0u8; 20]);
        assert!(matches!(wide.validate(), Err(ArgumentError::KeyLength { got: 32, .. })));
        assert_eq!(wide.lane_family(), None);

        let md5: Job = Job::mac(MacAlg::HmacMd5, key(80), vec![0u8; 20]);
        assert_eq!(md5.tag.len(), 16);
        assert_eq!(md5.lane_family(), Some(LaneFamily::HmacMd5));
        assert!(matches!(md5.with_tag_len(17).validate(), Err(ArgumentError::TagLength { got: 17, .. })));
    }

    #[test]
    fn tag_bounds() {
        let long: Job = Job::hash(HashAlg::Sha1, vec![1u8; 4]).with_tag_len(21);
        assert_eq!(
            long.validate(),
            Err(ArgumentError::TagLength { got: 21, min: 1, max: 20 })
        );
        let truncated: Job = Job::mac(MacAlg::HmacSha256, key(7), vec![1u8; 4]).with_tag_len(12);
        assert_eq!(truncated.validate(), Ok(()));
        let short_gcm: Job = Job::aead(CipherMode::AesGcm, Direction::Decrypt, key(16), &[0u8; 12], &[], vec![0u8; 4]).with_tag(&[0u8; 8]);
        assert!(matches!(short_gcm.validate(), Err(ArgumentError::TagLength { got: 8, .. })));
    }

    #[test]
    fn destination_too_short() {
        let mut job: Job = Job::cipher(CipherMode::AesCtr, Direction::Encrypt, key(16), &[0u8; 16], vec![0u8; 40]);
        job.dst.truncate(39);
        assert_eq!(
            job.validate(),
            Err(ArgumentError::DestinationTooShort { len: 40, available: 39 })
        );
    }

    #[test]
    fn status_transitions() {
        let mut job: Job = Job::hash(HashAlg::Sha256, b"abc".to_vec());
        assert_eq!(job.status(), &JobStatus::Init);
        job.mark_queued(7);
        job.mark_in_lane();
        job.mark_completed();
        assert_eq!(job.status(), &JobStatus::Completed);
        assert_eq!(job.admission_index(), Some(7));
    }

    #[test]
    fn reset_after_rejection() {
        let mut job: Job = Job::cipher(CipherMode::AesCbc, Direction::Encrypt, key(20), &[0u8; 16], vec![0u8; 16]);
        let err: ArgumentError = match job.validate() {
            Err(err) => err,
            Ok(()) => panic!("20-byte AES key accepted"),
        };
        job.mark_invalid(err);
        assert!(job.status().is_terminal());

        job.key = Some(key(16));
        job.reset();
        assert_eq!(job.status(), &JobStatus::Init);
        assert_eq!(job.admission_index(), None);
        assert_eq!(job.validate(), Ok(()));

        job.mark_queued(3);
        assert_eq!(job.admission_index(), Some(3));
    }

    #[test]
    fn completed_job_queues_again() {
        let mut job: Job = Job::hash(HashAlg::Sha256, b"abc".to_vec());
        job.mark_queued(0);
        job.mark_in_lane();
        job.mark_completed();
        job.mark_queued(1);
        assert_eq!(job.status(), &JobStatus::Queued);
        assert_eq!(job.admission_index(), Some(1));
    }

    #[test]
    #[should_panic(expected = "job queued twice")]
    fn queueing_in_flight_job_panics() {
        let mut job: Job = Job::hash(HashAlg::Sha256, b"abc".to_vec());
        job.mark_queued(0);
        job.mark_queued(1);
    }

    #[test]
    #[should_panic]
    fn completing_twice_panics() {
        let mut job: Job = Job::hash(HashAlg::Sha256, b"abc".to_vec());
        job.mark_completed();
        job.mark_completed();
    }

    #[test]
    fn key_handle_debug_is_redacted() {
        assert_eq!(format!("{:?}", key(16)), "KeyHandle(<16 bytes>)");
    }
}
