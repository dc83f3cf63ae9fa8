use thiserror::Error;

/// Synchronous validation failure of a [`Job`](crate::hal::layouts::Job).
///
/// A job that fails validation transitions to `InvalidArgs`, never enters a
/// lane and no kernel is invoked for it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("operation requires a key")]
    MissingKey,
    #[error("invalid key length {got} bytes (expected {expected})")]
    KeyLength { got: usize, expected: &'static str },
    #[error("invalid IV length {got} bytes (expected {expected})")]
    IvLength { got: usize, expected: &'static str },
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message length {len} is not a multiple of the {block}-byte block")]
    NotBlockMultiple { len: usize, block: usize },
    #[error("bit-granular lengths are only accepted by AES-CTR")]
    BitLength,
    #[error("source holds {available} bytes but the job reads {len} bytes at offset {offset}")]
    SourceTooShort { offset: usize, len: usize, available: usize },
    #[error("destination holds {available} bytes but the job writes {len}")]
    DestinationTooShort { len: usize, available: usize },
    #[error("tag length {got} outside {min}..={max}")]
    TagLength { got: usize, min: usize, max: usize },
    #[error("source offset plus message length overflows")]
    LengthOverflow,
    #[error("job does not belong in a {expected}-only burst")]
    OperationClass { expected: &'static str },
}
