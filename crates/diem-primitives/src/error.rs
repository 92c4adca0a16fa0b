/// Unified error type for all primitives operations.
///
/// Covers canonical decoding failures, key and signature parsing, and
/// MultiEd25519 key-set construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("unknown variant index {index} for {type_name}")]
    UnknownVariant { type_name: &'static str, index: u32 },

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("non-canonical ULEB128 encoding")]
    NonCanonicalUleb128,

    #[error("ULEB128 value does not fit in u32")]
    Uleb128Overflow,

    #[error("invalid bool byte: {0}")]
    InvalidBool(u8),

    #[error("invalid option tag: {0}")]
    InvalidOptionTag(u8),

    #[error("invalid utf-8: {0}")]
    InvalidUtf8(String),

    #[error("invalid {what} length: expected {expected}, got {got}")]
    InvalidLength { what: &'static str, expected: usize, got: usize },

    #[error("invalid {what}: {reason}")]
    InvalidValue { what: &'static str, reason: String },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("empty key set")]
    EmptyKeySet,

    #[error("too many keys: max {max}, got {got}")]
    TooManyKeys { max: usize, got: usize },

    #[error("invalid threshold {threshold} for {key_count} keys")]
    InvalidThreshold { threshold: u8, key_count: usize },

    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
