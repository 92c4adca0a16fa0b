/// Error types for schema construction and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// An identifier is empty, a lone underscore, or contains characters
    /// outside `[A-Za-z0-9_]` (or starts with a digit).
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    /// An underlying primitives error (forwarded from `diem-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] diem_primitives::PrimitivesError),
}
