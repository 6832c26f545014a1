pub type MathResult<T> = Result<T, MathError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Wraps the specific error `TryInto` generates
    #[error("integer conversion failed: {0}")]
    ConversionFailed(#[from] std::num::TryFromIntError),
    /// Represents the `None` case from checked math
    #[error("arithmetic overflow")]
    Overflow,
    /// A position past the end of the document.
    #[error("position {pos} out of bounds (len={len})")]
    OutOfBounds { pos: u64, len: u64 },
}
