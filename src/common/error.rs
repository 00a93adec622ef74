use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // Capacity
    #[error("data needs {needed} bits but the symbol holds only {capacity} bits")]
    CapacityExceeded { needed: usize, capacity: usize },
    #[error("segment is too long for its character count field")]
    SegmentOverflow,
    #[error("total encoded length exceeds the 15-bit budget")]
    BitBudgetExceeded,
    #[error("segment bit length does not match its character count")]
    InvalidSegmentLength,

    // Parameters
    #[error("invalid version range")]
    InvalidVersion,
    #[error("invalid error correction level")]
    InvalidECLevel,
    #[error("invalid masking pattern")]
    InvalidMaskingPattern,
    #[error("invalid character for the segment mode")]
    InvalidChar,
    #[error("ECI designator out of range")]
    InvalidEciDesignator,
}

pub type QRResult<T> = Result<T, QRError>;
