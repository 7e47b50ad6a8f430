use thiserror::Error;

/// Errors returned by [`AffinityMask`](crate::AffinityMask) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Mask width must be positive.
    #[error("invalid mask width: must be positive")]
    InvalidWidth,
    /// Domain index falls outside `[0, width)`.
    #[error("domain index {index} is out of range for mask of width {width}")]
    OutOfRange { index: usize, width: usize },
    /// Binary operation between masks of different widths.
    #[error("mask width mismatch: {left} != {right}")]
    WidthMismatch { left: usize, right: usize },
    /// Multi-mask operation called without operands.
    #[error("no masks given")]
    NoMasks,
}
