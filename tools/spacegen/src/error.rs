//! Error types shared by every generator

/// Errors raised by sprite generation, synthesis and sample processing
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Out-of-range or malformed input (non-positive size, bad hex color, ...)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unrecognized enum selector for a generator sub-type
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// Which selector was being parsed (e.g. "faction")
        kind: &'static str,
        /// The rejected value
        value: String,
    },

    /// Operation referenced a sample that was never loaded
    #[error("sample not loaded: {0}")]
    SampleNotFound(String),

    /// Audio bytes could not be decoded
    #[error("failed to decode audio: {0}")]
    DecodeError(String),

    /// File I/O error during export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        GenError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GenError>;

/// Reject a value above its hard limit. NaN never passes.
pub(crate) fn check_max<T: PartialOrd + std::fmt::Display>(
    name: &str,
    value: T,
    max: T,
) -> Result<T> {
    if value <= max {
        Ok(value)
    } else {
        Err(GenError::InvalidParameter(format!(
            "{} {} exceeds maximum of {}",
            name, value, max
        )))
    }
}

/// Reject canvas sizes that cannot hold a sprite.
pub(crate) fn check_size(size: u32) -> Result<u32> {
    if size == 0 {
        return Err(GenError::InvalidParameter("size must be positive".into()));
    }
    if size > MAX_SIZE {
        return Err(GenError::InvalidParameter(format!(
            "size {} exceeds maximum of {}",
            size, MAX_SIZE
        )));
    }
    Ok(size)
}

/// Largest canvas side accepted by the sprite generators
pub const MAX_SIZE: u32 = 4096;
