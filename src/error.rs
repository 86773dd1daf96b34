use std::fmt;

/// Errors that abort a whole decode call.
///
/// Everything below the header/schema stage is recoverable and never
/// surfaces here: discarded frames are reported through
/// [`crate::parser::FrameError`] and counted in the frame statistics.
#[derive(Debug)]
pub enum DecodeError {
    /// I/O errors while reading a log file
    Io(std::io::Error),
    /// No usable header block before the end of the data
    InvalidHeader(String),
    /// Field definitions present but not parseable
    InvalidSchema(String),
}

impl DecodeError {
    /// Structural errors come from the data itself, as opposed to the
    /// environment it was read from.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidHeader(_) | DecodeError::InvalidSchema(_)
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Io(err) => write!(f, "I/O error: {}", err),
            DecodeError::InvalidHeader(msg) => write!(f, "Invalid header: {}", msg),
            DecodeError::InvalidSchema(msg) => write!(f, "Invalid field definitions: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
