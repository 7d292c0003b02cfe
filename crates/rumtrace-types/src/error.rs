use std::fmt;

/// Result type for rumtrace-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A signal feed line could not be decoded
    InvalidSignal {
        line: usize,
        source: serde_json::Error,
    },

    /// A signal feed line is timestamped before its predecessor
    OutOfOrder { line: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSignal { line, source } => {
                write!(f, "Invalid signal on line {}: {}", line, source)
            }
            Error::OutOfOrder { line } => {
                write!(f, "Signal on line {} is earlier than the previous one", line)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidSignal { source, .. } => Some(source),
            Error::OutOfOrder { .. } => None,
        }
    }
}
