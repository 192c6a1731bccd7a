//! Transport-level failure modes.
//!
//! A small hand-written enum with its own `Display` impl, matching the
//! error-handling convention used throughout this crate's other layers.

use std::fmt;

#[derive(Debug)]
pub enum TransportError {
    /// The batch buffer was shorter than a single header.
    Truncated,
    /// A record's declared `size` didn't fit in the remaining buffer.
    RecordSizeOutOfRange { declared: u32, available: usize },
    /// The opcode field did not match any known [`crate::abi::Opcode`].
    UnknownOpcode(u32),
    /// A [`crate::abi::Blob`] addressed bytes outside the batch buffer.
    BlobOutOfRange { offset: u32, size: u32 },
    /// The device handle could not be opened or the exchange IOCTL failed.
    Io(std::io::Error),
    /// A network-mode volume prefix was not of the form `\server\share`.
    InvalidNetworkPrefix(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Truncated => write!(f, "batch buffer too short for a record header"),
            TransportError::RecordSizeOutOfRange { declared, available } => {
                write!(f, "record declares size {declared} but only {available} bytes remain")
            }
            TransportError::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
            TransportError::BlobOutOfRange { offset, size } => {
                write!(f, "blob at offset {offset} size {size} is out of range")
            }
            TransportError::Io(err) => write!(f, "transport I/O error: {err}"),
            TransportError::InvalidNetworkPrefix(prefix) => {
                write!(f, "invalid network volume prefix: {prefix}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(value: std::io::Error) -> Self {
        TransportError::Io(value)
    }
}
