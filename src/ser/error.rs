use core::fmt;
use serde::{Deserialize, Serialize};

/// Context markers naming the envelope section that failed to encode or
/// decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerKind {
    /// Outer message framing (size prefix and message type).
    Envelope,
    /// Gadget instance metadata shared by calls and reports.
    Instance,
    /// Component call body.
    Call,
    /// Component return body.
    Return,
    /// Streamed constraints report.
    ConstraintsReport,
    /// Streamed assignment report.
    AssignmentReport,
}

impl fmt::Display for SerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerKind::Envelope => write!(f, "envelope"),
            SerKind::Instance => write!(f, "instance"),
            SerKind::Call => write!(f, "component call"),
            SerKind::Return => write!(f, "component return"),
            SerKind::ConstraintsReport => write!(f, "constraints report"),
            SerKind::AssignmentReport => write!(f, "assignment report"),
        }
    }
}

/// Canonical serialization error surfaced while encoding or decoding a
/// message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerError {
    /// Input ended before the expected number of bytes were read.
    UnexpectedEnd {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// A length prefix exceeded the remaining buffer or the `u32` range.
    InvalidLength {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// Encountered an unexpected discriminant or a non-canonical value.
    InvalidValue {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// Additional bytes remained after consuming the expected payload.
    TrailingBytes {
        /// Section that failed to decode.
        kind: SerKind,
        /// Position reached by the decoder.
        consumed: usize,
        /// Number of remaining bytes.
        remaining: usize,
    },
}

impl SerError {
    /// Creates an unexpected-end error.
    pub fn unexpected_end(kind: SerKind, field: &'static str) -> Self {
        SerError::UnexpectedEnd { kind, field }
    }

    /// Creates an invalid-length error.
    pub fn invalid_length(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidLength { kind, field }
    }

    /// Creates an invalid-value error.
    pub fn invalid_value(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidValue { kind, field }
    }

    /// Creates a trailing-bytes error.
    pub fn trailing_bytes(kind: SerKind, consumed: usize, remaining: usize) -> Self {
        SerError::TrailingBytes {
            kind,
            consumed,
            remaining,
        }
    }

    /// Returns the section associated with the error.
    pub fn kind(&self) -> SerKind {
        match *self {
            SerError::UnexpectedEnd { kind, .. }
            | SerError::InvalidLength { kind, .. }
            | SerError::InvalidValue { kind, .. }
            | SerError::TrailingBytes { kind, .. } => kind,
        }
    }
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::UnexpectedEnd { kind, field } => {
                write!(f, "unexpected end of input in {kind} while reading {field}")
            }
            SerError::InvalidLength { kind, field } => {
                write!(f, "invalid length in {kind} for {field}")
            }
            SerError::InvalidValue { kind, field } => {
                write!(f, "invalid value in {kind} for {field}")
            }
            SerError::TrailingBytes {
                kind,
                consumed,
                remaining,
            } => write!(
                f,
                "{remaining} trailing bytes in {kind} after consuming {consumed}"
            ),
        }
    }
}

impl std::error::Error for SerError {}

/// Convenient alias for serialization results.
pub type SerResult<T> = core::result::Result<T, SerError>;
