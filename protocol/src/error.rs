//! Error types for the query wire format.

use thiserror::Error;

/// Reasons a datagram could not be decoded.
///
/// On the server side every variant maps to a silent drop; the client surfaces
/// them to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("datagram too short: {actual} bytes, need at least {required}")]
    TooShort { actual: usize, required: usize },
    #[error("bad packet header: {0:#010x}")]
    BadHeader(u32),
    #[error("unknown request type: {0:#04x}")]
    UnknownRequestType(u8),
    #[error("unknown response type: {0:#04x}")]
    UnknownResponseType(u8),
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("info request payload does not match the query string")]
    BadInfoPayload,
    #[error("field truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("string field is not terminated")]
    UnterminatedString,
    #[error("string field is not valid utf-8")]
    InvalidUtf8,
    #[error("bad split header: fragment {index} of {total}")]
    BadSplitHeader { index: u8, total: u8 },
}

/// Reasons a response could not be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The fragment count field is a single byte.
    #[error("payload needs {fragments} fragments, at most 255 fit the header")]
    TooManyFragments { fragments: usize },
}
