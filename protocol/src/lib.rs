//! # Query Protocol
//!
//! Wire format of the legacy "A2S" server query protocol: request decoding,
//! response body encoding, and the single/split packet framing used to put
//! responses on the wire. Everything here is pure; sockets live in the
//! `server` and `client` crates.
//!
//! ## Requests
//!
//! Every request starts with the 4-byte sentinel `0xFFFFFFFF` followed by a type
//! byte. Info requests carry the literal `"Source Engine Query\0"`, player and
//! rules requests carry a 4-byte challenge.
//!
//! ## Responses
//!
//! Responses up to [`MAX_PAYLOAD_SIZE`] bytes go out as one datagram behind the
//! single-packet sentinel. Larger ones are cut into fragments that share a
//! transfer id, see [`split::Fragmenter`].

pub mod codec;
pub mod error;
pub mod split;

pub use codec::{PacketReader, PacketWriter, Request, RequestHeader, ResponsePayload};
pub use error::{DecodeError, EncodeError};
pub use split::{Fragmenter, Frame, SplitHeader, TransferIdCounter};

/// Sentinel in front of requests and single-packet responses.
pub const SINGLE_PACKET_HEADER: i32 = -1;
/// Sentinel bytes in front of every fragment of a split response.
pub const SPLIT_PACKET_HEADER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFE];
/// Challenge value a client sends to ask for a challenge.
pub const CHALLENGE_REQUEST: i32 = -1;

/// Largest response body sent in one datagram, excluding the sentinel.
pub const MAX_PAYLOAD_SIZE: usize = 1248;

pub const INFO_QUERY: &[u8] = b"Source Engine Query\0";
pub const INFO_REQUEST_PACKET_LENGTH: usize = 5 + INFO_QUERY.len();
pub const CHALLENGE_PACKET_LENGTH: usize = 9;
/// The smallest valid request is a challenge request.
pub const MIN_REQUEST_LENGTH: usize = CHALLENGE_PACKET_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestType {
    Info = 0x54,
    Player = 0x55,
    Rules = 0x56,
}

impl TryFrom<u8> for RequestType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x54 => Ok(RequestType::Info),
            0x55 => Ok(RequestType::Player),
            0x56 => Ok(RequestType::Rules),
            other => Err(DecodeError::UnknownRequestType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseType {
    Challenge = 0x41,
    Info = 0x49,
    Player = 0x44,
    Rules = 0x45,
}

impl TryFrom<u8> for ResponseType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x41 => Ok(ResponseType::Challenge),
            0x49 => Ok(ResponseType::Info),
            0x44 => Ok(ResponseType::Player),
            0x45 => Ok(ResponseType::Rules),
            other => Err(DecodeError::UnknownResponseType(other)),
        }
    }
}
