//! Fixed binary layouts of query requests and response bodies
//!
//! All numeric fields are little-endian. Strings are NUL-terminated.

use crate::error::DecodeError;
use crate::{
    RequestType, ResponseType, CHALLENGE_PACKET_LENGTH, INFO_QUERY, INFO_REQUEST_PACKET_LENGTH,
    MIN_REQUEST_LENGTH, SINGLE_PACKET_HEADER,
};

/// Header shared by every request: the single-packet sentinel and a type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub kind: u8,
}

impl RequestHeader {
    pub const SIZE: usize = 5;

    /// Validates the minimum request length and the sentinel.
    pub fn decode(datagram: &[u8]) -> Result<Self, DecodeError> {
        if datagram.len() < MIN_REQUEST_LENGTH {
            return Err(DecodeError::TooShort {
                actual: datagram.len(),
                required: MIN_REQUEST_LENGTH,
            });
        }

        let sentinel = read_i32(datagram, 0)?;
        if sentinel != SINGLE_PACKET_HEADER {
            return Err(DecodeError::BadHeader(sentinel as u32));
        }

        Ok(Self { kind: datagram[4] })
    }
}

/// A validated query request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Info,
    Players { challenge: i32 },
    Rules { challenge: i32 },
}

impl Request {
    /// Decodes a whole datagram. Any error means the datagram must be dropped.
    pub fn decode(datagram: &[u8]) -> Result<Self, DecodeError> {
        let header = RequestHeader::decode(datagram)?;
        let kind = RequestType::try_from(header.kind)?;

        match kind {
            RequestType::Info => {
                expect_length(datagram, INFO_REQUEST_PACKET_LENGTH)?;
                if &datagram[RequestHeader::SIZE..] != INFO_QUERY {
                    return Err(DecodeError::BadInfoPayload);
                }
                Ok(Request::Info)
            }
            RequestType::Player => {
                expect_length(datagram, CHALLENGE_PACKET_LENGTH)?;
                let challenge = read_i32(datagram, RequestHeader::SIZE)?;
                Ok(Request::Players { challenge })
            }
            RequestType::Rules => {
                expect_length(datagram, CHALLENGE_PACKET_LENGTH)?;
                let challenge = read_i32(datagram, RequestHeader::SIZE)?;
                Ok(Request::Rules { challenge })
            }
        }
    }

    pub fn kind(&self) -> RequestType {
        match self {
            Request::Info => RequestType::Info,
            Request::Players { .. } => RequestType::Player,
            Request::Rules { .. } => RequestType::Rules,
        }
    }

    /// Produces the datagram a client sends for this request.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(INFO_REQUEST_PACKET_LENGTH);
        out.extend_from_slice(&SINGLE_PACKET_HEADER.to_le_bytes());
        out.push(self.kind() as u8);
        match self {
            Request::Info => out.extend_from_slice(INFO_QUERY),
            Request::Players { challenge } | Request::Rules { challenge } => {
                out.extend_from_slice(&challenge.to_le_bytes())
            }
        }
        out
    }
}

fn expect_length(datagram: &[u8], expected: usize) -> Result<(), DecodeError> {
    if datagram.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: datagram.len(),
        });
    }
    Ok(())
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32, DecodeError> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(DecodeError::Truncated {
            needed: offset + 4,
            available: data.len(),
        })?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// One complete logical response before fragmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload(Vec<u8>);

impl ResponsePayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Response type taken from the leading byte.
    pub fn kind(&self) -> Option<ResponseType> {
        self.0
            .first()
            .and_then(|b| ResponseType::try_from(*b).ok())
    }
}

impl From<Vec<u8>> for ResponsePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Append-only builder for response bodies
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    /// Starts a body with its response-type byte.
    pub fn new(kind: ResponseType) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.push(kind as u8);
        Self { buf }
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Writes a NUL-terminated string. Anything after an embedded NUL is cut
    /// so the field boundary stays where readers expect it.
    pub fn cstr(&mut self, value: &str) -> &mut Self {
        let bytes = value.as_bytes();
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        self.buf.extend_from_slice(&bytes[..end]);
        self.buf.push(0);
        self
    }

    pub fn finish(self) -> ResponsePayload {
        ResponsePayload(self.buf)
    }
}

/// Cursor over a response body; every read is bounds-checked
#[derive(Debug)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn i16(&mut self) -> Result<i16, DecodeError> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn cstr(&mut self) -> Result<String, DecodeError> {
        let rest = &self.data[self.pos..];
        let end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(DecodeError::UnterminatedString)?;
        let value = std::str::from_utf8(&rest[..end]).map_err(|_| DecodeError::InvalidUtf8)?;
        self.pos += end + 1;
        Ok(value.to_string())
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(kind: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xFF, 0xFF, 0xFF];
        data.push(kind);
        data
    }

    #[test]
    fn test_decode_info_request() {
        let mut data = header(0x54);
        data.extend_from_slice(b"Source Engine Query\0");
        assert_eq!(data.len(), 25);
        assert_eq!(Request::decode(&data), Ok(Request::Info));
    }

    #[test]
    fn test_info_request_with_wrong_body() {
        let mut data = header(0x54);
        data.extend_from_slice(b"Source Engine Qvery\0");
        assert_eq!(Request::decode(&data), Err(DecodeError::BadInfoPayload));
    }

    #[test]
    fn test_info_request_with_trailing_challenge() {
        let mut data = header(0x54);
        data.extend_from_slice(b"Source Engine Query\0");
        data.extend_from_slice(&[0xFF; 4]);
        assert!(matches!(
            Request::decode(&data),
            Err(DecodeError::LengthMismatch {
                expected: 25,
                actual: 29
            })
        ));
    }

    #[test]
    fn test_decode_challenge_requests() {
        let mut data = header(0x55);
        data.extend_from_slice(&(-1i32).to_le_bytes());
        assert_eq!(
            Request::decode(&data),
            Ok(Request::Players { challenge: -1 })
        );

        let mut data = header(0x56);
        data.extend_from_slice(b"VSDS");
        assert_eq!(
            Request::decode(&data),
            Ok(Request::Rules {
                challenge: i32::from_le_bytes(*b"VSDS")
            })
        );
    }

    #[test]
    fn test_challenge_request_wrong_length() {
        let mut data = header(0x55);
        data.extend_from_slice(&[0xFF; 5]);
        assert!(matches!(
            Request::decode(&data),
            Err(DecodeError::LengthMismatch { expected: 9, .. })
        ));
    }

    #[test]
    fn test_short_and_bad_sentinel() {
        assert!(matches!(
            Request::decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0x55, 0xFF, 0xFF, 0xFF]),
            Err(DecodeError::TooShort { actual: 8, .. })
        ));
        assert!(Request::decode(&[]).is_err());

        let data = [0xFE, 0xFF, 0xFF, 0xFF, 0x55, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            Request::decode(&data),
            Err(DecodeError::BadHeader(_))
        ));
    }

    #[test]
    fn test_unknown_request_type() {
        let mut data = header(0x57);
        data.extend_from_slice(&[0xFF; 4]);
        assert_eq!(
            Request::decode(&data),
            Err(DecodeError::UnknownRequestType(0x57))
        );
    }

    #[test]
    fn test_encode_matches_decode() {
        for request in [
            Request::Info,
            Request::Players { challenge: -1 },
            Request::Rules { challenge: 1234 },
        ] {
            assert_eq!(Request::decode(&request.encode()), Ok(request));
        }
    }

    #[test]
    fn test_writer_layout() {
        let mut writer = PacketWriter::new(ResponseType::Player);
        writer.u8(1).cstr("Bob").i32(0).f32(1.5).i16(204);
        let payload = writer.finish();

        let mut expected = vec![0x44, 1, b'B', b'o', b'b', 0, 0, 0, 0, 0];
        expected.extend_from_slice(&1.5f32.to_le_bytes());
        expected.extend_from_slice(&[204, 0]);
        assert_eq!(payload.as_bytes(), expected.as_slice());
        assert_eq!(payload.kind(), Some(ResponseType::Player));
    }

    #[test]
    fn test_writer_cuts_embedded_nul() {
        let mut writer = PacketWriter::new(ResponseType::Info);
        writer.cstr("abc\0def");
        assert_eq!(writer.finish().as_bytes(), &[0x49, b'a', b'b', b'c', 0]);
    }

    #[test]
    fn test_reader_reports_truncation() {
        let mut reader = PacketReader::new(&[1, 2, 3]);
        assert_eq!(reader.u8(), Ok(1));
        assert_eq!(
            reader.i32(),
            Err(DecodeError::Truncated {
                needed: 4,
                available: 2
            })
        );

        let mut reader = PacketReader::new(b"open");
        assert_eq!(reader.cstr(), Err(DecodeError::UnterminatedString));
    }
}
