//! Single-packet framing and split-packet fragmentation of responses

use std::sync::atomic::{AtomicU32, Ordering};

use crate::codec::{PacketReader, ResponsePayload};
use crate::error::{DecodeError, EncodeError};
use crate::{MAX_PAYLOAD_SIZE, SINGLE_PACKET_HEADER, SPLIT_PACKET_HEADER};

/// Size of the header in front of each fragment.
pub const SPLIT_HEADER_SIZE: usize = 4 + 4 + 1 + 1 + 2;

/// Source of transfer ids for split responses.
///
/// Incremented once per fragmented response, wrapping at `u32::MAX`.
#[derive(Debug, Default)]
pub struct TransferIdCounter {
    next: AtomicU32,
}

impl TransferIdCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// Hands out the current id and advances the counter.
    pub fn next_id(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Id the next fragmented response will carry.
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Header carried by every fragment of a split response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitHeader {
    pub id: u32,
    pub total: u8,
    pub index: u8,
    pub max_size: u16,
}

impl SplitHeader {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&SPLIT_PACKET_HEADER);
        out.extend_from_slice(&self.id.to_le_bytes());
        out.push(self.total);
        out.push(self.index);
        out.extend_from_slice(&self.max_size.to_le_bytes());
    }
}

/// A response datagram as seen by a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Single(&'a [u8]),
    Split(SplitHeader, &'a [u8]),
}

impl<'a> Frame<'a> {
    /// Classifies a received datagram by its 4-byte sentinel.
    pub fn decode(datagram: &'a [u8]) -> Result<Self, DecodeError> {
        if datagram.len() < 4 {
            return Err(DecodeError::TooShort {
                actual: datagram.len(),
                required: 4,
            });
        }

        let (sentinel, body) = datagram.split_at(4);
        if sentinel == SINGLE_PACKET_HEADER.to_le_bytes() {
            return Ok(Frame::Single(body));
        }
        if sentinel != SPLIT_PACKET_HEADER {
            let raw = u32::from_le_bytes([sentinel[0], sentinel[1], sentinel[2], sentinel[3]]);
            return Err(DecodeError::BadHeader(raw));
        }

        let mut reader = PacketReader::new(body);
        let header = SplitHeader {
            id: reader.u32()?,
            total: reader.u8()?,
            index: reader.u8()?,
            max_size: reader.u16()?,
        };
        if header.total == 0 || header.index >= header.total {
            return Err(DecodeError::BadSplitHeader {
                index: header.index,
                total: header.total,
            });
        }
        Ok(Frame::Split(header, reader.rest()))
    }
}

/// Turns response payloads into the datagrams that go on the wire
#[derive(Debug, Default)]
pub struct Fragmenter {
    transfer_ids: TransferIdCounter,
}

impl Fragmenter {
    pub fn new(transfer_ids: TransferIdCounter) -> Self {
        Self { transfer_ids }
    }

    pub fn transfer_ids(&self) -> &TransferIdCounter {
        &self.transfer_ids
    }

    /// Frames a payload as one datagram, or splits it when it exceeds
    /// [`MAX_PAYLOAD_SIZE`]. Datagrams are returned in send order.
    ///
    /// A transfer id is only consumed when the payload is actually split.
    pub fn fragment(&self, payload: &ResponsePayload) -> Result<Vec<Vec<u8>>, EncodeError> {
        let data = payload.as_bytes();

        if data.len() <= MAX_PAYLOAD_SIZE {
            let mut datagram = Vec::with_capacity(4 + data.len());
            datagram.extend_from_slice(&SINGLE_PACKET_HEADER.to_le_bytes());
            datagram.extend_from_slice(data);
            return Ok(vec![datagram]);
        }

        let fragments = data.len().div_ceil(MAX_PAYLOAD_SIZE);
        let total =
            u8::try_from(fragments).map_err(|_| EncodeError::TooManyFragments { fragments })?;
        let id = self.transfer_ids.next_id();

        let datagrams = data
            .chunks(MAX_PAYLOAD_SIZE)
            .enumerate()
            .map(|(index, chunk)| {
                let header = SplitHeader {
                    id,
                    total,
                    // chunks() yields exactly `total` items, so this fits
                    index: index as u8,
                    max_size: MAX_PAYLOAD_SIZE as u16,
                };
                let mut datagram = Vec::with_capacity(SPLIT_HEADER_SIZE + chunk.len());
                header.encode_into(&mut datagram);
                datagram.extend_from_slice(chunk);
                datagram
            })
            .collect();

        Ok(datagrams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> ResponsePayload {
        (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
    }

    #[test]
    fn test_small_payload_is_single_packet() {
        let fragmenter = Fragmenter::default();
        let data = payload(10);
        let datagrams = fragmenter.fragment(&data).unwrap();

        assert_eq!(datagrams.len(), 1);
        assert_eq!(&datagrams[0][..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&datagrams[0][4..], data.as_bytes());
        assert_eq!(fragmenter.transfer_ids().peek(), 0);
    }

    #[test]
    fn test_boundary_payload_is_single_packet() {
        let fragmenter = Fragmenter::default();
        let datagrams = fragmenter.fragment(&payload(MAX_PAYLOAD_SIZE)).unwrap();
        assert_eq!(datagrams.len(), 1);
        assert_eq!(datagrams[0].len(), 4 + MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_split_layout() {
        let fragmenter = Fragmenter::new(TransferIdCounter::starting_at(7));
        let data = payload(MAX_PAYLOAD_SIZE + 1);
        let datagrams = fragmenter.fragment(&data).unwrap();

        assert_eq!(datagrams.len(), 2);
        for (i, datagram) in datagrams.iter().enumerate() {
            assert_eq!(&datagram[..4], &[0xFF, 0xFF, 0xFF, 0xFE]);
            assert_eq!(&datagram[4..8], &7u32.to_le_bytes());
            assert_eq!(datagram[8], 2);
            assert_eq!(datagram[9], i as u8);
            assert_eq!(&datagram[10..12], &1248u16.to_le_bytes());
        }
        assert_eq!(datagrams[0].len(), SPLIT_HEADER_SIZE + MAX_PAYLOAD_SIZE);
        assert_eq!(datagrams[1].len(), SPLIT_HEADER_SIZE + 1);
        assert_eq!(fragmenter.transfer_ids().peek(), 8);
    }

    #[test]
    fn test_split_reassembles_in_index_order() {
        let fragmenter = Fragmenter::default();
        for len in [MAX_PAYLOAD_SIZE + 1, MAX_PAYLOAD_SIZE * 2, 5000, 12_345] {
            let data = payload(len);
            let datagrams = fragmenter.fragment(&data).unwrap();
            assert_eq!(datagrams.len(), len.div_ceil(MAX_PAYLOAD_SIZE));

            let mut joined = Vec::new();
            for (i, datagram) in datagrams.iter().enumerate() {
                match Frame::decode(datagram).unwrap() {
                    Frame::Split(header, body) => {
                        assert_eq!(header.index as usize, i);
                        if i + 1 < datagrams.len() {
                            assert_eq!(body.len(), MAX_PAYLOAD_SIZE);
                        }
                        joined.extend_from_slice(body);
                    }
                    Frame::Single(_) => panic!("Expected split frame"),
                }
            }
            assert_eq!(joined.as_slice(), data.as_bytes());
        }
    }

    #[test]
    fn test_transfer_id_increases_per_response() {
        let fragmenter = Fragmenter::default();
        let mut last = None;
        for _ in 0..5 {
            let datagrams = fragmenter.fragment(&payload(3000)).unwrap();
            let id = match Frame::decode(&datagrams[0]).unwrap() {
                Frame::Split(header, _) => header.id,
                Frame::Single(_) => panic!("Expected split frame"),
            };
            if let Some(prev) = last {
                assert!(id > prev);
            }
            // every fragment of one response shares the id
            for datagram in &datagrams {
                assert_eq!(&datagram[4..8], &id.to_le_bytes());
            }
            last = Some(id);
        }
    }

    #[test]
    fn test_too_many_fragments() {
        let fragmenter = Fragmenter::default();
        let result = fragmenter.fragment(&payload(MAX_PAYLOAD_SIZE * 255 + 1));
        assert_eq!(
            result,
            Err(EncodeError::TooManyFragments { fragments: 256 })
        );
        assert_eq!(fragmenter.transfer_ids().peek(), 0);

        assert_eq!(
            fragmenter
                .fragment(&payload(MAX_PAYLOAD_SIZE * 255))
                .unwrap()
                .len(),
            255
        );
    }

    #[test]
    fn test_counter_wraps() {
        let counter = TransferIdCounter::starting_at(u32::MAX);
        assert_eq!(counter.next_id(), u32::MAX);
        assert_eq!(counter.next_id(), 0);
    }

    #[test]
    fn test_frame_rejects_bad_split_header() {
        let mut datagram = vec![0xFF, 0xFF, 0xFF, 0xFE];
        datagram.extend_from_slice(&1u32.to_le_bytes());
        datagram.extend_from_slice(&[2, 2, 0xE0, 0x04]);
        assert_eq!(
            Frame::decode(&datagram),
            Err(DecodeError::BadSplitHeader { index: 2, total: 2 })
        );
        assert!(Frame::decode(&[0xFF, 0xFF]).is_err());
    }
}
