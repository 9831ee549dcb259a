//! Reassembly of split responses

use log::debug;
use protocol::SplitHeader;

/// Collects the fragments of one transfer
///
/// A fragment with a different transfer id discards whatever was collected so
/// far; the client only ever waits for one response at a time.
#[derive(Debug, Default)]
pub struct SplitAssembler {
    id: Option<u32>,
    parts: Vec<Option<Vec<u8>>>,
}

impl SplitAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fragment. Returns the joined payload once every fragment of the
    /// transfer has arrived.
    pub fn push(&mut self, header: SplitHeader, body: &[u8]) -> Option<Vec<u8>> {
        if self.id != Some(header.id) || self.parts.len() != header.total as usize {
            if self.id.is_some() {
                debug!("Discarding incomplete transfer {:?}", self.id);
            }
            self.id = Some(header.id);
            self.parts = vec![None; header.total as usize];
        }

        self.parts[header.index as usize] = Some(body.to_vec());
        if self.parts.iter().any(Option::is_none) {
            return None;
        }

        let payload = self.parts.drain(..).flatten().flatten().collect();
        self.id = None;
        Some(payload)
    }
}
