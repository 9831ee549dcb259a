//! Challenge handshake for player and rules queries
//!
//! The token is fixed for the lifetime of the process and shared by every
//! client, so no per-client state is kept. It filters scanners that never
//! complete the handshake; it is not spoofing protection.

use protocol::{PacketWriter, ResponsePayload, ResponseType, CHALLENGE_REQUEST};

/// "VSDS" on the wire
pub const CHALLENGE_TOKEN: [u8; 4] = *b"VSDS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Client asked for a challenge
    Issue,
    /// Client echoed the token
    Accept,
    /// Anything else, dropped silently
    Reject,
}

#[derive(Debug, Clone, Copy)]
pub struct ChallengeHandshake {
    token: [u8; 4],
}

impl Default for ChallengeHandshake {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeHandshake {
    pub fn new() -> Self {
        Self {
            token: CHALLENGE_TOKEN,
        }
    }

    pub fn token(&self) -> i32 {
        i32::from_le_bytes(self.token)
    }

    pub fn check(&self, challenge: i32) -> ChallengeOutcome {
        if challenge == CHALLENGE_REQUEST {
            ChallengeOutcome::Issue
        } else if challenge == self.token() {
            ChallengeOutcome::Accept
        } else {
            ChallengeOutcome::Reject
        }
    }

    /// CHALLENGE response body carrying the token.
    pub fn challenge_response(&self) -> ResponsePayload {
        let mut writer = PacketWriter::new(ResponseType::Challenge);
        writer.bytes(&self.token);
        writer.finish()
    }
}
