//! Per-datagram query handling
//!
//! Each datagram is decoded, classified and answered with at most one response
//! payload. Malformed datagrams and failed challenges are dropped without a
//! reply and only show up in debug logs.

use crate::handshake::{ChallengeHandshake, ChallengeOutcome};
use crate::response::ResponseBuilder;
use crate::state::ServerStateProvider;
use log::{debug, trace};
use protocol::{Request, ResponsePayload};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub struct QueryDispatcher {
    state: Arc<dyn ServerStateProvider>,
    handshake: ChallengeHandshake,
    builder: ResponseBuilder,
}

impl QueryDispatcher {
    pub fn new(state: Arc<dyn ServerStateProvider>, builder: ResponseBuilder) -> Self {
        Self {
            state,
            handshake: ChallengeHandshake::new(),
            builder,
        }
    }

    /// Returns the response for `datagram`, or `None` when it must be dropped.
    pub fn dispatch(&self, datagram: &[u8], from: SocketAddr) -> Option<ResponsePayload> {
        let request = match Request::decode(datagram) {
            Ok(request) => request,
            Err(e) => {
                trace!("Dropping datagram from {}: {}", from, e);
                return None;
            }
        };

        match request {
            Request::Info => {
                let info = self.state.info();
                let online = self.state.online_players().len();
                Some(self.builder.info(&info, online))
            }
            Request::Players { challenge } => match self.handshake.check(challenge) {
                ChallengeOutcome::Issue => Some(self.handshake.challenge_response()),
                ChallengeOutcome::Accept => {
                    let players = self.state.online_players();
                    Some(self.builder.players(&players, Instant::now()))
                }
                ChallengeOutcome::Reject => reject(challenge, from),
            },
            Request::Rules { challenge } => match self.handshake.check(challenge) {
                ChallengeOutcome::Issue => Some(self.handshake.challenge_response()),
                ChallengeOutcome::Accept => Some(self.builder.rules()),
                ChallengeOutcome::Reject => reject(challenge, from),
            },
        }
    }
}

fn reject(challenge: i32, from: SocketAddr) -> Option<ResponsePayload> {
    debug!("Dropping query from {}: bad challenge {:#010x}", from, challenge);
    None
}
