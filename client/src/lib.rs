//! # Query Client Library
//!
//! Client side of the "A2S" query protocol, the part a server browser or
//! monitoring tool plays. It is used to check a running responder by hand and
//! by the workspace integration tests.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! [`network::QueryClient`] sends requests, completes the challenge handshake
//! for player and rules queries, and waits for the response with a timeout.
//!
//! ### Reassembly Module (`reassembly`)
//! Joins split responses back together in fragment order.
//!
//! ### Responses Module (`responses`)
//! Decodes info, player and rules bodies.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::QueryClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QueryClient::connect("127.0.0.1:42420", Duration::from_secs(2)).await?;
//!     let info = client.info().await?;
//!     println!("{} on {} ({}/{})", info.name, info.map, info.players, info.max_players);
//!
//!     for player in client.players().await? {
//!         println!("{} for {:.0}s", player.name, player.duration);
//!     }
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod reassembly;
pub mod responses;

use protocol::{DecodeError, ResponseType};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
    #[error("expected {expected:?} response, got type {found:#04x}")]
    UnexpectedResponse { expected: ResponseType, found: u8 },
}
