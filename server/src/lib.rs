//! # Query Responder Library
//!
//! This library answers legacy "A2S" server queries on behalf of a game server
//! that does not speak the protocol itself, so server browsers and monitoring
//! tools can read its name, map, player count, player list and rules.
//!
//! ## Request Flow
//!
//! ```text
//! QueryServer (UDP) -> QueryDispatcher -> ChallengeHandshake | ResponseBuilder
//!                   <- Fragmenter      <-
//! ```
//!
//! Every datagram is handled to completion before the next one is received.
//! The only state shared between requests is the transfer id counter used for
//! split responses.
//!
//! ## Module Organization
//!
//! ### State Module (`state`)
//! The boundary to the host game server:
//! - [`state::ServerStateProvider`], queried fresh for every request
//! - [`state::HostState`], an in-memory provider that tracks join times
//!
//! ### Handshake Module (`handshake`)
//! The fixed-token challenge required before player and rules data is sent.
//!
//! ### Response Module (`response`)
//! Byte-exact info, player and rules bodies.
//!
//! ### Dispatcher Module (`dispatcher`)
//! Validates and classifies datagrams. Anything malformed, unknown or carrying
//! the wrong challenge is dropped without a reply.
//!
//! ### Network Module (`network`)
//! The UDP socket and receive loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::dispatcher::QueryDispatcher;
//! use server::network::QueryServer;
//! use server::response::{Platform, ResponseBuilder};
//! use server::state::{HostConfig, HostState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = Arc::new(HostState::new(HostConfig {
//!         name: "My Server".to_string(),
//!         world: "Saves/default.vcdbs".to_string(),
//!         max_players: 16,
//!         password: None,
//!         dedicated: true,
//!         version: "1.19.8".to_string(),
//!         players: vec![],
//!     }));
//!
//!     let builder = ResponseBuilder::new(Platform::host());
//!     let dispatcher = QueryDispatcher::new(state.clone(), builder);
//!     let server = QueryServer::bind("0.0.0.0:42420", dispatcher).await?;
//!     let handle = server.spawn();
//!
//!     // The host keeps the roster current
//!     state.player_joined("Alice");
//!
//!     handle.await?;
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod handshake;
pub mod network;
pub mod response;
pub mod state;
