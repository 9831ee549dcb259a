//! UDP transport for the query responder

use crate::dispatcher::QueryDispatcher;
use log::{debug, error, info, warn};
use protocol::{Fragmenter, TransferIdCounter};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Large enough for any request; oversized datagrams are truncated and then
/// fail validation anyway.
const RECV_BUFFER_SIZE: usize = 2048;

/// Windows reports a datagram larger than the receive buffer as this error
const WSAEMSGSIZE: i32 = 10040;

/// Owns the socket and answers queries one datagram at a time
pub struct QueryServer {
    socket: UdpSocket,
    dispatcher: QueryDispatcher,
    fragmenter: Fragmenter,
}

impl QueryServer {
    pub async fn bind(
        addr: &str,
        dispatcher: QueryDispatcher,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Query responder listening on {}", socket.local_addr()?);

        Ok(QueryServer {
            socket,
            dispatcher,
            fragmenter: Fragmenter::new(TransferIdCounter::new()),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the receive loop on its own task so the host keeps its control flow.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Receive loop. Never returns; a bad datagram or failed send only affects
    /// that one request.
    pub async fn run(&self) {
        let mut buffer = [0u8; RECV_BUFFER_SIZE];

        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((len, addr)) => self.handle_datagram(&buffer[..len], addr).await,
                Err(e) if is_client_noise(&e) => {
                    debug!("Ignoring receive error: {}", e);
                }
                Err(e) => {
                    error!("Error receiving datagram: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    async fn handle_datagram(&self, datagram: &[u8], addr: SocketAddr) {
        let Some(payload) = self.dispatcher.dispatch(datagram, addr) else {
            return;
        };

        let datagrams = match self.fragmenter.fragment(&payload) {
            Ok(datagrams) => datagrams,
            Err(e) => {
                error!("Failed to encode response for {}: {}", addr, e);
                return;
            }
        };

        // Later fragments are still attempted when one send fails
        for datagram in &datagrams {
            if let Err(e) = self.socket.send_to(datagram, addr).await {
                warn!("Failed to send response to {}: {}", addr, e);
            }
        }
    }
}

/// Receive errors caused by a remote peer rather than the socket itself: an
/// ICMP port-unreachable from a closed client port, or an oversized datagram.
fn is_client_noise(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::ConnectionReset
        || (cfg!(windows) && e.raw_os_error() == Some(WSAEMSGSIZE))
}
