use crate::reassembly::SplitAssembler;
use crate::responses::{
    challenge_token, decode_players, decode_rule_count, InfoResponse, PlayerEntry,
};
use crate::ClientError;
use log::{debug, warn};
use protocol::{Frame, Request, CHALLENGE_REQUEST};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

const RECV_BUFFER_SIZE: usize = 2048;

/// Queries one server over UDP
pub struct QueryClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    timeout: Duration,
}

impl QueryClient {
    pub async fn connect(server_addr: &str, timeout: Duration) -> Result<Self, ClientError> {
        let server_addr = tokio::net::lookup_host(server_addr)
            .await?
            .next()
            .ok_or_else(|| ClientError::Unresolved(server_addr.to_string()))?;

        let local = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server_addr).await?;

        Ok(QueryClient {
            socket,
            server_addr,
            timeout,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub async fn info(&self) -> Result<InfoResponse, ClientError> {
        let body = self.request(Request::Info).await?;
        InfoResponse::decode(&body)
    }

    pub async fn players(&self) -> Result<Vec<PlayerEntry>, ClientError> {
        let body = self
            .challenged(|challenge| Request::Players { challenge })
            .await?;
        decode_players(&body)
    }

    pub async fn rules(&self) -> Result<u16, ClientError> {
        let body = self
            .challenged(|challenge| Request::Rules { challenge })
            .await?;
        decode_rule_count(&body)
    }

    /// Asks for a challenge first, then repeats the request with the token.
    async fn challenged(&self, request: fn(i32) -> Request) -> Result<Vec<u8>, ClientError> {
        let body = self.request(request(CHALLENGE_REQUEST)).await?;
        match challenge_token(&body) {
            Some(token) => {
                debug!("Got challenge {:#010x} from {}", token, self.server_addr);
                self.request(request(token)).await
            }
            // Servers without a handshake answer directly
            None => Ok(body),
        }
    }

    async fn request(&self, request: Request) -> Result<Vec<u8>, ClientError> {
        self.socket.send(&request.encode()).await?;
        tokio::time::timeout(self.timeout, self.receive())
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    /// Waits for one complete response, reassembling split datagrams.
    async fn receive(&self) -> Result<Vec<u8>, ClientError> {
        let mut buffer = [0u8; RECV_BUFFER_SIZE];
        let mut assembler = SplitAssembler::new();

        loop {
            let len = self.socket.recv(&mut buffer).await?;
            match Frame::decode(&buffer[..len]) {
                Ok(Frame::Single(body)) => return Ok(body.to_vec()),
                Ok(Frame::Split(header, body)) => {
                    if let Some(payload) = assembler.push(header, body) {
                        return Ok(payload);
                    }
                }
                Err(e) => warn!("Ignoring datagram from {}: {}", self.server_addr, e),
            }
        }
    }
}
