//! UDP query client for one remote game server
//!
//! Each logical request opens a fresh unconnected socket, sends one datagram
//! and waits for one response under the configured timeout. The client never
//! retries; the poll loop's next tick is the retry policy.

use log::debug;
use protocol::{PlayerRecord, QueryError, ServerInfo};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Largest datagram a player-list response can occupy.
const RECV_BUFFER_SIZE: usize = 65_535;

/// Client for the info and player-list queries against one endpoint.
pub struct QueryClient {
    addr: String,
    timeout: Duration,
}

impl QueryClient {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            timeout,
        }
    }

    /// Fetches the server's info snapshot in a single round trip.
    pub async fn fetch_info(&self) -> Result<ServerInfo, QueryError> {
        let response = self.round_trip(&protocol::info_request()).await?;
        protocol::decode_info(&response)
    }

    /// Fetches the player roster via the two-phase challenge handshake.
    ///
    /// Each phase is independently timeout-bound; a timeout while acquiring
    /// the challenge aborts before any data-phase attempt. A roster response
    /// truncated mid-record yields the records that decoded cleanly.
    pub async fn fetch_players(&self) -> Result<Vec<PlayerRecord>, QueryError> {
        let request = protocol::player_request(protocol::CHALLENGE_PLACEHOLDER);
        let response = self.round_trip(&request).await?;
        let challenge = protocol::decode_challenge(&response)?;
        debug!("server issued challenge {}", challenge);

        let response = self.round_trip(&protocol::player_request(challenge)).await?;
        protocol::decode_players(&response)
    }

    /// One request datagram out, one response datagram back.
    async fn round_trip(&self, request: &[u8]) -> Result<Vec<u8>, QueryError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.send_to(request, self.addr.as_str()).await?;

        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        let (len, _) = timeout(self.timeout, socket.recv_from(&mut buffer))
            .await
            .map_err(|_| QueryError::Timeout)??;
        buffer.truncate(len);
        Ok(buffer)
    }
}
