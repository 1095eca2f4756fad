//! Client network layer: UDP session with the server and request/response matching

use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, Request, Response, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed packet: {0}")]
    Codec(#[from] bincode::Error),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("the server did not answer in time")]
    Timeout,
    #[error("the connection is closed")]
    Closed,
    #[error("disconnected by server: {0}")]
    Disconnected(String),
}

/// Carries one request to the server and yields its response.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&self, request: Request) -> Result<Response, TransportError>;
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// How long a request may stay unanswered
    pub request_timeout: Duration,
    /// Simulated latency added before each send, in milliseconds
    pub fake_ping_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(3),
            fake_ping_ms: 0,
        }
    }
}

enum NetworkCommand {
    Request {
        request: Request,
        reply: oneshot::Sender<Result<Response, TransportError>>,
    },
}

struct PendingRequest {
    reply: oneshot::Sender<Result<Response, TransportError>>,
    deadline: Instant,
}

/// Owns the socket and the in-flight requests of one server session
pub struct NetworkClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    session_id: u32,
    config: NetworkConfig,
    next_request_id: u32,
    pending: HashMap<u32, PendingRequest>,
    disconnected: Option<String>,
}

impl NetworkClient {
    /// Opens a session with the server at `server_addr`.
    pub async fn connect(server_addr: &str, config: NetworkConfig) -> Result<Self, TransportError> {
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|e| TransportError::Handshake(format!("invalid address {server_addr}: {e}")))?;
        let bind_addr = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;

        info!("Connecting to server at {}...", server_addr);
        let data = serialize(&Packet::Connect {
            client_version: PROTOCOL_VERSION,
        })?;
        socket.send_to(&data, server_addr).await?;

        let mut buffer = [0u8; MAX_PACKET_SIZE];
        loop {
            let (len, _) = timeout(config.request_timeout, socket.recv_from(&mut buffer))
                .await
                .map_err(|_| TransportError::Timeout)??;

            match deserialize::<Packet>(&buffer[..len]) {
                Ok(Packet::Connected { session_id }) => {
                    info!("Connected! Session ID: {}", session_id);
                    return Ok(Self {
                        socket,
                        server_addr,
                        session_id,
                        config,
                        next_request_id: 0,
                        pending: HashMap::new(),
                        disconnected: None,
                    });
                }
                Ok(Packet::Disconnected { reason }) => {
                    return Err(TransportError::Disconnected(reason));
                }
                Ok(other) => warn!("Unexpected packet during handshake: {:?}", other),
                Err(e) => warn!("Failed to deserialize handshake packet: {}", e),
            }
        }
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Moves the client onto a background task on the current tokio runtime
    /// and returns the handle used to issue requests.
    pub fn spawn(self) -> (NetworkHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let session_id = self.session_id;
        let task = tokio::spawn(self.run(commands_rx));

        (
            NetworkHandle {
                commands: commands_tx,
                session_id,
            },
            task,
        )
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), TransportError> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    async fn send_request(
        &mut self,
        request: Request,
        reply: oneshot::Sender<Result<Response, TransportError>>,
    ) {
        if let Some(reason) = &self.disconnected {
            let _ = reply.send(Err(TransportError::Disconnected(reason.clone())));
            return;
        }

        self.next_request_id = self.next_request_id.wrapping_add(1);
        let request_id = self.next_request_id;

        if self.config.fake_ping_ms > 0 {
            sleep(Duration::from_millis(self.config.fake_ping_ms / 2)).await;
        }

        debug!("Sending request {}: {:?}", request_id, request);
        match self
            .send_packet(&Packet::Request {
                request_id,
                request,
            })
            .await
        {
            Ok(()) => {
                self.pending.insert(
                    request_id,
                    PendingRequest {
                        reply,
                        deadline: Instant::now() + self.config.request_timeout,
                    },
                );
            }
            Err(e) => {
                error!("Failed to send request {}: {}", request_id, e);
                let _ = reply.send(Err(e));
            }
        }
    }

    fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Response {
                request_id,
                response,
            } => match self.pending.remove(&request_id) {
                Some(pending) => {
                    let _ = pending.reply.send(Ok(response));
                }
                None => debug!("Dropping response to unknown request {}", request_id),
            },

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.fail_pending(|| TransportError::Disconnected(reason.clone()));
                self.disconnected = Some(reason);
            }

            _ => {
                warn!("Unexpected packet type");
            }
        }
    }

    /// Fails every request whose deadline has passed
    fn expire_requests(&mut self) {
        let now = Instant::now();
        let expired: Vec<u32> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        for request_id in expired {
            if let Some(pending) = self.pending.remove(&request_id) {
                warn!("Request {} timed out", request_id);
                let _ = pending.reply.send(Err(TransportError::Timeout));
            }
        }
    }

    fn fail_pending(&mut self, error: impl Fn() -> TransportError) {
        for (_, pending) in self.pending.drain() {
            let _ = pending.reply.send(Err(error()));
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<NetworkCommand>) {
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let mut sweep_interval = interval(Duration::from_millis(50));

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => match deserialize::<Packet>(&buffer[..len]) {
                            Ok(packet) => self.handle_packet(packet),
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                command = commands.recv() => {
                    match command {
                        Some(NetworkCommand::Request { request, reply }) => {
                            self.send_request(request, reply).await;
                        }
                        None => break,
                    }
                },

                _ = sweep_interval.tick() => {
                    self.expire_requests();
                },
            }
        }

        if self.disconnected.is_none() {
            if let Err(e) = self.send_packet(&Packet::Disconnect).await {
                warn!("Failed to send disconnect: {}", e);
            }
        }
        self.fail_pending(|| TransportError::Closed);
        info!("Network client stopped");
    }
}

/// Cheap handle to a running `NetworkClient`
#[derive(Debug, Clone)]
pub struct NetworkHandle {
    commands: mpsc::UnboundedSender<NetworkCommand>,
    session_id: u32,
}

impl NetworkHandle {
    pub fn session_id(&self) -> u32 {
        self.session_id
    }
}

impl Transport for NetworkHandle {
    async fn request(&self, request: Request) -> Result<Response, TransportError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(NetworkCommand::Request { request, reply })
            .map_err(|_| TransportError::Closed)?;
        response.await.map_err(|_| TransportError::Closed)?
    }
}
