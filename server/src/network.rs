//! Server network layer handling UDP communications and request dispatch

use crate::dispatch::handle_request;
use crate::game::RepeatGuessPolicy;
use crate::session_manager::{GameHandle, RequestQueue, SessionManager};
use crate::words::WordSource;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, RejectReason, Response, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};

/// Tunables for a server instance
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_sessions: usize,
    pub session_timeout: Duration,
    pub policy: RepeatGuessPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_sessions: 256,
            session_timeout: Duration::from_secs(30 * 60),
            policy: RepeatGuessPolicy::default(),
        }
    }
}

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    SessionExpired { session_id: u32, addr: SocketAddr },
}

/// Messages queued for the network sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
}

/// Main server: receives packets, owns the session table and queues each
/// request for its session's worker
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionManager>>,
    words: Arc<dyn WordSource>,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: Option<mpsc::UnboundedReceiver<GameMessage>>,
}

impl Server {
    pub async fn new(
        addr: &str,
        config: ServerConfig,
        words: Arc<dyn WordSource>,
    ) -> std::io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionManager::new(
                config.max_sessions,
                config.session_timeout,
                config.policy,
            ))),
            words,
            server_tx,
            server_rx,
            game_tx,
            game_rx: Some(game_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let Some(mut game_rx) = self.game_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some(GameMessage::SendPacket { packet, addr }) = game_rx.recv().await {
                if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                    error!("Failed to send packet to {}: {}", addr, e);
                }
            }
        });
    }

    /// Spawns task that expires idle sessions
    fn spawn_timeout_checker(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let expired = {
                    let mut sessions_guard = sessions.write().await;
                    sessions_guard.check_timeouts()
                };

                for (session_id, addr) in expired {
                    if let Err(e) = server_tx.send(ServerMessage::SessionExpired { session_id, addr })
                    {
                        error!("Failed to send expiry message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Processes one incoming packet
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Client connecting from {} (version: {})",
                    addr, client_version
                );

                if client_version != PROTOCOL_VERSION {
                    let response = Packet::Disconnected {
                        reason: "Protocol version mismatch".to_string(),
                    };
                    self.send_packet(response, addr);
                    return;
                }

                let opened = {
                    let mut sessions = self.sessions.write().await;
                    sessions.add_session(addr)
                };

                let response = match opened {
                    Some((session, queue)) => {
                        self.spawn_session_worker(session.id, session.game, queue, addr);
                        Packet::Connected {
                            session_id: session.id,
                        }
                    }
                    None => Packet::Disconnected {
                        reason: "Server full".to_string(),
                    },
                };
                self.send_packet(response, addr);
            }

            Packet::Request {
                request_id,
                request,
            } => {
                let session = {
                    let mut sessions = self.sessions.write().await;
                    sessions.touch_by_addr(addr)
                };

                let queued = session.is_some_and(|session| {
                    debug!("Session {} request {}: {:?}", session.id, request_id, request);
                    session.submit(request_id, request)
                });

                if !queued {
                    let response = Response::Rejected {
                        reason: RejectReason::NoSession,
                        message: "No active session, reconnect to play".to_string(),
                    };
                    self.send_packet(
                        Packet::Response {
                            request_id,
                            response,
                        },
                        addr,
                    );
                }
            }

            Packet::Disconnect => {
                let mut sessions = self.sessions.write().await;
                if let Some(session_id) = sessions.find_session_by_addr(addr) {
                    sessions.remove_session(&session_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Spawns the task that runs a session's requests one at a time
    ///
    /// Requests are taken from the queue in arrival order and each holds the
    /// game lock for its whole read-modify-write. The task ends once the
    /// session is removed and its queue is drained.
    fn spawn_session_worker(
        &self,
        session_id: u32,
        game: GameHandle,
        mut queue: RequestQueue,
        addr: SocketAddr,
    ) {
        let words = Arc::clone(&self.words);
        let game_tx = self.game_tx.clone();

        tokio::spawn(async move {
            while let Some(queued) = queue.recv().await {
                let response = {
                    let mut game = game.lock().await;
                    handle_request(&mut game, words.as_ref(), queued.request)
                };

                let packet = Packet::Response {
                    request_id: queued.request_id,
                    response,
                };
                if let Err(e) = game_tx.send(GameMessage::SendPacket { packet, addr }) {
                    error!("Failed to queue response for {}: {}", addr, e);
                    break;
                }
            }

            debug!("Session {} worker stopped", session_id);
        });
    }

    /// Main server loop
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::PacketReceived { packet, addr } => {
                    self.handle_packet(packet, addr).await;
                }
                ServerMessage::SessionExpired { session_id, addr } => {
                    debug!("Notifying {} that session {} expired", addr, session_id);
                    self.send_packet(
                        Packet::Disconnected {
                            reason: "Session expired".to_string(),
                        },
                        addr,
                    );
                }
            }
        }

        info!("Server shutting down");
        Ok(())
    }
}
