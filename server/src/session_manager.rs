//! Session lifecycle and per-session game ownership for the server
//!
//! This module tracks every connected player session:
//! - Session lifecycle (connect, disconnect, idle expiry)
//! - The single authoritative `GameSession` owned by each session
//! - Capacity limits and address tracking
//!
//! Requests for a session go through its own FIFO queue, drained by a single
//! worker, so they apply in arrival order while different sessions never wait
//! on each other.

use crate::game::{GameSession, RepeatGuessPolicy};
use log::info;
use shared::Request;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

/// Shared handle to one session's game.
pub type GameHandle = Arc<Mutex<GameSession>>;

/// Receiving end of a session's request queue. Yields None once the session
/// is gone and every queued request has been taken.
pub type RequestQueue = mpsc::UnboundedReceiver<QueuedRequest>;

/// A request waiting for its session's worker
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
    pub request_id: u32,
    pub request: Request,
}

/// What the server needs to route one request to a live session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: u32,
    pub game: GameHandle,
    requests: mpsc::UnboundedSender<QueuedRequest>,
}

impl SessionHandle {
    /// Appends a request to the session's queue. Returns false if the session
    /// has already been closed.
    pub fn submit(&self, request_id: u32, request: Request) -> bool {
        self.requests
            .send(QueuedRequest {
                request_id,
                request,
            })
            .is_ok()
    }
}

/// A connected player and the game they own
///
/// Each session holds:
/// - Connection metadata (ID, address, last activity)
/// - The game handle that every request for this session locks
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier assigned by the server
    pub id: u32,
    /// Network address responses are routed to
    pub addr: SocketAddr,
    /// Last time we received any packet for this session
    pub last_seen: Instant,
    /// The authoritative game for this session
    pub game: GameHandle,
    /// Sending end of the request queue; dropping it stops the worker
    requests: mpsc::UnboundedSender<QueuedRequest>,
}

impl Session {
    pub fn new(id: u32, addr: SocketAddr, policy: RepeatGuessPolicy) -> (Self, RequestQueue) {
        let (requests, queue) = mpsc::unbounded_channel();
        let session = Self {
            id,
            addr,
            last_seen: Instant::now(),
            game: Arc::new(Mutex::new(GameSession::new(policy))),
            requests,
        };
        (session, queue)
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id,
            game: Arc::clone(&self.game),
            requests: self.requests.clone(),
        }
    }

    /// Returns true if nothing has been heard from this session within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Owns all sessions, keyed by session identity
///
/// Hands out session IDs, enforces the capacity limit and expires sessions
/// that have gone quiet. Game state itself is only reached through the
/// per-session handles, never through this table.
pub struct SessionManager {
    /// Active sessions indexed by their ID
    sessions: HashMap<u32, Session>,
    /// Next ID to hand out
    next_session_id: u32,
    /// Maximum number of concurrent sessions
    max_sessions: usize,
    /// Idle time after which a session is dropped
    session_timeout: Duration,
    /// Repeat guess policy given to every new game
    policy: RepeatGuessPolicy,
}

impl SessionManager {
    pub fn new(max_sessions: usize, session_timeout: Duration, policy: RepeatGuessPolicy) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
            session_timeout,
            policy,
        }
    }

    /// Opens a session for `addr`
    ///
    /// Any session already bound to that address is dropped first, so a
    /// reconnecting client always starts from a clean slate. Returns None when
    /// the server is at capacity.
    ///
    /// The returned queue carries every request submitted for the new session
    /// and must be handed to exactly one worker.
    pub fn add_session(&mut self, addr: SocketAddr) -> Option<(SessionHandle, RequestQueue)> {
        if let Some(existing) = self.find_session_by_addr(addr) {
            info!("Replacing session {} from {}", existing, addr);
            self.remove_session(&existing);
        }

        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let session_id = self.next_session_id;
        self.next_session_id = self.next_session_id.wrapping_add(1).max(1);

        let (session, queue) = Session::new(session_id, addr, self.policy);
        let handle = session.handle();
        info!("Session {} opened from {}", session_id, addr);
        self.sessions.insert(session_id, session);

        Some((handle, queue))
    }

    /// Returns true if the session existed.
    pub fn remove_session(&mut self, session_id: &u32) -> bool {
        if let Some(session) = self.sessions.remove(session_id) {
            info!("Session {} closed", session.id);
            true
        } else {
            false
        }
    }

    pub fn find_session_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.sessions
            .iter()
            .find(|(_, session)| session.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Looks up the session bound to `addr`, refreshes its activity time and
    /// returns a handle for submitting requests to it.
    pub fn touch_by_addr(&mut self, addr: SocketAddr) -> Option<SessionHandle> {
        self.sessions
            .values_mut()
            .find(|session| session.addr == addr)
            .map(|session| {
                session.last_seen = Instant::now();
                session.handle()
            })
    }

    pub fn game(&self, session_id: u32) -> Option<GameHandle> {
        self.sessions
            .get(&session_id)
            .map(|session| Arc::clone(&session.game))
    }

    /// Removes every session idle for longer than the timeout and returns
    /// their IDs and addresses.
    pub fn check_timeouts(&mut self) -> Vec<(u32, SocketAddr)> {
        let timeout = self.session_timeout;
        let timed_out: Vec<(u32, SocketAddr)> = self
            .sessions
            .values()
            .filter(|session| session.is_timed_out(timeout))
            .map(|session| (session.id, session.addr))
            .collect();

        for (session_id, _) in &timed_out {
            info!("Session {} expired", session_id);
            self.remove_session(session_id);
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
