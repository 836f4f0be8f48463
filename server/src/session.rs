//! Session registry for the UDP transport
//!
//! A session is a connected client's logical identity, independent of its
//! player entity: it exists from transport connect until disconnect or
//! timeout, while the entity only exists between join and leave. The
//! registry tracks addresses for response routing, enforces the capacity
//! cap, and sweeps out sessions that stopped sending packets.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One connected transport endpoint.
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this session
    pub last_seen: Instant,
}

impl Session {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Marks the session as recently active.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// True when no packet arrived within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Tracks all connected sessions and hands out ids.
///
/// The registry never touches game entities; the coordinator removes a
/// session's entity when the registry reports a disconnect or timeout.
pub struct SessionRegistry {
    sessions: HashMap<u32, Session>,
    next_session_id: u32,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
        }
    }

    /// Registers a new session, or None when the server is full.
    pub fn add_session(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!("Session {} connected from {}", session_id, addr);
        self.sessions.insert(session_id, Session::new(session_id, addr));

        Some(session_id)
    }

    /// Drops a session. Returns false if it was already gone.
    pub fn remove_session(&mut self, session_id: &u32) -> bool {
        if let Some(session) = self.sessions.remove(session_id) {
            info!("Session {} disconnected", session.id);
            true
        } else {
            false
        }
    }

    /// Associates an incoming packet with an existing session.
    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.sessions
            .iter()
            .find(|(_, session)| session.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Refreshes the activity timestamp for a session.
    pub fn touch(&mut self, session_id: u32) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.touch();
        }
    }

    /// Removes sessions that went quiet and returns their ids so the
    /// coordinator can drop their entities too.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for session_id in &timed_out {
            self.remove_session(session_id);
        }

        timed_out
    }

    /// All session ids and addresses, for broadcasting snapshots.
    pub fn session_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.sessions
            .iter()
            .map(|(id, session)| (*id, session.addr))
            .collect()
    }

    /// Address of one session, for targeted packets.
    pub fn addr_of(&self, session_id: u32) -> Option<SocketAddr> {
        self.sessions.get(&session_id).map(|session| session.addr)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
