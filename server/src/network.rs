//! Server network layer handling UDP communications and the fixed-tick loop

use crate::game::{DeathNotice, GameState};
use crate::session::SessionRegistry;
use crate::utils::get_timestamp;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Key, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, Instant};

/// Sessions that send nothing for this long are swept out.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Cap on accumulated simulation debt after a stall; beyond this the
/// server drops time instead of fast-forwarding through it.
const MAX_TICK_BACKLOG: Duration = Duration::from_millis(250);

/// Messages sent from network tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    SessionTimeout {
        session_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the network sender task
#[derive(Debug)]
pub enum OutboundMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet },
}

/// Main server coordinating networking and the authoritative simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionRegistry>>,
    state: GameState,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_sessions: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionRegistry::new(max_sessions))),
            state: GameState::new(),
            tick_duration,
            server_tx,
            server_rx,
            out_tx,
            out_rx,
        })
    }

    /// Spawns the task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

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

    /// Spawns the task that drains the outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let sessions = Arc::clone(&self.sessions);
        let mut out_rx = std::mem::replace(&mut self.out_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                match message {
                    OutboundMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    OutboundMessage::BroadcastPacket { packet } => {
                        let session_addrs = {
                            let sessions_guard = sessions.read().await;
                            sessions_guard.session_addrs()
                        };

                        for (session_id, addr) in session_addrs {
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to session {}: {}", session_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns the task that sweeps out silent sessions
    fn spawn_timeout_checker(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut sweep_interval = interval(Duration::from_secs(1));

            loop {
                sweep_interval.tick().await;

                let timed_out = {
                    let mut sessions_guard = sessions.write().await;
                    sessions_guard.check_timeouts(SESSION_TIMEOUT)
                };

                for session_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::SessionTimeout { session_id }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.out_tx.send(OutboundMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet) {
        if let Err(e) = self.out_tx.send(OutboundMessage::BroadcastPacket { packet }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Processes one inbound packet against the session registry and the
    /// game state. Packets from unknown addresses (other than Connect)
    /// are dropped.
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Session connecting from {} (version: {})",
                    addr, client_version
                );

                // A reconnect from the same address replaces the old session
                let existing = {
                    let sessions = self.sessions.read().await;
                    sessions.find_by_addr(addr)
                };

                if let Some(existing_id) = existing {
                    info!("Replacing existing session {} from {}", existing_id, addr);
                    let mut sessions = self.sessions.write().await;
                    sessions.remove_session(&existing_id);
                    self.state.remove(existing_id);
                }

                let session_id = {
                    let mut sessions = self.sessions.write().await;
                    sessions.add_session(addr)
                };

                // Entity creation waits for the join packet
                match session_id {
                    Some(session_id) => {
                        self.send_packet(Packet::Connected { session_id }, addr);
                    }
                    None => {
                        self.send_packet(
                            Packet::Disconnected {
                                reason: "Server full".to_string(),
                            },
                            addr,
                        );
                    }
                }
            }

            Packet::Join { username } => {
                if let Some(session_id) = self.session_for(addr).await {
                    self.state.join(session_id, &username);
                }
            }

            Packet::KeyInput { key, pressed } => {
                if let Some(session_id) = self.session_for(addr).await {
                    match Key::parse(&key) {
                        Some(key) => self.state.handle_input(session_id, key, pressed),
                        None => debug!("Ignoring unknown key '{}' from {}", key, addr),
                    }
                }
            }

            Packet::Respawn => {
                if let Some(session_id) = self.session_for(addr).await {
                    self.state.respawn(session_id);
                }
            }

            Packet::Leave => {
                // Player leaves the arena but the session stays connected
                if let Some(session_id) = self.session_for(addr).await {
                    self.state.remove(session_id);
                }
            }

            Packet::Disconnect => {
                let session_id = {
                    let sessions = self.sessions.read().await;
                    sessions.find_by_addr(addr)
                };

                if let Some(session_id) = session_id {
                    let mut sessions = self.sessions.write().await;
                    sessions.remove_session(&session_id);
                    self.state.remove(session_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Looks up the session for an address and refreshes its activity
    /// timestamp.
    async fn session_for(&self, addr: SocketAddr) -> Option<u32> {
        let mut sessions = self.sessions.write().await;
        let session_id = sessions.find_by_addr(addr)?;
        sessions.touch(session_id);
        Some(session_id)
    }

    /// Sends each queued death notice to the affected session only.
    async fn deliver_death_notices(&self, notices: Vec<DeathNotice>) {
        for notice in notices {
            let addr = {
                let sessions = self.sessions.read().await;
                sessions.addr_of(notice.session_id)
            };

            if let Some(addr) = addr {
                let message = match &notice.killed_by {
                    Some(name) => format!("You were eliminated by {}", name),
                    None => "You were eliminated".to_string(),
                };
                self.send_packet(
                    Packet::PlayerDeath {
                        message,
                        killed_by: notice.killed_by,
                    },
                    addr,
                );
            }
        }
    }

    /// Broadcasts the current snapshot to every connected session.
    async fn broadcast_status(&self) {
        let session_count = {
            let sessions = self.sessions.read().await;
            sessions.len()
        };

        if session_count == 0 {
            return;
        }

        let players = self.state.snapshot();
        let packet = Packet::GameStatus {
            total_players: players.len() as u32,
            players,
            timestamp: get_timestamp(),
        };

        self.broadcast_packet(packet);
    }

    /// Main server loop coordinating all operations.
    ///
    /// The simulation advances on accumulated wall-clock time: a step runs
    /// only once a full tick interval has elapsed, and a stall is paid off
    /// with several steps up to a bounded backlog. Inbound packets and tick
    /// processing interleave on this one task, so nothing else ever touches
    /// the game state.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut tick_interval = interval(self.tick_duration);
        let mut last_tick = Instant::now();
        let mut backlog = Duration::ZERO;

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::SessionTimeout { session_id }) => {
                            info!("Session {} timed out", session_id);
                            self.state.remove(session_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Advance the simulation
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    backlog += now.duration_since(last_tick);
                    last_tick = now;

                    if backlog > MAX_TICK_BACKLOG {
                        warn!(
                            "Tick backlog of {:?} exceeds limit, dropping excess",
                            backlog
                        );
                        backlog = MAX_TICK_BACKLOG;
                    }

                    let mut stepped = false;
                    while backlog >= self.tick_duration {
                        backlog -= self.tick_duration;
                        let notices = self.state.step();
                        self.deliver_death_notices(notices).await;
                        stepped = true;
                    }

                    if stepped {
                        self.broadcast_status().await;
                    }

                    // Periodic health logging
                    if self.state.tick % 600 == 0 && !self.state.is_empty() {
                        let session_count = {
                            let sessions = self.sessions.read().await;
                            sessions.len()
                        };
                        debug!(
                            "Tick {}: {} sessions, {} players",
                            self.state.tick,
                            session_count,
                            self.state.len()
                        );
                    }
                },
            }
        }

        Ok(())
    }
}
