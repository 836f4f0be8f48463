//! # Arena Brawl Server Library
//!
//! Authoritative server for a real-time multiplayer arena brawler. The
//! server holds the ground-truth state for every connected player and
//! streams snapshots to thin clients that only render.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! All gameplay decisions happen here: movement, the per-player action
//! state machine (idle / punch / hurt), and collision-driven combat
//! resolution. Clients send held-key input and receive state; they never
//! decide outcomes.
//!
//! ### Session Management
//! Tracks connected sessions independently of player entities. A session
//! exists from transport connect until disconnect or timeout; the player
//! entity only exists between join and leave, and survives death until an
//! explicit respawn.
//!
//! ### State Broadcasting
//! Once per simulation tick the complete snapshot of every player (dead
//! ones included) is broadcast to all connected sessions. Death notices
//! are the one targeted exception: they go only to the session of the
//! player that died.
//!
//! ## Architecture
//!
//! The main loop exclusively owns the game state. Socket receive, packet
//! sending, and session timeout sweeping run as separate tokio tasks that
//! communicate with the main loop over channels, so all entity mutation is
//! sequential and deterministic. The simulation advances on accumulated
//! wall-clock time at a fixed tick rate (60 Hz by default); timer jitter
//! neither drifts nor double-steps the simulation.
//!
//! Within one tick every living player updates first, each reporting
//! whether its punch reached the contact frame; collected strikes are then
//! resolved against the other players' hurtboxes, so the effects of a hit
//! become visible on the following tick regardless of update order.
//!
//! ## Module Organization
//!
//! - [`animation`]: tick-driven clip sequencers with marked-frame events
//! - [`player`]: the per-entity state machine and combat bookkeeping
//! - [`game`]: the entity map and the fixed-tick simulation step
//! - [`session`]: registry of connected transports
//! - [`network`]: UDP adapter and the main select loop
//! - [`utils`]: timestamps and per-session colors

pub mod animation;
pub mod game;
pub mod network;
pub mod player;
pub mod session;
pub mod utils;
