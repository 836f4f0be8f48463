//! Authoritative game state: the entity map and the fixed-tick step.

use log::{debug, info};
use rand::Rng;
use shared::{boxes_overlap, Key, PlayerSnapshot, Vec2, HITSTOP_TICKS, HURTBOX, PUNCH_DAMAGE};
use std::collections::HashMap;

use crate::player::Player;

// Respawn region, kept away from the arena edges
const SPAWN_X_MIN: f32 = 60.0;
const SPAWN_X_MAX: f32 = 910.0;
const SPAWN_Y_MIN: f32 = 60.0;
const SPAWN_Y_MAX: f32 = 540.0;

/// Queued for the session of a player that just died; never broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathNotice {
    pub session_id: u32,
    pub killed_by: Option<String>,
}

#[derive(Debug)]
pub struct GameState {
    pub tick: u32,
    players: HashMap<u32, Player>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            players: HashMap::new(),
        }
    }

    /// Creates the entity for a session on its first join, or renames an
    /// existing one. A dead player joining again is respawned.
    pub fn join(&mut self, session_id: u32, username: &str) {
        if let Some(player) = self.players.get_mut(&session_id) {
            player.name = username.to_string();
            if !player.is_alive() {
                player.respawn(spawn_point());
            }
            info!("Player {} rejoined as '{}'", session_id, username);
        } else {
            let spawn = spawn_point();
            info!(
                "Player {} joined as '{}' at ({:.0}, {:.0})",
                session_id, username, spawn.x, spawn.y
            );
            self.players
                .insert(session_id, Player::new(session_id, username, spawn));
        }
    }

    /// Sets or clears one held key. Dead players and unknown sessions are
    /// ignored.
    pub fn handle_input(&mut self, session_id: u32, key: Key, pressed: bool) {
        match self.players.get_mut(&session_id) {
            Some(player) if player.is_alive() => player.keys.set(key, pressed),
            Some(_) => debug!("Ignoring input from dead player {}", session_id),
            None => debug!("Ignoring input for unknown session {}", session_id),
        }
    }

    pub fn respawn(&mut self, session_id: u32) {
        if let Some(player) = self.players.get_mut(&session_id) {
            player.respawn(spawn_point());
            info!("Player {} respawned", session_id);
        }
    }

    /// Removes the entity for a session. Returns false if there was none.
    pub fn remove(&mut self, session_id: u32) -> bool {
        if self.players.remove(&session_id).is_some() {
            info!("Removed player {}", session_id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, session_id: u32) -> bool {
        self.players.contains_key(&session_id)
    }

    pub fn player(&self, session_id: u32) -> Option<&Player> {
        self.players.get(&session_id)
    }

    pub fn player_mut(&mut self, session_id: u32) -> Option<&mut Player> {
        self.players.get_mut(&session_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Runs one simulation step.
    ///
    /// Living players update first (ascending id order), each reporting
    /// whether its punch reached the contact frame. Strikes are applied
    /// only after every update has run, so no player observes a hit
    /// mid-pass; the effects become visible on the next tick.
    pub fn step(&mut self) -> Vec<DeathNotice> {
        self.tick = self.tick.wrapping_add(1);

        let mut ids: Vec<u32> = self.players.keys().copied().collect();
        ids.sort_unstable();

        let mut strikers = Vec::new();
        for id in &ids {
            if let Some(player) = self.players.get_mut(id) {
                if player.is_alive() && player.update() {
                    strikers.push(*id);
                }
            }
        }

        let mut notices = Vec::new();
        for attacker_id in strikers {
            notices.extend(self.resolve_punch(attacker_id, &ids));
        }
        notices
    }

    /// Tests the attacker's hitbox against every other living player's
    /// hurtbox and applies damage, stun, and hitstop for each overlap.
    fn resolve_punch(&mut self, attacker_id: u32, ids: &[u32]) -> Vec<DeathNotice> {
        let Some(attacker) = self.players.get(&attacker_id) else {
            return Vec::new();
        };
        let attack_pos = attacker.position;
        let hitbox = *attacker.hitbox();
        let attacker_name = attacker.name.clone();

        let mut notices = Vec::new();
        let mut connected = false;

        for target_id in ids {
            if *target_id == attacker_id {
                continue;
            }
            let Some(target) = self.players.get_mut(target_id) else {
                continue;
            };
            if !target.is_alive() {
                continue;
            }
            if !boxes_overlap(attack_pos, &hitbox, target.position, &HURTBOX) {
                continue;
            }

            connected = true;
            target.enter_hurt();
            target.pause_current(HITSTOP_TICKS);
            if target.apply_damage(PUNCH_DAMAGE) {
                info!(
                    "Player {} eliminated by '{}'",
                    target_id, attacker_name
                );
                notices.push(DeathNotice {
                    session_id: *target_id,
                    killed_by: Some(attacker_name.clone()),
                });
            }
        }

        if connected {
            if let Some(attacker) = self.players.get_mut(&attacker_id) {
                attacker.pause_current(HITSTOP_TICKS);
            }
        }
        notices
    }

    /// Serializes every player, dead ones included, for broadcast.
    pub fn snapshot(&self) -> Vec<PlayerSnapshot> {
        self.players.values().map(Player::snapshot).collect()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_point() -> Vec2 {
    let mut rng = rand::thread_rng();
    Vec2::new(
        rng.gen_range(SPAWN_X_MIN..=SPAWN_X_MAX),
        rng.gen_range(SPAWN_Y_MIN..=SPAWN_Y_MAX),
    )
}
