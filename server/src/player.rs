//! Player entity: movement, action state machine, and combat bookkeeping.

use std::collections::HashMap;

use shared::{
    AnimationStatus, BoxSpec, Key, PlayerSnapshot, Vec2, ARENA_HEIGHT, ARENA_WIDTH,
    DIAGONAL_SCALE, HITBOX_LEFT, HITBOX_RIGHT, MAX_HEALTH, WALK_SPEED_X, WALK_SPEED_Y,
};

use crate::animation::{standard_clips, ClipId, Sequencer, PUNCH_CONTACT_INDEX};
use crate::utils::player_color;

/// Eliminated players are parked here until they respawn.
pub const OFF_ARENA: Vec2 = Vec2::new(-1000.0, -1000.0);

/// The one action a player is committed to at any moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Free to move and start attacks.
    Idle,
    /// Stunned, riding out the hurt clip.
    Hurt,
    /// Committed to a punch until its clip finishes.
    Punch,
}

/// Currently-held logical keys, mutated by inbound events and read once
/// per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub attack: bool,
}

impl HeldKeys {
    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Attack => self.attack = pressed,
        }
    }

    pub fn clear(&mut self) {
        *self = HeldKeys::default();
    }
}

#[derive(Debug)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: Vec2,
    pub facing_right: bool,
    pub health: i32,
    pub color: String,
    pub keys: HeldKeys,
    pub action: ActionState,
    clips: HashMap<ClipId, Sequencer>,
    current_clip: ClipId,
}

impl Player {
    pub fn new(id: u32, name: &str, position: Vec2) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            facing_right: true,
            health: MAX_HEALTH,
            color: player_color(id),
            keys: HeldKeys::default(),
            action: ActionState::Idle,
            clips: standard_clips(),
            current_clip: ClipId::IdleRight,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn current(&self) -> &Sequencer {
        &self.clips[&self.current_clip]
    }

    fn current_mut(&mut self) -> &mut Sequencer {
        self.clips
            .get_mut(&self.current_clip)
            .expect("clip table covers every ClipId")
    }

    /// Makes `clip` the active sequencer, resetting it on a genuine switch.
    fn switch_clip(&mut self, clip: ClipId) {
        if self.current_clip != clip {
            self.current_clip = clip;
            self.current_mut().reset();
        }
    }

    /// Advances the player by one simulation tick.
    ///
    /// Returns true when the punch clip reached its contact frame this
    /// tick; the caller resolves the strike against the other entities
    /// once all updates have run.
    pub fn update(&mut self) -> bool {
        let reached = self.current_mut().advance();
        let mut strike = false;

        match self.action {
            ActionState::Idle => {
                let (dx, dy) = self.movement_delta();
                self.position.x += dx;
                self.position.y += dy;
                self.facing_right = dx >= 0.0;

                if self.keys.attack {
                    self.action = ActionState::Punch;
                    self.switch_clip(ClipId::punch(self.facing_right));
                } else if dx != 0.0 || dy != 0.0 {
                    self.switch_clip(ClipId::walk(self.facing_right));
                } else {
                    self.switch_clip(ClipId::idle(self.facing_right));
                }
            }
            ActionState::Punch => {
                if reached == Some(PUNCH_CONTACT_INDEX) {
                    strike = true;
                }
                if self.current().is_done() {
                    self.action = ActionState::Idle;
                    self.switch_clip(ClipId::idle(self.facing_right));
                }
            }
            ActionState::Hurt => {
                if self.current().is_done() {
                    self.action = ActionState::Idle;
                    self.switch_clip(ClipId::idle(self.facing_right));
                }
            }
        }

        self.position.x = self.position.x.clamp(0.0, ARENA_WIDTH);
        self.position.y = self.position.y.clamp(0.0, ARENA_HEIGHT);

        strike
    }

    /// Displacement for this tick from the held movement keys. Diagonal
    /// movement is scaled so it never exceeds axis-aligned speed.
    fn movement_delta(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.keys.left {
            dx -= WALK_SPEED_X;
        }
        if self.keys.right {
            dx += WALK_SPEED_X;
        }
        if self.keys.up {
            dy -= WALK_SPEED_Y;
        }
        if self.keys.down {
            dy += WALK_SPEED_Y;
        }
        if dx != 0.0 && dy != 0.0 {
            dx *= DIAGONAL_SCALE;
            dy *= DIAGONAL_SCALE;
        }
        (dx, dy)
    }

    /// Hitbox the player projects while punching, for the current facing.
    pub fn hitbox(&self) -> &'static BoxSpec {
        if self.facing_right {
            &HITBOX_RIGHT
        } else {
            &HITBOX_LEFT
        }
    }

    /// Puts the player into hit stun unless it is already there.
    pub fn enter_hurt(&mut self) {
        if self.action != ActionState::Hurt {
            self.action = ActionState::Hurt;
            self.current_clip = ClipId::hurt(self.facing_right);
            self.current_mut().reset();
        }
    }

    /// Applies damage, returning true when this hit was lethal.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        self.health -= damage;
        if self.health <= 0 {
            self.health = 0;
            self.die();
            true
        } else {
            false
        }
    }

    fn die(&mut self) {
        self.action = ActionState::Idle;
        self.keys.clear();
        self.position = OFF_ARENA;
        self.current_clip = ClipId::idle(self.facing_right);
        self.current_mut().reset();
    }

    /// Freezes the active clip for a few ticks (hitstop on both sides of
    /// a connected punch).
    pub fn pause_current(&mut self, ticks: u32) {
        self.current_mut().pause(ticks);
    }

    /// Brings the player back at `position` with full vitals and a clean
    /// input set.
    pub fn respawn(&mut self, position: Vec2) {
        self.health = MAX_HEALTH;
        self.position = position;
        self.action = ActionState::Idle;
        self.keys.clear();
        self.facing_right = true;
        self.current_clip = ClipId::IdleRight;
        self.current_mut().reset();
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            health: self.health,
            position: self.position,
            facing_right: self.facing_right,
            color: self.color.clone(),
            animation: AnimationStatus {
                name: self.current_clip.name().to_string(),
                index: self.current().current_frame(),
            },
        }
    }
}
