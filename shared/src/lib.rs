use serde::{Deserialize, Serialize};

pub const ARENA_WIDTH: f32 = 970.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const WALK_SPEED_X: f32 = 6.0;
pub const WALK_SPEED_Y: f32 = 4.0;
pub const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;
pub const MAX_HEALTH: i32 = 100;
pub const PUNCH_DAMAGE: i32 = 10;
pub const HITSTOP_TICKS: u32 = 5;

/// Hurtbox every player presents to incoming attacks, anchored at the
/// player's position.
pub const HURTBOX: BoxSpec = BoxSpec {
    offset: Vec2 { x: -22.0, y: -30.0 },
    size: Vec2 { x: 44.0, y: 60.0 },
};

/// Punch hitbox when facing right.
pub const HITBOX_RIGHT: BoxSpec = BoxSpec {
    offset: Vec2 { x: 0.0, y: -20.0 },
    size: Vec2 { x: 56.0, y: 40.0 },
};

/// Punch hitbox when facing left, mirror of [`HITBOX_RIGHT`].
pub const HITBOX_LEFT: BoxSpec = BoxSpec {
    offset: Vec2 { x: -56.0, y: -20.0 },
    size: Vec2 { x: 56.0, y: 40.0 },
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box described relative to a world anchor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub offset: Vec2,
    pub size: Vec2,
}

/// Open-interval AABB overlap test for two anchored boxes.
///
/// Boxes that share an edge exactly do not overlap; ties at pixel
/// boundaries must resolve the same way every tick.
pub fn boxes_overlap(pos_a: Vec2, a: &BoxSpec, pos_b: Vec2, b: &BoxSpec) -> bool {
    let a_left = pos_a.x + a.offset.x;
    let a_right = a_left + a.size.x;
    let a_top = pos_a.y + a.offset.y;
    let a_bottom = a_top + a.size.y;

    let b_left = pos_b.x + b.offset.x;
    let b_right = b_left + b.size.x;
    let b_top = pos_b.y + b.offset.y;
    let b_bottom = b_top + b.size.y;

    !(a_right <= b_left || b_right <= a_left || a_bottom <= b_top || b_bottom <= a_top)
}

/// Logical keys a client can hold down.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Attack,
}

impl Key {
    /// Parses the wire representation of a key. Unknown strings map to
    /// None and are dropped by the server without touching any entity.
    pub fn parse(s: &str) -> Option<Key> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Some(Key::Up),
            "DOWN" => Some(Key::Down),
            "LEFT" => Some(Key::Left),
            "RIGHT" => Some(Key::Right),
            "ATTACK" => Some(Key::Attack),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnimationStatus {
    /// Clip name, e.g. "punch_right".
    pub name: String,
    /// Absolute sprite-sheet frame to render.
    pub index: u32,
}

/// Per-player state published to clients every tick.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub name: String,
    pub health: i32,
    pub position: Vec2,
    pub facing_right: bool,
    pub color: String,
    pub animation: AnimationStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> server
    Connect {
        client_version: u32,
    },
    Join {
        username: String,
    },
    KeyInput {
        key: String,
        pressed: bool,
    },
    Respawn,
    Leave,
    Disconnect,

    // server -> client
    Connected {
        session_id: u32,
    },
    GameStatus {
        players: Vec<PlayerSnapshot>,
        total_players: u32,
        timestamp: u64,
    },
    PlayerDeath {
        message: String,
        killed_by: Option<String>,
    },
    Disconnected {
        reason: String,
    },
}
