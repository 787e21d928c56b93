/// Entities: Player, Platform, Checkpoint, plus the input vocabulary.
///
/// Positions are logical canvas pixels with y growing downward. Every
/// entity exposes the same drawing capability (`Body`) so the renderer can
/// treat the three kinds uniformly without an inheritance tree.

use glam::Vec2;

use super::scale::Scale;

/// Fixed platform width. Unlike every other dimension it is not scaled.
pub const PLATFORM_WIDTH: f32 = 200.0;

/// Fill colour, RGB.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const PLAYER_FILL: Rgb = Rgb(0x6B, 0xCA, 0xE2);
pub const PLATFORM_FILL: Rgb = Rgb(0xFE, 0x84, 0x02);
pub const CHECKPOINT_FILL: Rgb = Rgb(0x87, 0xE2, 0x93);

/// What the renderer needs to draw something. Implementations must not
/// mutate state; drawing is read-only.
pub trait Body {
    fn position(&self) -> Vec2;
    /// (width, height)
    fn size(&self) -> Vec2;
    fn fill(&self) -> Rgb;

    /// Zero-area or off-model bodies (a claimed checkpoint) are skipped.
    fn is_visible(&self) -> bool {
        let p = self.position();
        let s = self.size();
        p.is_finite() && s.x > 0.0 && s.y > 0.0
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    width: f32,
    height: f32,
}

impl Player {
    /// Spawn near the left edge, standing height above the first platform.
    pub fn spawn(scale: &Scale) -> Self {
        Player::new(
            Vec2::new(scale.resolve(10.0), scale.resolve(400.0)),
            scale.resolve(40.0),
            scale.resolve(40.0),
        )
    }

    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Player { position, velocity: Vec2::ZERO, width, height }
    }

    pub fn width(&self) -> f32 { self.width }
    pub fn height(&self) -> f32 { self.height }

    /// y of the player's bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }
}

impl Body for Player {
    fn position(&self) -> Vec2 { self.position }
    fn size(&self) -> Vec2 { Vec2::new(self.width, self.height) }
    fn fill(&self) -> Rgb { PLAYER_FILL }
}

// ── Platform ──

#[derive(Clone, Debug)]
pub struct Platform {
    pub position: Vec2,
    height: f32,
}

impl Platform {
    pub fn new(position: Vec2, scale: &Scale) -> Self {
        Platform { position, height: scale.resolve(40.0) }
    }

    pub fn width(&self) -> f32 { PLATFORM_WIDTH }
    pub fn height(&self) -> f32 { self.height }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }
}

impl Body for Platform {
    fn position(&self) -> Vec2 { self.position }
    fn size(&self) -> Vec2 { Vec2::new(PLATFORM_WIDTH, self.height) }
    fn fill(&self) -> Rgb { PLATFORM_FILL }
}

// ── Checkpoint ──

/// A flag on the course. Claiming collapses its hitbox and parks it at
/// y = +∞, where every later spatial comparison fails.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    pub id: u32,
    pub position: Vec2,
    width: f32,
    height: f32,
    claimed: bool,
}

impl Checkpoint {
    pub fn new(id: u32, position: Vec2, scale: &Scale) -> Self {
        Checkpoint {
            id,
            position,
            width: scale.resolve(40.0),
            height: scale.resolve(70.0),
            claimed: false,
        }
    }

    pub fn width(&self) -> f32 { self.width }
    pub fn height(&self) -> f32 { self.height }
    pub fn is_claimed(&self) -> bool { self.claimed }

    /// One-way transition to claimed. Repeat calls change nothing.
    pub fn claim(&mut self) {
        if self.claimed { return; }
        self.width = 0.0;
        self.height = 0.0;
        self.position.y = f32::INFINITY;
        self.claimed = true;
    }
}

impl Body for Checkpoint {
    fn position(&self) -> Vec2 { self.position }
    fn size(&self) -> Vec2 { Vec2::new(self.width, self.height) }
    fn fill(&self) -> Rgb { CHECKPOINT_FILL }
}

// ── Input vocabulary ──

/// A recognised movement command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Left,
    Right,
    Jump,
}

impl Command {
    /// Map a browser-style key identifier. Anything else is ignored.
    pub fn from_key(key: &str) -> Option<Command> {
        match key {
            "ArrowLeft" => Some(Command::Left),
            "ArrowRight" => Some(Command::Right),
            "ArrowUp" | " " | "Spacebar" => Some(Command::Jump),
            _ => None,
        }
    }
}

/// Which directions are currently held. Written by key events between
/// ticks, read by the step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}
