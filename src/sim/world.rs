/// WorldState: the complete simulation context of a running game.
///
/// Every piece of process-wide state the step reads or writes lives here,
/// passed explicitly to each stage:
///   - `player`       — the single player, never replaced while playing
///   - `platforms`    — standing surfaces, scrolled with the world
///   - `checkpoints`  — ordered; the order is the claim sequence
///   - `keys`         — held directions, written by key events between ticks
///   - `collision_active` — cleared once, when the last checkpoint is claimed
///
/// ## Coordinates
///
/// Positions are logical canvas pixels, y down. The world scrolls instead
/// of the player: while a direction is held, platforms and checkpoints move
/// the opposite way and the player's own x stays in its dead-zone band.

use crate::config::PhysicsConfig;
use crate::domain::entity::{Body, Checkpoint, HeldKeys, Platform, Player};
use crate::domain::physics::Canvas;
use crate::domain::scale::Scale;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Start screen; the step is a no-op.
    Title,
    Playing,
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub checkpoints: Vec<Checkpoint>,

    // ── Input ──
    pub keys: HeldKeys,

    // ── Progression ──
    /// Gates world scroll, checkpoint claims and movement commands.
    pub collision_active: bool,

    // ── Geometry (fixed at startup) ──
    pub canvas: Canvas,
    pub scale: Scale,

    // ── Tuning ──
    pub physics: PhysicsConfig,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
}

// ── Construction ──

impl WorldState {
    /// An empty world on `canvas`. The viewport height used for
    /// proportional sizing is the canvas height.
    pub fn new(canvas: Canvas, physics: PhysicsConfig) -> Self {
        let scale = Scale::new(canvas.height);
        WorldState {
            player: Player::spawn(&scale),
            platforms: vec![],
            checkpoints: vec![],
            keys: HeldKeys::default(),
            collision_active: true,
            canvas,
            scale,
            physics,
            phase: Phase::Title,
            tick: 0,
        }
    }
}

// ── Queries ──

impl WorldState {
    /// Number of checkpoints claimed so far.
    pub fn claimed_count(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.is_claimed()).count()
    }

    /// True once the final checkpoint has been claimed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.collision_active
    }

    /// Everything drawable, back to front: platforms, checkpoints, player.
    pub fn bodies(&self) -> impl Iterator<Item = &dyn Body> + '_ {
        self.platforms.iter().map(|p| p as &dyn Body)
            .chain(self.checkpoints.iter().map(|c| c as &dyn Body))
            .chain(std::iter::once(&self.player as &dyn Body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn new_world_starts_on_title() {
        let w = WorldState::new(Canvas::new(800.0, 400.0), PhysicsConfig::default());
        assert_eq!(w.phase, Phase::Title);
        assert!(w.collision_active);
        assert!(!w.is_complete());
        assert_eq!(w.scale.viewport_height(), 400.0);
        assert_eq!(w.player.width(), 32.0);
    }

    #[test]
    fn bodies_are_back_to_front() {
        let mut w = WorldState::new(Canvas::new(800.0, 600.0), PhysicsConfig::default());
        let s = w.scale;
        w.platforms.push(Platform::new(Vec2::new(0.0, 450.0), &s));
        w.checkpoints.push(Checkpoint::new(1, Vec2::new(300.0, 80.0), &s));
        let kinds: Vec<_> = w.bodies().map(|b| b.fill()).collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], crate::domain::entity::PLATFORM_FILL);
        assert_eq!(kinds[1], crate::domain::entity::CHECKPOINT_FILL);
        assert_eq!(kinds[2], crate::domain::entity::PLAYER_FILL);
    }

    #[test]
    fn claimed_count_tracks_claims() {
        let mut w = WorldState::new(Canvas::new(800.0, 600.0), PhysicsConfig::default());
        let s = w.scale;
        w.checkpoints.push(Checkpoint::new(1, Vec2::new(300.0, 80.0), &s));
        w.checkpoints.push(Checkpoint::new(2, Vec2::new(600.0, 80.0), &s));
        assert_eq!(w.claimed_count(), 0);
        w.checkpoints[0].claim();
        assert_eq!(w.claimed_count(), 1);
    }
}
