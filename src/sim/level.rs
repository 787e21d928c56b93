/// The course: platform and checkpoint placements.
///
/// Placements are static configuration. x is authored in canvas pixels
/// and never scaled; y is proportional and scaled at load time.
///
/// Checkpoints are listed in claim order. The id is a display label only;
/// ordering comes from the list position.

use glam::Vec2;
use log::info;

use crate::domain::entity::{Checkpoint, HeldKeys, Platform, Player};
use crate::sim::world::WorldState;

/// Static course data, nominal (unscaled) coordinates.
pub struct LevelDef {
    pub name: &'static str,
    /// (x, y)
    pub platforms: &'static [(f32, f32)],
    /// (x, y, id)
    pub checkpoints: &'static [(f32, f32, u32)],
}

const PLATFORMS: &[(f32, f32)] = &[
    (0.0, 450.0),
    (250.0, 200.0),
    (580.0, 400.0),
    (900.0, 350.0),
    (1100.0, 350.0),
    (1250.0, 150.0),
    (1650.0, 350.0),
    (1950.0, 175.0),
    (2300.0, 350.0),
    (2500.0, 475.0),
    (2750.0, 400.0),
    (3100.0, 200.0),
    (3500.0, 150.0),
];

const CHECKPOINTS: &[(f32, f32, u32)] = &[
    (1350.0, 80.0, 1),
    (2350.0, 280.0, 2),
    (3550.0, 80.0, 3),
];

/// The built-in course.
pub fn builtin() -> LevelDef {
    LevelDef {
        name: "Skyline",
        platforms: PLATFORMS,
        checkpoints: CHECKPOINTS,
    }
}

/// Build the course into `world`, resetting player, input and progression.
/// The phase is left to the caller.
pub fn load_level(world: &mut WorldState, def: &LevelDef) {
    let scale = world.scale;

    world.player = Player::spawn(&scale);
    world.platforms = def.platforms.iter()
        .map(|&(x, y)| Platform::new(Vec2::new(x, scale.resolve(y)), &scale))
        .collect();
    world.checkpoints = def.checkpoints.iter()
        .map(|&(x, y, id)| Checkpoint::new(id, Vec2::new(x, scale.resolve(y)), &scale))
        .collect();
    world.keys = HeldKeys::default();
    world.collision_active = true;
    world.tick = 0;

    info!(
        "course '{}' loaded: {} platforms, {} checkpoints, viewport {}px",
        def.name,
        world.platforms.len(),
        world.checkpoints.len(),
        scale.viewport_height(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::physics::Canvas;

    #[test]
    fn builtin_course_layout() {
        let def = builtin();
        assert_eq!(def.platforms.len(), 13);
        assert_eq!(def.checkpoints.len(), 3);
        // Claim order runs left to right.
        assert!(def.checkpoints.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn load_scales_y_but_not_x() {
        let mut w = WorldState::new(Canvas::new(800.0, 400.0), PhysicsConfig::default());
        load_level(&mut w, &builtin());
        assert_eq!(w.platforms[0].position, Vec2::new(0.0, 360.0));
        assert_eq!(w.platforms[1].position, Vec2::new(250.0, 160.0));
        assert_eq!(w.checkpoints[0].position, Vec2::new(1350.0, 64.0));
        assert_eq!(w.checkpoints[2].id, 3);
    }

    #[test]
    fn reload_resets_progression() {
        let mut w = WorldState::new(Canvas::new(800.0, 600.0), PhysicsConfig::default());
        load_level(&mut w, &builtin());
        w.checkpoints[0].claim();
        w.collision_active = false;
        w.keys.right = true;
        w.platforms[0].position.x = -500.0;

        load_level(&mut w, &builtin());
        assert_eq!(w.claimed_count(), 0);
        assert!(w.collision_active);
        assert_eq!(w.keys, HeldKeys::default());
        assert_eq!(w.platforms[0].position.x, 0.0);
    }
}
