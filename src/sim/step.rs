/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player physics (velocity, gravity, soft floor, horizontal clamp)
///   2. Movement intent (held keys → player vx, dead zone)
///   3. World scroll (platforms + checkpoints shift against held direction)
///   4. Platform contact (resting / landing)
///   5. Checkpoint claims (ordered, may complete the course)
///
/// The order matters: claims see this tick's final position and velocity.
/// Each stage is its own function so it can be exercised alone.

use log::info;

use crate::domain::entity::Command;
use crate::domain::physics;
use crate::domain::rules;
use super::control;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    apply_player_physics(world);
    apply_movement_intent(world);
    apply_world_scroll(world);
    resolve_platform_contacts(world);
    resolve_checkpoints(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Stages
// ══════════════════════════════════════════════════════════════

pub fn apply_player_physics(world: &mut WorldState) {
    physics::integrate(&mut world.player, world.physics.gravity, world.canvas);
}

/// Held keys decide vx. After completion there is no intent at all.
pub fn apply_movement_intent(world: &mut WorldState) {
    if !world.collision_active {
        world.player.velocity.x = 0.0;
        return;
    }
    let p = &world.physics;
    world.player.velocity.x = physics::horizontal_intent(
        world.player.position.x,
        world.keys,
        world.scale.resolve(p.advance_limit),
        world.scale.resolve(p.retreat_limit),
        p.walk_speed,
    );
}

/// Right wins over left. Suspended for good once the course is complete.
pub fn apply_world_scroll(world: &mut WorldState) {
    if !world.collision_active { return; }

    let speed = world.physics.scroll_speed;
    let dx = if world.keys.right {
        -speed
    } else if world.keys.left {
        speed
    } else {
        return;
    };

    for platform in &mut world.platforms {
        physics::scroll(&mut platform.position, dx);
    }
    for checkpoint in &mut world.checkpoints {
        physics::scroll(&mut checkpoint.position, dx);
    }
}

pub fn resolve_platform_contacts(world: &mut WorldState) {
    let gravity = world.physics.gravity;
    for platform in &world.platforms {
        physics::resolve_platform(&mut world.player, platform, gravity);
    }
}

/// Claims are evaluated in list order, so claiming checkpoint i in this
/// tick already satisfies the ordering rule for i + 1.
pub fn resolve_checkpoints(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.checkpoints.len() {
        if !rules::can_claim(&world.player, &world.checkpoints, i, world.collision_active) {
            continue;
        }

        world.checkpoints[i].claim();
        let id = world.checkpoints[i].id;
        info!("checkpoint {} claimed at tick {}", id, world.tick);

        if rules::is_final(&world.checkpoints, i) {
            world.collision_active = false;
            events.push(GameEvent::CourseComplete { id });
            info!("course complete at tick {}", world.tick);
            // Same as letting go of the right key; frozen, so it zeroes velocity.
            control::handle(world, Command::Right, 0.0, false);
        } else if rules::in_reach_band(&world.player, &world.checkpoints[i], world.physics.reach_band) {
            events.push(GameEvent::CheckpointReached { id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::entity::{Checkpoint, Platform, Player};
    use crate::domain::physics::Canvas;
    use crate::sim::level::{builtin, load_level};
    use glam::Vec2;

    /// 1000×600 canvas (no scaling), no course.
    fn bare_world() -> WorldState {
        let mut w = WorldState::new(Canvas::new(1000.0, 600.0), PhysicsConfig::default());
        w.phase = Phase::Playing;
        w.player = Player::new(Vec2::new(200.0, 100.0), 40.0, 40.0);
        w
    }

    fn course_world() -> WorldState {
        let mut w = WorldState::new(Canvas::new(1000.0, 600.0), PhysicsConfig::default());
        load_level(&mut w, &builtin());
        w.phase = Phase::Playing;
        w
    }

    fn three_checkpoints(w: &mut WorldState) {
        let s = w.scale;
        w.checkpoints = vec![
            Checkpoint::new(1, Vec2::new(300.0, 100.0), &s),
            Checkpoint::new(2, Vec2::new(500.0, 100.0), &s),
            Checkpoint::new(3, Vec2::new(700.0, 100.0), &s),
        ];
    }

    /// Park the player inside checkpoint `i`'s claim box, at rest.
    fn stand_at(w: &mut WorldState, i: usize) {
        let cp = &w.checkpoints[i];
        w.player.position = Vec2::new(cp.position.x + 5.0, cp.position.y + 10.0);
        w.player.velocity = Vec2::ZERO;
    }

    #[test]
    fn title_phase_does_nothing() {
        let mut w = course_world();
        w.phase = Phase::Title;
        let before = w.player.position;
        assert!(step(&mut w).is_empty());
        assert_eq!(w.tick, 0);
        assert_eq!(w.player.position, before);
    }

    #[test]
    fn resting_on_platform_is_stable() {
        let mut w = bare_world();
        let s = w.scale;
        w.platforms = vec![Platform::new(Vec2::new(100.0, 300.0), &s)];
        w.player.position = Vec2::new(150.0, 260.0);
        w.player.velocity = Vec2::ZERO;

        for _ in 0..5 {
            step(&mut w);
            assert_eq!(w.player.velocity.y, 0.0);
            assert_eq!(w.player.bottom(), 300.0);
        }
    }

    #[test]
    fn falling_player_lands_on_platform() {
        let mut w = bare_world();
        let s = w.scale;
        w.platforms = vec![Platform::new(Vec2::new(100.0, 300.0), &s)];
        w.player.position = Vec2::new(150.0, 100.0);

        for _ in 0..200 {
            step(&mut w);
            // Caught on the way down; never passes the top.
            assert!(w.player.bottom() <= 300.0);
        }
        assert!(w.player.bottom() >= 290.0);
    }

    #[test]
    fn gravity_accumulates_when_airborne() {
        let mut w = bare_world();
        let mut last = w.player.velocity.y;
        for _ in 0..10 {
            step(&mut w);
            assert_eq!(w.player.velocity.y, last + 0.5);
            last = w.player.velocity.y;
        }
    }

    #[test]
    fn intent_respects_dead_zone() {
        let mut w = bare_world();
        w.keys.right = true;
        step(&mut w);
        assert_eq!(w.player.velocity.x, 5.0);

        w.player.position.x = 400.0;
        step(&mut w);
        assert_eq!(w.player.velocity.x, 0.0);
    }

    #[test]
    fn right_held_scrolls_world_left() {
        let mut w = course_world();
        let xs: Vec<f32> = w.platforms.iter().map(|p| p.position.x).collect();
        let cxs: Vec<f32> = w.checkpoints.iter().map(|c| c.position.x).collect();
        w.keys.right = true;

        for n in 1..=10 {
            step(&mut w);
            for (p, x0) in w.platforms.iter().zip(&xs) {
                assert_eq!(p.position.x, x0 - 5.0 * n as f32);
            }
            for (c, x0) in w.checkpoints.iter().zip(&cxs) {
                assert_eq!(c.position.x, x0 - 5.0 * n as f32);
            }
        }
    }

    #[test]
    fn left_held_scrolls_world_right() {
        let mut w = course_world();
        let x0 = w.platforms[3].position.x;
        w.keys.left = true;
        step(&mut w);
        assert_eq!(w.platforms[3].position.x, x0 + 5.0);
    }

    #[test]
    fn out_of_order_claim_never_happens() {
        let mut w = bare_world();
        three_checkpoints(&mut w);
        stand_at(&mut w, 1);
        let events = step(&mut w);
        assert!(events.is_empty());
        assert_eq!(w.claimed_count(), 0);
    }

    #[test]
    fn claim_emits_reached_event() {
        let mut w = bare_world();
        three_checkpoints(&mut w);
        stand_at(&mut w, 0);
        let events = step(&mut w);
        assert_eq!(events, vec![GameEvent::CheckpointReached { id: 1 }]);
        assert!(w.checkpoints[0].is_claimed());
        assert!(w.collision_active);
    }

    #[test]
    fn final_claim_freezes_course() {
        let mut w = bare_world();
        three_checkpoints(&mut w);
        for i in 0..2 {
            stand_at(&mut w, i);
            step(&mut w);
        }
        w.keys.right = true;
        stand_at(&mut w, 2);
        w.player.velocity.x = 5.0;

        let events = step(&mut w);
        assert_eq!(events, vec![GameEvent::CourseComplete { id: 3 }]);
        assert!(!w.collision_active);
        assert_eq!(w.player.velocity, Vec2::ZERO);

        // Further input is swallowed.
        control::handle_key(&mut w, "ArrowRight", 8.0, true);
        assert_eq!(w.player.velocity, Vec2::ZERO);
    }

    #[test]
    fn scroll_stops_after_completion() {
        let mut w = bare_world();
        three_checkpoints(&mut w);
        for i in 0..3 {
            stand_at(&mut w, i);
            step(&mut w);
        }
        assert!(w.is_complete());

        let xs: Vec<f32> = w.checkpoints.iter().map(|c| c.position.x).collect();
        w.keys.right = true;
        for _ in 0..10 {
            step(&mut w);
            assert_eq!(w.player.velocity.x, 0.0);
        }
        let after: Vec<f32> = w.checkpoints.iter().map(|c| c.position.x).collect();
        assert_eq!(xs, after);
    }

    #[test]
    fn chained_claims_in_one_tick() {
        let mut w = bare_world();
        let s = w.scale;
        // Two overlapping checkpoints: the second becomes claimable as
        // soon as the first is claimed, within the same tick.
        w.checkpoints = vec![
            Checkpoint::new(1, Vec2::new(300.0, 100.0), &s),
            Checkpoint::new(2, Vec2::new(300.0, 100.0), &s),
            Checkpoint::new(3, Vec2::new(900.0, 100.0), &s),
        ];
        stand_at(&mut w, 0);
        let events = step(&mut w);
        assert_eq!(events.len(), 2);
        assert_eq!(w.claimed_count(), 2);
        assert!(w.collision_active);
    }

    // ── Property-based tests (proptest) ──

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// One input event between ticks.
        #[derive(Clone, Debug)]
        enum Ev {
            Down(&'static str),
            Up(&'static str),
            Tick,
        }

        fn ev() -> impl Strategy<Value = Ev> {
            let key = prop::sample::select(vec!["ArrowLeft", "ArrowRight", "ArrowUp", " ", "x"]);
            prop_oneof![
                key.clone().prop_map(Ev::Down),
                key.prop_map(Ev::Up),
                Just(Ev::Tick),
                Just(Ev::Tick),
                Just(Ev::Tick),
            ]
        }

        fn run(w: &mut WorldState, evs: &[Ev], mut each_tick: impl FnMut(&WorldState)) {
            for e in evs {
                match e {
                    Ev::Down(k) => { control::handle_key(w, k, 8.0, true); }
                    Ev::Up(k) => { control::handle_key(w, k, 0.0, false); }
                    Ev::Tick => {
                        step(w);
                        each_tick(w);
                    }
                }
            }
        }

        proptest! {
            #[test]
            fn player_stays_inside_horizontal_band(
                evs in proptest::collection::vec(ev(), 1..300)
            ) {
                let mut w = course_world();
                let lo = w.player.width();
                let hi = w.canvas.right_wall(w.player.width());
                run(&mut w, &evs, |w| {
                    let x = w.player.position.x;
                    assert!(x >= lo && x <= hi, "x={} outside [{}, {}]", x, lo, hi);
                });
            }

            #[test]
            fn claims_are_ordered_and_monotonic(
                evs in proptest::collection::vec(ev(), 1..300),
                teleports in proptest::collection::vec(0usize..3, 0..6)
            ) {
                let mut w = bare_world();
                three_checkpoints(&mut w);
                let mut prev: Vec<bool> = vec![false; 3];
                for &i in &teleports {
                    stand_at(&mut w, i);
                    run(&mut w, &evs, |w| {
                        for (j, cp) in w.checkpoints.iter().enumerate() {
                            if j > 0 && cp.is_claimed() {
                                assert!(w.checkpoints[j - 1].is_claimed());
                            }
                        }
                    });
                    let now: Vec<bool> = w.checkpoints.iter().map(|c| c.is_claimed()).collect();
                    for (a, b) in prev.iter().zip(&now) {
                        prop_assert!(!a || *b, "a claim was undone");
                    }
                    prev = now;
                }
            }

            #[test]
            fn nothing_scrolls_once_complete(
                evs in proptest::collection::vec(ev(), 1..200)
            ) {
                let mut w = bare_world();
                three_checkpoints(&mut w);
                for i in 0..3 {
                    stand_at(&mut w, i);
                    step(&mut w);
                }
                prop_assert!(w.is_complete());
                let xs: Vec<f32> = w.checkpoints.iter().map(|c| c.position.x).collect();
                run(&mut w, &evs, |_| {});
                let after: Vec<f32> = w.checkpoints.iter().map(|c| c.position.x).collect();
                prop_assert_eq!(xs, after);
            }
        }
    }
}
