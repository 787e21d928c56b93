/// Movement commands from key events.
///
/// Key-down events arrive with magnitude = key impulse and `is_active` =
/// true; key-up events with magnitude 0 and `is_active` = false. A zero
/// magnitude is how "stop" is told apart from "move".
///
/// Once the course is complete every command, recognised or not, just
/// zeroes the player's velocity.

use crate::domain::entity::Command;
use crate::sim::world::WorldState;

/// Apply a command. Returns false when the course is frozen and the
/// command was swallowed.
pub fn handle(world: &mut WorldState, command: Command, magnitude: f32, is_active: bool) -> bool {
    if !world.collision_active {
        freeze(world);
        return false;
    }

    let v = &mut world.player.velocity;
    match command {
        Command::Left => {
            world.keys.left = is_active;
            if magnitude == 0.0 {
                v.x = 0.0;
            } else {
                v.x -= magnitude;
            }
        }
        Command::Right => {
            world.keys.right = is_active;
            if magnitude == 0.0 {
                v.x = 0.0;
            } else {
                v.x += magnitude;
            }
        }
        // Stacks on every event, press or release.
        Command::Jump => v.y -= world.physics.jump_impulse,
    }
    true
}

/// Apply a key event by identifier (`ArrowLeft`, `ArrowRight`, `ArrowUp`,
/// `" "`, `Spacebar`). Unrecognised keys do nothing while the course is
/// running.
pub fn handle_key(world: &mut WorldState, key: &str, magnitude: f32, is_active: bool) -> bool {
    if !world.collision_active {
        freeze(world);
        return false;
    }
    match Command::from_key(key) {
        Some(command) => handle(world, command, magnitude, is_active),
        None => false,
    }
}

fn freeze(world: &mut WorldState) {
    world.player.velocity.x = 0.0;
    world.player.velocity.y = 0.0;
}
