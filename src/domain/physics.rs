/// Continuous player physics and platform contact.
///
/// ## Integration (one call per tick)
///
///   1. position += velocity
///   2. Soft floor: if the player's next bottom (y + height + vy) is still
///      inside the canvas it is airborne. Airborne players above the top
///      edge are pinned to y = 0 with vy reset to `gravity`, then gravity
///      is added. Otherwise vy = 0.
///   3. Horizontal clamp to [width, canvas_width - 2·width].
///
/// The canvas bottom is the only implicit floor. Platforms are the real
/// standing surfaces.
///
/// ## Platform contact
///
/// Two rule sets per platform, checked in order:
///   - RESTING: bottom ≤ top, bottom + vy ≥ top, x inside the band.
///     Freeze vertical motion (vy = 0).
///   - LANDING: x inside the band, bottom ≥ top, top ≤ platform bottom.
///     Snap bottom onto the platform top and re-arm falling (vy = gravity).
///
/// The horizontal band is asymmetric: width/2 of slack on the left,
/// width/3 on the right.

use glam::Vec2;

use super::entity::{HeldKeys, Platform, Player};

/// Logical drawing surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Canvas { width, height }
    }

    /// Rightmost x a player of `player_width` may occupy.
    #[inline]
    pub fn right_wall(&self, player_width: f32) -> f32 {
        self.width - player_width * 2.0
    }
}

// ══════════════════════════════════════════════════════════════
// Integration
// ══════════════════════════════════════════════════════════════

/// Advance the player by one tick of velocity and gravity.
pub fn integrate(player: &mut Player, gravity: f32, canvas: Canvas) {
    player.position += player.velocity;

    if player.bottom() + player.velocity.y <= canvas.height {
        if player.position.y < 0.0 {
            player.position.y = 0.0;
            player.velocity.y = gravity;
        }
        player.velocity.y += gravity;
    } else {
        player.velocity.y = 0.0;
    }

    clamp_horizontal(player, canvas);
}

/// Keep the player inside the horizontal band.
pub fn clamp_horizontal(player: &mut Player, canvas: Canvas) {
    let w = player.width();
    if player.position.x < w {
        player.position.x = w;
    }
    let right = canvas.right_wall(w);
    if player.position.x >= right {
        player.position.x = right;
    }
}

/// Horizontal velocity for this tick from the held keys.
///
/// Outside [retreat_limit, advance_limit] the player stops moving in the
/// held direction; the world scrolls instead.
pub fn horizontal_intent(
    x: f32,
    keys: HeldKeys,
    advance_limit: f32,
    retreat_limit: f32,
    speed: f32,
) -> f32 {
    if keys.right && x < advance_limit {
        speed
    } else if keys.left && x > retreat_limit {
        -speed
    } else {
        0.0
    }
}

// ══════════════════════════════════════════════════════════════
// Platform contact
// ══════════════════════════════════════════════════════════════

/// Outcome of checking one platform.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    /// Already standing on it; vertical motion frozen.
    Resting,
    /// Overlapped from above; snapped onto the top.
    Landed,
    None,
}

/// Is the player's x inside the platform's (asymmetric) landing band?
#[inline]
pub fn within_band(player: &Player, platform: &Platform) -> bool {
    let x = player.position.x;
    x >= platform.position.x - player.width() / 2.0
        && x <= platform.position.x + platform.width() - player.width() / 3.0
}

/// Bottom on or above the top, and this tick's fall would reach it.
pub fn rests_on(player: &Player, platform: &Platform) -> bool {
    let bottom = player.bottom();
    bottom <= platform.top()
        && bottom + player.velocity.y >= platform.top()
        && within_band(player, platform)
}

/// Overlapping the platform's vertical extent from above.
pub fn lands_on(player: &Player, platform: &Platform) -> bool {
    within_band(player, platform)
        && player.bottom() >= platform.top()
        && player.position.y <= platform.bottom()
}

/// Put the player's bottom on the platform's top.
pub fn snap_onto(player: &mut Player, platform: &Platform, gravity: f32) {
    player.position.y = platform.top() - player.height();
    player.velocity.y = gravity;
}

/// Apply both rule sets for one platform.
pub fn resolve_platform(player: &mut Player, platform: &Platform, gravity: f32) -> Contact {
    if rests_on(player, platform) {
        player.velocity.y = 0.0;
        return Contact::Resting;
    }
    if lands_on(player, platform) {
        snap_onto(player, platform, gravity);
        return Contact::Landed;
    }
    Contact::None
}

/// Shift a world position by the scroll offset.
#[inline]
pub fn scroll(position: &mut Vec2, dx: f32) {
    position.x += dx;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
