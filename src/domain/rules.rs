/// Checkpoint claim rules.
///
/// A checkpoint may be claimed only when ALL of:
///   - the player's x is at or past the checkpoint's x
///   - the player's top is at or below the checkpoint's top
///   - the player's bottom is at or above the checkpoint's bottom
///   - checkpoint collision is still active
///   - the player is close enough: x − w ≤ cp.x − cp.w + 0.9·w
///   - it is the first checkpoint, or its predecessor is already claimed
///
/// The last rule forces strictly left-to-right completion no matter what
/// the player can physically reach.

use super::entity::{Checkpoint, Player};

/// Fraction of the player's width allowed past the checkpoint's far edge.
const REACH_FACTOR: f32 = 0.9;

/// Spatial part of the claim rule. A claimed checkpoint (y = +∞, zero
/// size) never passes.
pub fn within_claim_box(player: &Player, cp: &Checkpoint) -> bool {
    let p = player.position;
    let w = player.width();
    p.x >= cp.position.x
        && p.y >= cp.position.y
        && player.bottom() <= cp.position.y + cp.height()
        && p.x - w <= cp.position.x - cp.width() + w * REACH_FACTOR
}

/// Ordering part of the claim rule.
pub fn predecessor_claimed(checkpoints: &[Checkpoint], index: usize) -> bool {
    index == 0
        || checkpoints
            .get(index - 1)
            .map_or(false, |prev| prev.is_claimed())
}

/// Full claim rule for `checkpoints[index]`.
pub fn can_claim(player: &Player, checkpoints: &[Checkpoint], index: usize, active: bool) -> bool {
    let cp = match checkpoints.get(index) {
        Some(cp) => cp,
        None => return false,
    };
    active
        && !cp.is_claimed()
        && within_claim_box(player, cp)
        && predecessor_claimed(checkpoints, index)
}

/// Is this the end of the course?
#[inline]
pub fn is_final(checkpoints: &[Checkpoint], index: usize) -> bool {
    index + 1 == checkpoints.len()
}

/// Is the player standing right at the checkpoint (within `band` pixels
/// past its x)? Used only to decide whether to show the reached message.
pub fn in_reach_band(player: &Player, cp: &Checkpoint, band: f32) -> bool {
    let x = player.position.x;
    x >= cp.position.x && x <= cp.position.x + band
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scale::Scale;
    use glam::Vec2;

    fn course() -> Vec<Checkpoint> {
        let s = Scale::new(800.0);
        vec![
            Checkpoint::new(1, Vec2::new(100.0, 100.0), &s),
            Checkpoint::new(2, Vec2::new(300.0, 100.0), &s),
            Checkpoint::new(3, Vec2::new(500.0, 100.0), &s),
        ]
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y), 40.0, 40.0)
    }

    #[test]
    fn claim_box_bounds() {
        let cps = course();
        let cp = &cps[0];
        // x in [100, 136], y in [100, 130]
        assert!(within_claim_box(&player_at(100.0, 100.0), cp));
        assert!(within_claim_box(&player_at(135.0, 130.0), cp));
        assert!(!within_claim_box(&player_at(99.0, 110.0), cp));
        assert!(!within_claim_box(&player_at(138.0, 110.0), cp));
        assert!(!within_claim_box(&player_at(110.0, 99.0), cp));
        assert!(!within_claim_box(&player_at(110.0, 131.0), cp));
    }

    #[test]
    fn first_checkpoint_has_no_predecessor() {
        let cps = course();
        assert!(predecessor_claimed(&cps, 0));
        assert!(!predecessor_claimed(&cps, 1));
    }

    #[test]
    fn later_checkpoint_waits_for_predecessor() {
        let mut cps = course();
        let p = player_at(300.0, 100.0);
        assert!(within_claim_box(&p, &cps[1]));
        assert!(!can_claim(&p, &cps, 1, true));

        cps[0].claim();
        assert!(can_claim(&p, &cps, 1, true));
    }

    #[test]
    fn inactive_blocks_every_claim() {
        let cps = course();
        assert!(!can_claim(&player_at(100.0, 100.0), &cps, 0, false));
    }

    #[test]
    fn claimed_checkpoint_never_passes() {
        let mut cps = course();
        let p = player_at(100.0, 100.0);
        cps[0].claim();
        assert!(!within_claim_box(&p, &cps[0]));
        assert!(!can_claim(&p, &cps, 0, true));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let cps = course();
        assert!(!can_claim(&player_at(100.0, 100.0), &cps, 7, true));
    }

    #[test]
    fn final_and_reach_band() {
        let cps = course();
        assert!(!is_final(&cps, 1));
        assert!(is_final(&cps, 2));
        assert!(in_reach_band(&player_at(140.0, 0.0), &cps[0], 40.0));
        assert!(!in_reach_band(&player_at(141.0, 0.0), &cps[0], 40.0));
    }
}
