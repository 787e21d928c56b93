/// On-screen message banner.
///
/// Shows one message at a time. A checkpoint message hides itself after
/// the configured interval; the completion message stays until the course
/// is reloaded. A newer message always replaces the current one.

use std::time::{Duration, Instant};

use crate::sim::event::GameEvent;

pub struct Banner {
    text: Option<&'static str>,
    /// `None` while visible means "until cleared".
    expires_at: Option<Instant>,
    duration: Duration,
}

impl Banner {
    pub fn new(duration: Duration) -> Self {
        Banner { text: None, expires_at: None, duration }
    }

    /// Show the message for `event`.
    pub fn show(&mut self, event: &GameEvent, now: Instant) {
        self.text = Some(event.message());
        self.expires_at = if event.auto_dismiss() {
            Some(now + self.duration)
        } else {
            None
        };
    }

    /// Hide an auto-dismiss message whose time is up.
    pub fn expire(&mut self, now: Instant) {
        if let Some(t) = self.expires_at {
            if now >= t {
                self.clear();
            }
        }
    }

    pub fn clear(&mut self) {
        self.text = None;
        self.expires_at = None;
    }

    pub fn text(&self) -> Option<&'static str> {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_millis(2000);

    #[test]
    fn checkpoint_message_auto_hides() {
        let mut b = Banner::new(HOLD);
        let t0 = Instant::now();
        b.show(&GameEvent::CheckpointReached { id: 1 }, t0);
        assert_eq!(b.text(), Some("You reached a checkpoint!"));

        b.expire(t0 + Duration::from_millis(1999));
        assert!(b.text().is_some());

        b.expire(t0 + HOLD);
        assert_eq!(b.text(), None);
    }

    #[test]
    fn completion_message_persists() {
        let mut b = Banner::new(HOLD);
        let t0 = Instant::now();
        b.show(&GameEvent::CourseComplete { id: 3 }, t0);
        b.expire(t0 + Duration::from_secs(60));
        assert_eq!(b.text(), Some("You reached the final checkpoint!"));
    }

    #[test]
    fn newer_message_replaces_timer() {
        let mut b = Banner::new(HOLD);
        let t0 = Instant::now();
        b.show(&GameEvent::CheckpointReached { id: 1 }, t0);
        b.show(&GameEvent::CourseComplete { id: 2 }, t0 + Duration::from_millis(500));
        // The first message's deadline no longer applies.
        b.expire(t0 + HOLD);
        assert_eq!(b.text(), Some("You reached the final checkpoint!"));

        b.clear();
        assert_eq!(b.text(), None);
    }
}
