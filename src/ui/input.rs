/// Keyboard input tracker.
///
/// Turns terminal key events into key transitions named with browser-style
/// identifiers (`ArrowLeft`, `ArrowRight`, `ArrowUp`, `" "`, ...):
///   - Press and Repeat → key-down (the course applies an impulse each time)
///   - Release → key-up
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::config::KeysConfig;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// One key going down or coming up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyTransition {
    /// Browser-style identifier, after alias resolution.
    pub key: String,
    pub pressed: bool,
}

impl KeyTransition {
    pub fn down(key: impl Into<String>) -> Self {
        KeyTransition { key: key.into(), pressed: true }
    }

    pub fn up(key: impl Into<String>) -> Self {
        KeyTransition { key: key.into(), pressed: false }
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event, keyed by resolved identifier.
    last_active: HashMap<String, Instant>,

    /// Extra key names from config → the identifier they stand for.
    aliases: HashMap<KeyCode, &'static str>,

    /// Transitions produced by the most recent drain_events() call, in order.
    pub transitions: Vec<KeyTransition>,

    /// Raw key presses collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new(keys: &KeysConfig) -> Self {
        let mut aliases = HashMap::new();
        let groups: [(&[String], &'static str); 3] = [
            (keys.left.as_slice(), "ArrowLeft"),
            (keys.right.as_slice(), "ArrowRight"),
            (keys.jump.as_slice(), "ArrowUp"),
        ];
        for (names, target) in groups {
            for name in names {
                match key_from_name(name) {
                    Some(code) => { aliases.insert(code, target); }
                    None => log::warn!("unknown key name in [keys]: {:?}", name),
                }
            }
        }

        InputState {
            last_active: HashMap::with_capacity(16),
            aliases,
            transitions: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events into transitions.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.transitions.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.on_key(key, Instant::now());
            }
        }

        if !self.honor_release {
            self.expire(Instant::now());
        }
    }

    /// Drop every held key without reporting it. Used when a key press
    /// has already been consumed by a screen change.
    pub fn forget_held(&mut self) {
        self.last_active.clear();
    }

    /// Feed one key event.
    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        let id = match self.identifier(key.code) {
            Some(id) => id,
            None => return,
        };

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if self.last_active.remove(&id).is_some() {
                    self.transitions.push(KeyTransition::up(id));
                }
            }
            KeyEventKind::Release => {
                // Enhancement not confirmed; rely on timeout-based expiry
            }
            _ => {
                self.raw_events.push(key);
                self.last_active.insert(id.clone(), now);
                self.transitions.push(KeyTransition::down(id));
            }
        }
    }

    /// Keys not refreshed within HOLD_TIMEOUT come up. Only for terminals
    /// that never report releases.
    fn expire(&mut self, now: Instant) {
        let mut expired: Vec<String> = self.last_active.iter()
            .filter(|(_, t)| now.duration_since(**t) >= HOLD_TIMEOUT)
            .map(|(k, _)| k.clone())
            .collect();
        expired.sort();
        for id in expired {
            self.last_active.remove(&id);
            self.transitions.push(KeyTransition::up(id));
        }
    }

    /// Was this key pressed this frame? (edge trigger, raw code)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn identifier(&self, code: KeyCode) -> Option<String> {
        if let Some(target) = self.aliases.get(&code) {
            return Some((*target).to_string());
        }
        key_identifier(code)
    }
}

/// Browser-style identifier for a terminal key code.
pub fn key_identifier(code: KeyCode) -> Option<String> {
    let id = match code {
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Escape",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Char(c) => return Some(c.to_string()),
        _ => return None,
    };
    Some(id.to_string())
}

/// Parse a key name from config (`"a"`, `"Left"`, `"Space"`, ...).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match name.to_ascii_lowercase().as_str() {
        "left" | "arrowleft" => Some(KeyCode::Left),
        "right" | "arrowright" => Some(KeyCode::Right),
        "up" | "arrowup" => Some(KeyCode::Up),
        "down" | "arrowdown" => Some(KeyCode::Down),
        "space" | "spacebar" => Some(KeyCode::Char(' ')),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        _ => None,
    }
}
