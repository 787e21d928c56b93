/// Gamepad input tracker using gilrs.
///
/// Produces the same key transitions as the keyboard, so the course never
/// knows which device moved it. Button mapping comes from `[gamepad]` in
/// config.toml. Default mapping:
///   D-pad / Left Stick    →  ArrowLeft / ArrowRight (held)
///   A                     →  Jump
///   Start                 →  Start game
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::KeyTransition;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held plus press/release edges for this frame.
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
    just_released: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    jump: Vec<Btn>,
    start: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
            let list: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if list.is_empty() { fallback.to_vec() } else { list }
        }
        ActionMap {
            jump: parse_list(&cfg.jump, &[Btn::A]),
            start: parse_list(&cfg.start, &[Btn::Start]),
            quit: parse_list(&cfg.quit, &[Btn::Select]),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad
    dpad_left: bool,
    dpad_right: bool,

    // Stick
    stick_x: f32,

    // Direction as last reported to the course
    left_reported: bool,
    right_reported: bool,

    action_map: ActionMap,

    /// Transitions produced by the most recent update(), in order.
    pub transitions: Vec<KeyTransition>,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
        let mut pad = GamepadState::detached(cfg);

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                pad.connected = g.gamepads().next().is_some();
                pad.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {}", e),
        }

        pad
    }

    /// A tracker with no backend attached.
    fn detached(cfg: &GamepadConfig) -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            left_reported: false,
            right_reported: false,
            action_map: ActionMap::from_config(cfg),
            transitions: Vec::with_capacity(4),
            connected: false,
        }
    }

    pub fn update(&mut self) {
        self.clear_edges();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        self.derive_transitions();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value;
                }
                EventType::Connected => {
                    self.connected = true;
                    log::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    log::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadLeft  => { self.dpad_left = held; return; }
            Button::DPadRight => { self.dpad_right = held; return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.press(btn, held);
        }
    }

    fn press(&mut self, btn: Btn, held: bool) {
        let state = &mut self.buttons[btn_index(btn)];
        if held && !state.held { state.just_pressed = true; }
        if !held && state.held { state.just_released = true; }
        state.held = held;
    }

    /// Turn this frame's device state into key transitions.
    fn derive_transitions(&mut self) {
        self.transitions.clear();

        let left = self.dpad_left || self.stick_x < -STICK_DEADZONE;
        let right = self.dpad_right || self.stick_x > STICK_DEADZONE;

        if left != self.left_reported {
            self.left_reported = left;
            self.transitions.push(KeyTransition { key: "ArrowLeft".into(), pressed: left });
        }
        if right != self.right_reported {
            self.right_reported = right;
            self.transitions.push(KeyTransition { key: "ArrowRight".into(), pressed: right });
        }

        let jump = &self.action_map.jump;
        if jump.iter().any(|&b| self.buttons[btn_index(b)].just_pressed) {
            self.transitions.push(KeyTransition::down("ArrowUp"));
        }
        if jump.iter().any(|&b| self.buttons[btn_index(b)].just_released) {
            self.transitions.push(KeyTransition::up("ArrowUp"));
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn start_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.start)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    // ── Internal ──

    fn clear_edges(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_left = false;
        self.dpad_right = false;
        self.stick_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GamepadConfig {
        GamepadConfig {
            jump: vec!["A".into(), "R1".into()],
            start: vec!["Start".into()],
            quit: vec!["nonsense".into()],
        }
    }

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn unparseable_list_keeps_default() {
        let map = ActionMap::from_config(&cfg());
        assert_eq!(map.jump, vec![Btn::A, Btn::R1]);
        assert_eq!(map.quit, vec![Btn::Select]);
    }

    #[test]
    fn dpad_reports_edges_only() {
        let mut pad = GamepadState::detached(&cfg());
        pad.dpad_right = true;
        pad.derive_transitions();
        assert_eq!(pad.transitions, vec![KeyTransition::down("ArrowRight")]);

        pad.derive_transitions();
        assert!(pad.transitions.is_empty());

        pad.dpad_right = false;
        pad.derive_transitions();
        assert_eq!(pad.transitions, vec![KeyTransition::up("ArrowRight")]);
    }

    #[test]
    fn stick_respects_deadzone() {
        let mut pad = GamepadState::detached(&cfg());
        pad.stick_x = -0.1;
        pad.derive_transitions();
        assert!(pad.transitions.is_empty());

        pad.stick_x = -0.8;
        pad.derive_transitions();
        assert_eq!(pad.transitions, vec![KeyTransition::down("ArrowLeft")]);
    }

    #[test]
    fn jump_button_press_and_release() {
        let mut pad = GamepadState::detached(&cfg());
        pad.press(Btn::R1, true);
        pad.derive_transitions();
        assert_eq!(pad.transitions, vec![KeyTransition::down("ArrowUp")]);

        pad.clear_edges();
        pad.press(Btn::R1, false);
        pad.derive_transitions();
        assert_eq!(pad.transitions, vec![KeyTransition::up("ArrowUp")]);
    }

    #[test]
    fn start_and_quit_are_edge_triggered() {
        let mut pad = GamepadState::detached(&cfg());
        pad.press(Btn::Start, true);
        assert!(pad.start_pressed());
        assert!(!pad.quit_pressed());
        pad.clear_edges();
        assert!(!pad.start_pressed());

        pad.press(Btn::Select, true);
        assert!(pad.quit_pressed());
    }
}
