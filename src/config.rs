/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub display: DisplayConfig,
    pub keys: KeysConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    /// Where the config was read from; `None` when running on defaults.
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_impulse: f32,   // subtracted from vy per jump event
    pub key_impulse: f32,    // magnitude carried by a direction key-down
    pub walk_speed: f32,     // player vx while inside the dead-zone band
    pub scroll_speed: f32,   // world shift per tick while a direction is held
    pub advance_limit: f32,  // nominal, scaled at use
    pub retreat_limit: f32,  // nominal, scaled at use
    pub reach_band: f32,     // px past a checkpoint that still shows the message
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            jump_impulse: default_jump_impulse(),
            key_impulse: default_key_impulse(),
            walk_speed: default_walk_speed(),
            scroll_speed: default_scroll_speed(),
            advance_limit: default_advance_limit(),
            retreat_limit: default_retreat_limit(),
            reach_band: default_reach_band(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub tick_rate_ms: u64,
    pub px_per_col: f32,
    pub px_per_row: f32,
    /// 0 = derive from terminal size at startup.
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub message_ms: u64,
}

#[derive(Clone, Debug)]
pub struct KeysConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub start: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Empty = logging disabled.
    pub file: String,
    pub level: String,
}

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
    #[serde(default = "default_key_impulse")]
    key_impulse: f32,
    #[serde(default = "default_walk_speed")]
    walk_speed: f32,
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
    #[serde(default = "default_advance_limit")]
    advance_limit: f32,
    #[serde(default = "default_retreat_limit")]
    retreat_limit: f32,
    #[serde(default = "default_reach_band")]
    reach_band: f32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_px_per_col")]
    px_per_col: f32,
    #[serde(default = "default_px_per_row")]
    px_per_row: f32,
    #[serde(default)]
    canvas_width: f32,
    #[serde(default)]
    canvas_height: f32,
    #[serde(default = "default_message_ms")]
    message_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlKeys {
    #[serde(default)]
    left: Vec<String>,
    #[serde(default)]
    right: Vec<String>,
    #[serde(default)]
    jump: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_start")]
    start: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.5 }
fn default_jump_impulse() -> f32 { 8.0 }
fn default_key_impulse() -> f32 { 8.0 }
fn default_walk_speed() -> f32 { 5.0 }
fn default_scroll_speed() -> f32 { 5.0 }
fn default_advance_limit() -> f32 { 400.0 }
fn default_retreat_limit() -> f32 { 100.0 }
fn default_reach_band() -> f32 { 40.0 }

fn default_tick_rate() -> u64 { 16 }     // ~60 fps, one tick per frame
fn default_px_per_col() -> f32 { 10.0 }
fn default_px_per_row() -> f32 { 20.0 }  // terminal cells are ~2:1
fn default_message_ms() -> u64 { 2000 }

fn default_pad_jump() -> Vec<String> { vec!["A".into()] }
fn default_pad_start() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_file() -> String { "checkpoint-runner.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_impulse: default_jump_impulse(),
            key_impulse: default_key_impulse(),
            walk_speed: default_walk_speed(),
            scroll_speed: default_scroll_speed(),
            advance_limit: default_advance_limit(),
            retreat_limit: default_retreat_limit(),
            reach_band: default_reach_band(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            tick_rate_ms: default_tick_rate(),
            px_per_col: default_px_per_col(),
            px_per_row: default_px_per_row(),
            canvas_width: 0.0,
            canvas_height: 0.0,
            message_ms: default_message_ms(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            start: default_pad_start(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/checkpoint-runner.
    /// Missing file or missing keys gracefully fall back to defaults.
    ///
    /// Logging is not up yet when this runs, so problems are returned as
    /// warnings for the caller to log once the logger exists.
    pub fn load() -> (Self, Vec<ConfigError>) {
        let mut warnings = vec![];
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match read_config(&path) {
                Ok(cfg) => return (cfg, warnings),
                Err(e @ ConfigError::Parse { .. }) => {
                    // A broken file is authoritative: don't keep searching.
                    warnings.push(e);
                    return (GameConfig::default(), warnings);
                }
                Err(e) => warnings.push(e),
            }
        }
        (GameConfig::default(), warnings)
    }

    /// Parse config text directly.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg))
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                jump_impulse: t.physics.jump_impulse,
                key_impulse: t.physics.key_impulse,
                walk_speed: t.physics.walk_speed,
                scroll_speed: t.physics.scroll_speed,
                advance_limit: t.physics.advance_limit,
                retreat_limit: t.physics.retreat_limit,
                reach_band: t.physics.reach_band,
            },
            display: DisplayConfig {
                tick_rate_ms: t.display.tick_rate_ms.max(1),
                px_per_col: positive_or(t.display.px_per_col, default_px_per_col()),
                px_per_row: positive_or(t.display.px_per_row, default_px_per_row()),
                canvas_width: t.display.canvas_width.max(0.0),
                canvas_height: t.display.canvas_height.max(0.0),
                message_ms: t.display.message_ms,
            },
            keys: KeysConfig {
                left: t.keys.left,
                right: t.keys.right,
                jump: t.keys.jump,
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                start: t.gamepad.start,
                quit: t.gamepad.quit,
            },
            log: LogConfig {
                file: t.log.file,
                level: t.log.level,
            },
            source: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

/// Pixel ratios must be usable as divisors.
fn positive_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/checkpoint-runner)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/checkpoint-runner");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn read_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = GameConfig::parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.source = Some(path.to_path_buf());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("").expect("empty config parses");
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.physics.gravity, 0.5);
        assert_eq!(cfg.display.message_ms, 2000);
        assert_eq!(cfg.display.canvas_height, 0.0);
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string()]);
        assert_eq!(cfg.log.file, "checkpoint-runner.log");
        assert!(cfg.keys.left.is_empty());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::parse(
            "[physics]\ngravity = 0.75\n[keys]\nleft = [\"a\"]\n",
        ).expect("valid config");
        assert_eq!(cfg.physics.gravity, 0.75);
        assert_eq!(cfg.physics.walk_speed, 5.0);
        assert_eq!(cfg.keys.left, vec!["a".to_string()]);
        assert_eq!(cfg.display.tick_rate_ms, 16);
    }

    #[test]
    fn bad_pixel_ratios_fall_back() {
        let cfg = GameConfig::parse(
            "[display]\npx_per_col = 0.0\npx_per_row = -3.0\ntick_rate_ms = 0\n",
        ).expect("valid config");
        assert_eq!(cfg.display.px_per_col, 10.0);
        assert_eq!(cfg.display.px_per_row, 20.0);
        assert_eq!(cfg.display.tick_rate_ms, 1);
    }

    #[test]
    fn type_error_is_reported() {
        assert!(GameConfig::parse("[physics]\ngravity = \"heavy\"\n").is_err());
    }

    #[test]
    fn config_error_messages_name_the_file() {
        let err = read_config(Path::new("/nonexistent/checkpoint-runner/config.toml"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
