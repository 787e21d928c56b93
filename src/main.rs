/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{info, warn};

use config::{GameConfig, LogConfig};
use sim::control;
use sim::event::GameEvent;
use sim::level::{builtin, load_level, LevelDef};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::banner::Banner;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KeyTransition};
use ui::renderer::{canvas_for, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, warnings) = GameConfig::load();
    init_logging(&config.log);

    info!("checkpoint-runner {} starting", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => info!("config loaded from {}", path.display()),
        None => info!("no config.toml found, using defaults"),
    }
    for w in &warnings {
        warn!("{}", w);
    }

    let mut renderer = Renderer::new(&config.display);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let canvas = canvas_for(renderer.field_size(), &config.display);
    info!("canvas {}x{}px", canvas.width, canvas.height);

    let mut world = WorldState::new(canvas, config.physics.clone());
    let course = builtin();
    load_level(&mut world, &course);

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &course, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {}", e);
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Checkpoint Runner!");
    println!("Checkpoints reached: {}/{}", world.claimed_count(), world.checkpoints.len());
}

/// Route `log` output to a file. The terminal is in raw mode and owned by
/// the renderer, so nothing may be written to stderr while playing.
fn init_logging(cfg: &LogConfig) {
    if cfg.file.is_empty() {
        return;
    }
    let file = match OpenOptions::new().create(true).append(true).open(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Log file {} unavailable: {e}", cfg.file);
            return;
        }
    };
    let env = env_logger::Env::default().default_filter_or(cfg.level.as_str());
    let result = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    if let Err(e) = result {
        eprintln!("Logger init failed: {e}");
    }
}

fn game_loop(
    world: &mut WorldState,
    course: &LevelDef,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new(&config.keys);
    kb.honor_release = renderer.reports_releases();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut banner = Banner::new(Duration::from_millis(config.display.message_ms));
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.display.tick_rate_ms);
    let key_impulse = config.physics.key_impulse;

    info!(
        "input: key releases {}, gamepad {}",
        if kb.honor_release { "reported" } else { "timed out" },
        if gp.connected { "connected" } else { "not connected" },
    );

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            info!("quit requested");
            break;
        }

        match world.phase {
            Phase::Title => {
                if kb.any_pressed(KEYS_START) || gp.start_pressed() {
                    start_course(world, course, &mut banner);
                    // The start key must not reach the course as a key-up.
                    kb.forget_held();
                    last_tick = Instant::now();
                }
            }
            Phase::Playing => {
                for t in kb.transitions.iter().chain(gp.transitions.iter()) {
                    dispatch_key(world, sound, t, key_impulse);
                }

                if last_tick.elapsed() >= tick_rate {
                    let events = step::step(world);
                    let now = Instant::now();
                    for event in &events {
                        banner.show(event, now);
                    }
                    process_sound_events(sound, &events);
                    last_tick = now;
                }
            }
        }

        banner.expire(Instant::now());
        renderer.render(world, banner.text())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_START: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

/// Reset the course and begin play.
fn start_course(world: &mut WorldState, course: &LevelDef, banner: &mut Banner) {
    load_level(world, course);
    banner.clear();
    world.phase = Phase::Playing;
}

/// Feed one key transition to the course. Key-downs carry the key impulse,
/// key-ups a zero magnitude.
fn dispatch_key(world: &mut WorldState, sound: Option<&SoundEngine>, t: &KeyTransition, key_impulse: f32) {
    let magnitude = if t.pressed { key_impulse } else { 0.0 };
    let accepted = control::handle_key(world, &t.key, magnitude, t.pressed);

    if accepted && t.pressed && is_jump(&t.key) {
        if let Some(sfx) = sound {
            sfx.play_jump();
        }
    }
}

fn is_jump(key: &str) -> bool {
    matches!(
        domain::entity::Command::from_key(key),
        Some(domain::entity::Command::Jump)
    )
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CheckpointReached { .. } => sfx.play_checkpoint(),
            GameEvent::CourseComplete { .. } => sfx.play_complete(),
        }
    }
}
