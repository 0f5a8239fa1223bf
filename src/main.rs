/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use domain::geom;
use sim::event::GameEvent;
use sim::level::{enter_level, load_levels};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{self, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    // A malformed level file is fatal before the terminal is touched.
    let levels = match load_levels(&config) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Level load failed: {e}");
            std::process::exit(1);
        }
    };

    let mut world = WorldState::new();
    world.levels = levels;
    world.lives = config.lives;
    world.starting_lives = config.lives;
    world.time_limit_ms = config.time_limit_s * 1000;
    world.mute = config.start_muted;

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Block Hop!");
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let clock = Instant::now();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_ms.max(1));

    // Presses arrive between ticks; buffer them so a tap landing
    // mid-interval still reaches the next simulation step.
    let mut queued = FrameInput::idle(0);

    loop {
        kb.drain_events();
        gp.update();
        let now_ms = clock.elapsed().as_millis() as u64;

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp, now_ms) {
            break;
        }

        if world.phase == Phase::Playing {
            queued.left |= kb.any_pressed(KEYS_LEFT) || gp.left_pressed();
            queued.right |= kb.any_pressed(KEYS_RIGHT) || gp.right_pressed();
            queued.up |= kb.any_pressed(KEYS_UP) || gp.up_pressed();
            queued.down |= kb.any_pressed(KEYS_DOWN) || gp.down_pressed();
            queued.jump |= kb.any_pressed(KEYS_JUMP) || gp.jump_pressed();
        } else {
            queued = FrameInput::idle(0);
        }

        if last_tick.elapsed() >= tick_rate {
            match world.phase {
                Phase::Playing => {
                    queued.now_ms = now_ms;
                    let events = step::step(world, queued);
                    process_sound_events(world, sound, &events);
                    queued = FrameInput::idle(0);
                }
                Phase::Dying => step::update_dying(world, now_ms),
                Phase::Transition => step::update_transition(world, now_ms),
                _ => {
                    // Menus tick the message timer themselves; during
                    // play the simulation step owns it.
                    if world.message_timer > 0 {
                        world.message_timer -= 1;
                        if world.message_timer == 0 {
                            world.message.clear();
                        }
                    }
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(world, now_ms)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(world: &WorldState, sound: Option<&SoundEngine>, events: &[GameEvent]) {
    if world.mute {
        return;
    }
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CoinPicked { .. } => sfx.play_coin(),
            GameEvent::LifePicked { .. } => sfx.play_life(),
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::DoubleJumped => sfx.play_double_jump(),
            GameEvent::EnemyStomped { .. } => sfx.play_stomp(),
            GameEvent::PlayerDied => sfx.play_die(),
            GameEvent::DoorOpened => sfx.play_door(),
            GameEvent::DoorEntered => sfx.play_clear(),
            GameEvent::LevelCleared => sfx.play_clear(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Char('J')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_MUTE: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];
// Space belongs to Jump, so menu confirmation is Enter only.
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];

/// Reset to the title screen, preserving lives config, mute and the
/// level list.
fn return_to_title(world: &mut WorldState) {
    world.phase = Phase::Title;
    world.menu_cursor = 0;
    world.message.clear();
    world.message_timer = 0;
}

/// Begin a fresh run at the given level: full lives, counters cleared.
fn start_run(world: &mut WorldState, level: usize, now_ms: u64) {
    world.lives = world.starting_lives;
    world.out_of_lives = false;
    world.select_cursor = level.min(world.levels.len().saturating_sub(1));
    enter_level(world, world.select_cursor, now_ms);
}

/// Keep the level-select cursor inside the visible window.
/// Must agree with the renderer's list height.
const SELECT_VISIBLE: usize = 12;

fn scroll_to_cursor(world: &mut WorldState) {
    if world.select_cursor < world.select_scroll {
        world.select_scroll = world.select_cursor;
    }
    if world.select_cursor >= world.select_scroll + SELECT_VISIBLE {
        world.select_scroll = world.select_cursor - SELECT_VISIBLE + 1;
    }
}

/// Which button of the current menu screen was clicked, if any.
fn clicked_button(kb: &InputState, buttons: &[(geom::Rect, &str)]) -> Option<usize> {
    for &(col, row) in &kb.clicks {
        let (mx, my) = match renderer::click_to_game(col, row) {
            Some(p) => p,
            None => continue,
        };
        for (i, (rect, _)) in buttons.iter().enumerate() {
            if geom::point_in_rect(mx, my, rect) {
                return Some(i);
            }
        }
    }
    None
}

fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState, now_ms: u64) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.was_pressed(KeyCode::Esc) || gp.cancel_pressed();
    let up = kb.any_pressed(&[KeyCode::Up]) || gp.up_pressed();
    let down = kb.any_pressed(&[KeyCode::Down]) || gp.down_pressed();

    // Mute toggles everywhere.
    if kb.any_pressed(KEYS_MUTE) || gp.mute_pressed() {
        world.mute = !world.mute;
        let label = if world.mute { "Sound off" } else { "Sound on" };
        world.set_message(label, 40);
    }

    match world.phase {
        // ── Title ──
        Phase::Title => {
            let buttons = renderer::title_buttons();
            if let Some(i) = clicked_button(kb, &buttons) {
                world.menu_cursor = i;
                return title_activate(world);
            }
            if up {
                world.menu_cursor = (world.menu_cursor + buttons.len() - 1) % buttons.len();
            } else if down {
                world.menu_cursor = (world.menu_cursor + 1) % buttons.len();
            } else if confirm {
                return title_activate(world);
            } else if esc || kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
                return true;
            }
        }

        // ── Mode Select ──
        Phase::ModeSelect => {
            let buttons = renderer::mode_buttons();
            let activate = if let Some(i) = clicked_button(kb, &buttons) {
                world.menu_cursor = i;
                true
            } else {
                confirm
            };
            if activate {
                match world.menu_cursor {
                    0 => start_run(world, 0, now_ms),
                    _ => {
                        world.phase = Phase::LevelSelect;
                        scroll_to_cursor(world);
                    }
                }
            } else if up || down {
                world.menu_cursor = (world.menu_cursor + 1) % buttons.len();
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Settings ──
        Phase::Settings => {
            let buttons = renderer::settings_buttons();
            let activate = if let Some(i) = clicked_button(kb, &buttons) {
                world.menu_cursor = i;
                true
            } else {
                confirm
            };
            if activate {
                match world.menu_cursor {
                    0 => world.mute = !world.mute,
                    _ => {
                        return_to_title(world);
                        world.menu_cursor = 1;
                    }
                }
            } else if up || down {
                world.menu_cursor = (world.menu_cursor + 1) % buttons.len();
            } else if esc {
                return_to_title(world);
                world.menu_cursor = 1;
            }
        }

        // ── About ──
        Phase::About => {
            let clicked = clicked_button(kb, &renderer::about_buttons()).is_some();
            if clicked || confirm || esc {
                return_to_title(world);
                world.menu_cursor = 2;
            }
        }

        // ── Level Select ──
        Phase::LevelSelect => {
            let total = world.levels.len();
            if total == 0 {
                return_to_title(world);
                return false;
            }

            // A click on a list row selects and starts that level.
            let list_top = 5_u16;
            for &(_, row) in &kb.clicks {
                if row < list_top {
                    continue;
                }
                let offset = (row - list_top) as usize;
                let idx = world.select_scroll + offset;
                if offset < SELECT_VISIBLE && idx < total {
                    start_run(world, idx, now_ms);
                    return false;
                }
            }

            if up {
                if world.select_cursor > 0 {
                    world.select_cursor -= 1;
                    scroll_to_cursor(world);
                }
            } else if down {
                if world.select_cursor + 1 < total {
                    world.select_cursor += 1;
                    scroll_to_cursor(world);
                }
            } else if kb.any_pressed(&[KeyCode::PageUp]) {
                world.select_cursor = world.select_cursor.saturating_sub(SELECT_VISIBLE);
                scroll_to_cursor(world);
            } else if kb.any_pressed(&[KeyCode::PageDown]) {
                world.select_cursor =
                    (world.select_cursor + SELECT_VISIBLE).min(total.saturating_sub(1));
                scroll_to_cursor(world);
            } else if confirm {
                start_run(world, world.select_cursor, now_ms);
            } else if esc {
                world.phase = Phase::ModeSelect;
                world.menu_cursor = 1;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                return_to_title(world);
            } else if kb.any_pressed(KEYS_RESTART) {
                enter_level(world, world.current_level, now_ms);
                world.set_message("Level restarted", 30);
            } else if kb.any_pressed(&[KeyCode::F(6)]) {
                step::force_collect_all(world);
                world.set_message("All coins granted", 30);
            } else if kb.any_pressed(&[KeyCode::F(7)]) {
                step::force_win(world, now_ms);
            }
        }

        // ── Transition (door walk) ──
        Phase::Transition => {
            if esc {
                return_to_title(world);
            }
        }

        // ── Won ──
        Phase::Won => {
            if confirm || gp.jump_pressed() {
                step::advance_level(world, now_ms);
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Dying ──
        Phase::Dying => {
            // Can't skip
        }

        // ── Lost ──
        Phase::Lost => {
            if confirm || gp.jump_pressed() {
                step::retry_level(world, now_ms);
            } else if esc {
                return_to_title(world);
            }
        }
    }

    false
}

/// Activate the highlighted title button. Returns true to quit.
fn title_activate(world: &mut WorldState) -> bool {
    match world.menu_cursor {
        0 => {
            world.phase = Phase::ModeSelect;
            world.menu_cursor = 0;
        }
        1 => {
            world.phase = Phase::Settings;
            world.menu_cursor = 0;
        }
        2 => {
            world.phase = Phase::About;
            world.menu_cursor = 0;
        }
        _ => return true,
    }
    false
}
