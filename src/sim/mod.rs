//! Simulation layer: level data, world state, and the fixed-order tick
//! pipeline that advances it. Everything here is deterministic given
//! the input stream and the clock values handed in.

pub mod event;
pub mod level;
pub mod step;
pub mod world;

// ── playfield geometry ──
//
// The playfield is a fixed 20 x 15 grid of 40 px tiles. All entity
// rects live in this 800 x 600 pixel space regardless of how the
// renderer maps it onto terminal cells.

pub const TILE: f32 = 40.0;
pub const SCREEN_W: f32 = 800.0;
pub const SCREEN_H: f32 = 600.0;
pub const GRID_W: usize = 20;
pub const GRID_H: usize = 15;

// ── movement and physics ──

/// Gravity per tick inside the post-jump float window.
pub const GRAVITY_FLOAT: f32 = 0.5;
/// Gravity per tick once the float window has lapsed.
pub const GRAVITY_REST: f32 = 1.0;
/// How long softened gravity lasts after a jump, in ms.
pub const FLOAT_WINDOW_MS: u64 = 500;
/// A second jump must come this soon after the first, in ms.
pub const DOUBLE_JUMP_WINDOW_MS: u64 = 500;

/// Horizontal enemy displacement per tick.
pub const ENEMY_SPEED: f32 = 1.0;
/// Enemy body edge length, three quarters of a tile.
pub const ENEMY_SIZE: f32 = 30.0;

/// Reaching this y or below it is fatal (two tiles above the floor).
pub const FALL_DEATH_Y: f32 = 520.0;

// ── phase timing ──

/// Length of the death animation before the lost screen.
pub const DEATH_MS: u64 = 2000;
/// Length of the door walk-through before the won screen.
pub const CLEAR_MS: u64 = 2000;
