/// WorldState: the complete snapshot of a running game.
///
/// One flat entity list holds the static level furniture (platforms,
/// vines, coins, lives, nothing else); the player and the enemies live
/// beside it. Everything per-level is rebuilt wholesale by
/// `level::enter_level`; lives, mute and the parsed level list survive
/// across loads.
///
/// Timers never tick on their own: every timed behavior (jump windows,
/// the death and clear fades, the level countdown) is re-derived each
/// frame from a stored start timestamp and the `now_ms` handed in.

use crate::domain::entity::{Enemy, Entity, Player};
use crate::domain::geom::Rect;
use crate::sim::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    ModeSelect,
    Settings,
    About,
    LevelSelect,
    Playing,
    Transition,
    Won,
    Dying,
    Lost,
}

pub struct WorldState {
    // ── Level content ──
    pub entities: Vec<Entity>,
    pub enemies: Vec<Enemy>,
    pub player: Player,
    pub spawn: Rect,
    pub door: Option<Rect>,
    pub door_open: bool,

    // ── Counters ──
    pub coins_total: usize,
    pub coins_collected: usize,
    pub lives: u32,
    /// What `lives` refills to when a fresh run starts.
    pub starting_lives: u32,
    /// Set when the life lost in DYING was the last one; the retry
    /// path then restarts from the first level with fresh lives.
    pub out_of_lives: bool,

    // ── Meta ──
    pub phase: Phase,
    pub levels: Vec<LevelDef>,
    pub current_level: usize,
    pub level_name: String,
    pub tick: u64,

    // ── Timers (all wall-clock ms) ──
    pub phase_started_ms: u64,
    pub level_started_ms: u64,
    /// 0 disables the countdown.
    pub time_limit_ms: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub menu_cursor: usize,
    pub select_cursor: usize,
    pub select_scroll: usize,
    pub mute: bool,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            entities: vec![],
            enemies: vec![],
            player: Player::new(Rect::new(0.0, 0.0, 0.0, 0.0)),
            spawn: Rect::new(0.0, 0.0, 0.0, 0.0),
            door: None,
            door_open: false,
            coins_total: 0,
            coins_collected: 0,
            lives: 3,
            starting_lives: 3,
            out_of_lives: false,
            phase: Phase::Title,
            levels: vec![],
            current_level: 0,
            level_name: String::new(),
            tick: 0,
            phase_started_ms: 0,
            level_started_ms: 0,
            time_limit_ms: 0,
            message: String::new(),
            message_timer: 0,
            menu_cursor: 0,
            select_cursor: 0,
            select_scroll: 0,
            mute: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// The door-open / straight-win condition.
    #[inline]
    pub fn coins_complete(&self) -> bool {
        self.coins_collected == self.coins_total
    }

    /// Normalized [0, 1+] fraction of a timed phase. Completion is
    /// `progress >= 1.0`.
    #[inline]
    pub fn phase_progress(&self, now_ms: u64, duration_ms: u64) -> f32 {
        if duration_ms == 0 {
            return 1.0;
        }
        now_ms.saturating_sub(self.phase_started_ms) as f32 / duration_ms as f32
    }

    /// Remaining level time, None when the countdown is disabled.
    pub fn time_left_ms(&self, now_ms: u64) -> Option<u64> {
        if self.time_limit_ms == 0 {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.level_started_ms);
        Some(self.time_limit_ms.saturating_sub(elapsed))
    }

    pub fn enter_phase(&mut self, phase: Phase, now_ms: u64) {
        self.phase = phase;
        self.phase_started_ms = now_ms;
    }
}
