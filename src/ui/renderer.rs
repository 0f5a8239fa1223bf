/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Geometry: the playfield is a fixed 800x600 pixel space, 20x15 tiles
/// of 40px. One tile renders as 2 terminal columns by 1 row, so the
/// map needs 40x15 cells plus the HUD rows above and the message and
/// help rows below. Menu buttons are laid out in the same pixel space
/// so that mouse clicks can be tested against plain rectangles.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{EntityKind, Facing};
use crate::domain::geom::Rect;
use crate::sim::step::death_offset;
use crate::sim::world::{Phase, WorldState};
use crate::sim::{DEATH_MS, GRID_H, GRID_W, TILE};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals (GNOME Terminal, etc.), the inter-row gap
    /// pixels use the background color from the last Clear or the terminal's
    /// configured default.  By using the SAME explicit RGB for both
    /// `Clear(ClearType::All)` and every cell's background, the gap color
    /// matches the cell color exactly, eliminating visible horizontal lines.
    ///
    /// If your terminal's own background differs from this value, set it to
    /// RGB(22,22,35) in your terminal preferences for a seamless look.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color, _bold: bool) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color, _bold: bool) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 { return ""; }
        unsafe { std::str::from_utf8_unchecked(&self.ch[..self.ch_len as usize]) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color, _bold: bool) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg, false));
            cx += 1;
        }
    }
}

// ── Layout ──

/// Each game tile = 2 terminal columns.
const CELL_W: usize = 2;
/// Horizontal pixels per terminal column.
const PX_PER_COL: f32 = TILE / CELL_W as f32;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Map a game-space x to a terminal column (sub-tile accuracy).
fn px_col(x: f32) -> i32 {
    (x / PX_PER_COL).round() as i32
}

/// Map a game-space y to a terminal row offset within the map.
fn px_row(y: f32) -> i32 {
    (y / TILE).round() as i32
}

/// Translate a terminal click into game-space pixel coordinates,
/// using the center of the clicked cell. None above the map area.
pub fn click_to_game(col: u16, row: u16) -> Option<(f32, f32)> {
    if (row as usize) < MAP_ROW {
        return None;
    }
    let x = col as f32 * PX_PER_COL + PX_PER_COL / 2.0;
    let y = (row as usize - MAP_ROW) as f32 * TILE + TILE / 2.0;
    Some((x, y))
}

// ── Menu button layout (game-space rects, for mouse hit tests) ──

const BTN_W: f32 = 220.0;
const BTN_H: f32 = 40.0;
const BTN_X: f32 = 290.0;

pub fn title_buttons() -> [(Rect, &'static str); 4] {
    [
        (Rect::new(BTN_X, 240.0, BTN_W, BTN_H), "Start"),
        (Rect::new(BTN_X, 320.0, BTN_W, BTN_H), "Settings"),
        (Rect::new(BTN_X, 400.0, BTN_W, BTN_H), "About"),
        (Rect::new(BTN_X, 480.0, BTN_W, BTN_H), "Quit"),
    ]
}

pub fn mode_buttons() -> [(Rect, &'static str); 2] {
    [
        (Rect::new(BTN_X, 280.0, BTN_W, BTN_H), "Adventure"),
        (Rect::new(BTN_X, 360.0, BTN_W, BTN_H), "Level Select"),
    ]
}

pub fn settings_buttons() -> [(Rect, &'static str); 2] {
    [
        (Rect::new(BTN_X, 280.0, BTN_W, BTN_H), "Sound"),
        (Rect::new(BTN_X, 360.0, BTN_W, BTN_H), "Back"),
    ]
}

pub fn about_buttons() -> [(Rect, &'static str); 1] {
    [(Rect::new(BTN_X, 480.0, BTN_W, BTN_H), "Back")]
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Frame counter for menu blink effects; the sim tick freezes
    /// outside PLAYING, so the renderer keeps its own.
    frame: u32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState, now_ms: u64) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        // Build front buffer
        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::ModeSelect => self.compose_mode_select(world),
            Phase::Settings => self.compose_settings(world),
            Phase::About => self.compose_about(world),
            Phase::LevelSelect => self.compose_level_select(world),
            Phase::Playing => self.compose_game(world, now_ms, 0.0, true),
            Phase::Dying => {
                let progress = world.phase_progress(now_ms, DEATH_MS);
                self.compose_game(world, now_ms, death_offset(progress), true);
            }
            Phase::Transition => {
                self.compose_game(world, now_ms, 0.0, false);
                self.compose_transition(world);
            }
            Phase::Won => {
                self.compose_game(world, now_ms, 0.0, true);
                self.compose_won(world);
            }
            Phase::Lost => {
                self.compose_game(world, now_ms, 0.0, false);
                self.compose_lost(world);
            }
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    // Wide char printed: cursor advanced 2 columns
                    last_x = x + 1;
                    x += 2; // skip the continuation cell
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Game view ──

    fn compose_game(&mut self, w: &WorldState, now_ms: u64, player_dy: f32, player_visible: bool) {
        let buf_w = self.front.width;

        // ── HUD row ──
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, hud_bg, false));
        }
        let timer = match w.time_left_ms(now_ms) {
            Some(ms) => format!("  ⏱ {:>3}", ms / 1000),
            None => String::new(),
        };
        let muted = if w.mute { "  ♪off" } else { "" };
        let hud = format!(
            " {}  ◈ {}/{}  ♥×{}{}{} ",
            w.level_name, w.coins_collected, w.coins_total, w.lives, timer, muted,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg, false);

        // ── Playfield ──
        for e in &w.entities {
            let col = (e.rect.x / TILE) as usize * CELL_W;
            let row = MAP_ROW + (e.rect.y / TILE) as usize;
            if row >= self.front.height || col + 1 >= buf_w {
                continue;
            }
            match e.kind {
                EntityKind::Platform => {
                    let fg = Color::Rgb { r: 90, g: 200, b: 90 };
                    let bg = Color::Rgb { r: 40, g: 90, b: 40 };
                    self.front.set(col, row, Cell::from_char('▓', fg, bg, false));
                    self.front.set(col + 1, row, Cell::from_char('▓', fg, bg, false));
                }
                EntityKind::Vine => {
                    let fg = Color::Rgb { r: 80, g: 220, b: 120 };
                    self.front.set(col, row, Cell::from_char('┋', fg, Color::Reset, false));
                    self.front.set(col + 1, row, Cell::from_char('┋', fg, Color::Reset, false));
                }
                EntityKind::Coin => {
                    self.front.set(col, row, Cell::from_char_wide('🟡', Color::Reset, Color::Reset, false));
                    self.front.set(col + 1, row, Cell::WIDE_CONT);
                }
                EntityKind::Life => {
                    let fg = Color::Rgb { r: 255, g: 80, b: 120 };
                    self.front.set(col, row, Cell::from_char('♥', fg, Color::Reset, false));
                    self.front.set(col + 1, row, Cell::from_char(' ', fg, Color::Reset, false));
                }
                EntityKind::Door => {}
            }
        }

        // ── Door (two tiles tall; lights up when open) ──
        if let Some(door) = w.door {
            let col = (door.x / TILE) as usize * CELL_W;
            let top = MAP_ROW + (door.y / TILE) as usize;
            let (fg, bg) = if w.door_open {
                (Color::Rgb { r: 255, g: 230, b: 120 }, Color::Rgb { r: 120, g: 90, b: 20 })
            } else {
                (Color::Rgb { r: 140, g: 90, b: 50 }, Color::Rgb { r: 60, g: 35, b: 15 })
            };
            for (i, (c0, c1)) in [('▛', '▜'), ('▙', '▟')].iter().enumerate() {
                let row = top + i;
                if row < self.front.height && col + 1 < buf_w {
                    self.front.set(col, row, Cell::from_char(*c0, fg, bg, false));
                    self.front.set(col + 1, row, Cell::from_char(*c1, fg, bg, false));
                }
            }
        }

        // ── Enemies ──
        for e in &w.enemies {
            let col = px_col(e.rect.x);
            let row = MAP_ROW as i32 + px_row(e.rect.y);
            if row < MAP_ROW as i32 || row as usize >= self.front.height {
                continue;
            }
            if col < 0 || (col as usize) + 1 >= buf_w {
                continue;
            }
            let ch = match e.facing {
                Facing::Left => '👾',
                Facing::Right => '👾',
            };
            self.front.set(col as usize, row as usize, Cell::from_char_wide(ch, Color::Reset, Color::Reset, false));
            self.front.set(col as usize + 1, row as usize, Cell::WIDE_CONT);
        }

        // ── Player ──
        if player_visible {
            let blink_out = w.phase == Phase::Dying && (self.frame / 3) % 2 == 1;
            if !blink_out {
                let col = px_col(w.player.rect.x);
                let row = MAP_ROW as i32 + px_row(w.player.rect.y + player_dy);
                if row >= MAP_ROW as i32
                    && (row as usize) < MAP_ROW + GRID_H
                    && col >= 0
                    && (col as usize) + 1 < buf_w
                {
                    let ch = match w.player.facing {
                        Facing::Left => '🐰',
                        Facing::Right => '🐰',
                    };
                    self.front.set(col as usize, row as usize, Cell::from_char_wide(ch, Color::Reset, Color::Reset, false));
                    self.front.set(col as usize + 1, row as usize, Cell::WIDE_CONT);
                }
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + GRID_H + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::from_char(' ', Color::Black, Color::Rgb{r:200,g:180,b:50}, false));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, Color::Rgb{r:200,g:180,b:50}, false);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + GRID_H + 2;
        if help_row < self.front.height {
            let help = " ←→↑↓/WASD: Move  Space: Jump  M: Mute  ESC: Title";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset, false);
        }
    }

    // ── Overlays on the game view ──

    fn compose_transition(&mut self, w: &WorldState) {
        // Player blinks in the doorway while walking through.
        if let Some(door) = w.door {
            if (self.frame / 3) % 2 == 0 {
                let col = (door.x / TILE) as usize * CELL_W;
                let row = MAP_ROW + (door.y / TILE) as usize + 1;
                if row < self.front.height && col + 1 < self.front.width {
                    self.front.set(col, row, Cell::from_char_wide('🐰', Color::Reset, Color::Reset, false));
                    self.front.set(col + 1, row, Cell::WIDE_CONT);
                }
            }
        }

        let banner = " ◈ WELL DONE! ◈ ";
        let cx = (GRID_W * CELL_W).saturating_sub(banner.len()) / 2;
        let cy = MAP_ROW + GRID_H / 2;
        self.front.put_str(cx, cy, banner, Color::Black, Color::Rgb{r:200,g:180,b:50}, true);
    }

    fn compose_won(&mut self, w: &WorldState) {
        let cy = MAP_ROW + GRID_H / 2;
        let border = "╔══════════════════════════════╗";
        let middle = "║      ★ LEVEL CLEARED ★      ║";
        let prompt = "║  ENTER: Next    ESC: Title   ║";
        let bottom = "╚══════════════════════════════╝";
        let cx = (GRID_W * CELL_W).saturating_sub(border.chars().count()) / 2;
        let fg = Color::Rgb { r: 255, g: 220, b: 50 };
        let bg = Color::Rgb { r: 20, g: 60, b: 20 };
        self.front.put_str(cx, cy - 1, border, fg, bg, true);
        self.front.put_str(cx, cy, middle, fg, bg, true);
        self.front.put_str(cx, cy + 1, prompt, Color::Rgb{r:80,g:255,b:80}, bg, false);
        self.front.put_str(cx, cy + 2, bottom, fg, bg, true);

        let next = (w.current_level + 1) % w.levels.len().max(1);
        let coming = format!(" Next up: {} ", w.levels.get(next).map(|l| l.name.as_str()).unwrap_or("?"));
        let nx = (GRID_W * CELL_W).saturating_sub(coming.len()) / 2;
        self.front.put_str(nx, cy + 4, &coming, Color::DarkGrey, Color::Reset, false);
    }

    fn compose_lost(&mut self, w: &WorldState) {
        let cy = MAP_ROW + GRID_H / 2;
        let fg = Color::Rgb { r: 255, g: 60, b: 60 };
        let bg = Color::Rgb { r: 50, g: 15, b: 15 };
        let (middle, prompt) = if w.out_of_lives {
            ("║       ✕ GAME  OVER ✕        ║", "║  ENTER: New Run  ESC: Title  ║")
        } else {
            ("║         ✕ OUCH! ✕           ║", "║  ENTER: Retry    ESC: Title  ║")
        };
        let border = "╔══════════════════════════════╗";
        let bottom = "╚══════════════════════════════╝";
        let cx = (GRID_W * CELL_W).saturating_sub(border.chars().count()) / 2;
        self.front.put_str(cx, cy - 1, border, fg, bg, true);
        self.front.put_str(cx, cy, middle, fg, bg, true);
        self.front.put_str(cx, cy + 1, prompt, Color::White, bg, false);
        self.front.put_str(cx, cy + 2, bottom, fg, bg, true);

        let left = format!(" ♥×{} remaining ", w.lives);
        let lx = (GRID_W * CELL_W).saturating_sub(left.len()) / 2;
        self.front.put_str(lx, cy + 4, &left, Color::DarkGrey, Color::Reset, false);
    }

    // ── Menus ──

    /// Draw one clickable button at its game-space rect.
    fn draw_button(&mut self, rect: Rect, label: &str, selected: bool) {
        let c0 = (rect.x / PX_PER_COL) as usize;
        let cw = (rect.w / PX_PER_COL) as usize;
        let row = MAP_ROW + (rect.y / TILE) as usize;
        if row >= self.front.height {
            return;
        }
        let (fg, bg) = if selected {
            (Color::Black, Color::Rgb { r: 80, g: 255, b: 80 })
        } else {
            (Color::White, Color::Rgb { r: 40, g: 40, b: 80 })
        };
        for x in c0..(c0 + cw).min(self.front.width) {
            self.front.set(x, row, Cell::from_char(' ', fg, bg, false));
        }
        let lx = c0 + cw.saturating_sub(label.len()) / 2;
        self.front.put_str(lx, row, label, fg, bg, true);
        if selected {
            let blink = (self.frame / 5) % 2 == 0;
            let arrow = if blink { "▸" } else { " " };
            self.front.put_str(c0 + 1, row, arrow, fg, bg, true);
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___  _     ___   ___  _  __ _  _  ___  ___ ",
            r" | _ )| |   / _ \ / __|| |/ /| || |/ _ \| _ \",
            r" | _ \| |__| (_) || (__ |   < | __ | (_) |  _/",
            r" |___/|____|\___/  \___||_|\_\|_||_|\___/|_|  ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(16, 2 + i, line, Color::Rgb{r:255,g:200,b:50}, Color::Reset, true);
        }

        let subtitle = "◈◈  Hop, climb, stomp, collect  ◈◈";
        let sx = 16 + (title[1].len().saturating_sub(subtitle.chars().count())) / 2;
        self.front.put_str(sx, 7, subtitle, Color::Rgb{r:80,g:255,b:80}, Color::Reset, true);

        let tagline = "━━━ Terminal Edition (Rust) ━━━";
        let tx = 16 + (title[1].len().saturating_sub(tagline.chars().count())) / 2;
        self.front.put_str(tx, 8, tagline, Color::Rgb{r:180,g:140,b:50}, Color::Reset, false);

        for (i, (rect, label)) in title_buttons().iter().enumerate() {
            self.draw_button(*rect, label, w.menu_cursor == i);
        }

        let hint = "  ↑↓: Select   ENTER / Click: Confirm";
        self.front.put_str(20, MAP_ROW + GRID_H, hint, Color::DarkGrey, Color::Reset, false);

        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            let msg_row = MAP_ROW + GRID_H + 1;
            self.front.put_str(0, msg_row, &msg, Color::Black, Color::Rgb{r:200,g:180,b:50}, false);
        }
    }

    fn compose_mode_select(&mut self, w: &WorldState) {
        let header = "╔═══════════════════════╗";
        let label  = "║      GAME  MODE       ║";
        let footer = "╚═══════════════════════╝";
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        self.front.put_str(26, 3, header, gold, Color::Reset, true);
        self.front.put_str(26, 4, label, gold, Color::Reset, true);
        self.front.put_str(26, 5, footer, gold, Color::Reset, true);

        for (i, (rect, label)) in mode_buttons().iter().enumerate() {
            self.draw_button(*rect, label, w.menu_cursor == i);
        }

        let desc = match w.menu_cursor {
            0 => "Play every level in order, three lives per run.",
            _ => "Jump straight to any level.",
        };
        let dx = (GRID_W * CELL_W).saturating_sub(desc.len()) / 2;
        self.front.put_str(dx, MAP_ROW + 12, desc, Color::DarkGrey, Color::Reset, false);

        self.front.put_str(20, MAP_ROW + GRID_H, "  ESC: Back", Color::DarkGrey, Color::Reset, false);
    }

    fn compose_settings(&mut self, w: &WorldState) {
        let header = "╔═══════════════════════╗";
        let label  = "║       SETTINGS        ║";
        let footer = "╚═══════════════════════╝";
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        self.front.put_str(26, 3, header, gold, Color::Reset, true);
        self.front.put_str(26, 4, label, gold, Color::Reset, true);
        self.front.put_str(26, 5, footer, gold, Color::Reset, true);

        let sound_label = if w.mute { "Sound: OFF" } else { "Sound: ON" };
        let buttons = settings_buttons();
        self.draw_button(buttons[0].0, sound_label, w.menu_cursor == 0);
        self.draw_button(buttons[1].0, buttons[1].1, w.menu_cursor == 1);

        self.front.put_str(20, MAP_ROW + GRID_H, "  M also toggles sound during play", Color::DarkGrey, Color::Reset, false);
    }

    fn compose_about(&mut self, w: &WorldState) {
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        self.front.put_str(30, 3, "◈ ABOUT ◈", gold, Color::Reset, true);

        let lines = [
            "Hop across platforms, climb vines, and stomp",
            "patrolling pests while you gather every coin.",
            "",
            "When the last coin is yours the exit door",
            "opens. Some levels skip the door and end on",
            "the spot.",
            "",
            "One tile per step. Two jumps if you are quick.",
        ];
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(18, 6 + i, line, Color::White, Color::Reset, false);
        }

        let buttons = about_buttons();
        self.draw_button(buttons[0].0, buttons[0].1, w.menu_cursor == 0);
    }

    fn compose_level_select(&mut self, w: &WorldState) {
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        let normal = Color::White;
        let dim = Color::DarkGrey;
        let cursor_bg = Color::Rgb { r: 30, g: 60, b: 30 };
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };

        self.front.put_str(2, 1, "╔═════════════════════════════════╗", gold, Color::Reset, true);
        self.front.put_str(2, 2, "║          LEVEL  SELECT          ║", gold, Color::Reset, true);
        self.front.put_str(2, 3, "╚═════════════════════════════════╝", gold, Color::Reset, true);

        let list_top = 5;
        let visible = 12_usize.min(self.front.height.saturating_sub(list_top + 3));
        let total = w.levels.len();
        let scroll = w.select_scroll;

        if scroll > 0 {
            self.front.put_str(2, list_top - 1, "    ▲ ▲ ▲", dim, Color::Reset, false);
        }

        for i in 0..visible {
            let idx = scroll + i;
            if idx >= total { break; }
            let row = list_top + i;
            if row >= self.front.height { break; }

            let is_selected = idx == w.select_cursor;
            let num_str = format!("{:>3}.", idx + 1);
            let name = &w.levels[idx].name;

            if is_selected {
                let blink = (self.frame / 5) % 2 == 0;
                let arrow = if blink { "▸" } else { " " };
                for x in 0..40.min(self.front.width) {
                    self.front.set(x, row, Cell::from_char(' ', normal, cursor_bg, false));
                }
                self.front.put_str(2, row, arrow, hi, cursor_bg, true);
                self.front.put_str(3, row, &num_str, hi, cursor_bg, true);
                self.front.put_str(8, row, name, hi, cursor_bg, true);
            } else {
                self.front.put_str(3, row, &num_str, dim, Color::Reset, false);
                self.front.put_str(8, row, name, normal, Color::Reset, false);
            }
        }

        if scroll + visible < total {
            let ind_row = list_top + visible;
            if ind_row < self.front.height {
                self.front.put_str(2, ind_row, "    ▼ ▼ ▼", dim, Color::Reset, false);
            }
        }

        let footer_row = list_top + visible + 2;
        if footer_row < self.front.height {
            self.front.put_str(2, footer_row, "  ENTER: Start   ↑↓: Select   ESC: Back", dim, Color::Reset, false);
        }
    }
}
