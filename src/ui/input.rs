/// Input event collector.
///
/// Movement is discrete: every key event is one step, and terminal
/// autorepeat supplies the stream while a key stays down. So there is
/// no held-key state here, only the presses that arrived since the
/// last drain:
///   - Press and Repeat events count; Release events are dropped
///   - Left mouse clicks are kept as cell coordinates for the menus
///   - Raw events stay available for meta handling (Ctrl-C)

use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind, poll,
};

pub struct InputState {
    /// Key presses collected during the most recent drain_events(),
    /// in arrival order.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Terminal cell coordinates of left-button clicks this frame.
    pub clicks: Vec<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(2),
        }
    }

    /// Drain all pending terminal events.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();
        self.clicks.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    if key.kind != KeyEventKind::Release {
                        self.presses.push(key.code);
                    }
                }
                Ok(Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                })) => {
                    self.clicks.push((column, row));
                }
                _ => {}
            }
        }
    }

    /// Was this key pressed (or autorepeated) this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
