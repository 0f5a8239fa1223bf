/// Entities: the static level furniture plus the two moving actors.
///
/// Everything physical is a kind tag plus an axis-aligned rect. Static
/// entities live in one flat Vec rebuilt wholesale on level load;
/// removal is index-based with a remove-one-then-break contract.

use super::geom::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Platform,
    Vine,
    Coin,
    Life,
    Door,
}

impl EntityKind {
    /// Does this entity reject a player move into it? (wall / floor)
    pub fn is_blocking(self) -> bool {
        matches!(self, EntityKind::Platform)
    }

    /// Can the player hang on this and ignore gravity?
    pub fn is_climbable(self) -> bool {
        matches!(self, EntityKind::Vine)
    }

    /// Consumed on contact?
    pub fn is_collectible(self) -> bool {
        matches!(self, EntityKind::Coin | EntityKind::Life)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Entity {
    pub kind: EntityKind,
    pub rect: Rect,
}

impl Entity {
    pub fn new(kind: EntityKind, rect: Rect) -> Self {
        Entity { kind, rect }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Walking-cycle toggle: enemies flip this every tile boundary.
    pub fn flip(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// One tick's worth of drained input. Every field is an edge-triggered
/// press (one press = one discrete tile step, never hold-to-repeat);
/// `now_ms` is the wall-clock sample all simulation timers derive from.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub now_ms: u64,
}

impl FrameInput {
    pub fn idle(now_ms: u64) -> Self {
        FrameInput {
            left: false,
            right: false,
            up: false,
            down: false,
            jump: false,
            now_ms,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub facing: Facing,
    /// Derived each tick from the platform probe; gates first jumps.
    pub on_ground: bool,
    /// One double jump per ground-contact cycle.
    pub can_double_jump: bool,
    /// Timestamp of the FIRST jump of the current airborne cycle. The
    /// double-jump window is measured from here and never refreshed.
    pub last_jump_ms: u64,
    /// Reduced gravity applies while now < this; zeroed on landing.
    pub float_until_ms: u64,
}

impl Player {
    pub fn new(rect: Rect) -> Self {
        Player {
            rect,
            facing: Facing::Right,
            on_ground: false,
            can_double_jump: false,
            last_jump_ms: 0,
            float_until_ms: 0,
        }
    }
}

/// A patrolling enemy. `path` is the fixed horizontal interval its box
/// oscillates within: x stays in `[path.x, path.x + path.w]`, with up
/// to one speed-step of overshoot before the flip check lands.
#[derive(Clone, PartialEq, Debug)]
pub struct Enemy {
    pub rect: Rect,
    pub path: Rect,
    pub moving_right: bool,
    pub facing: Facing,
}

impl Enemy {
    pub fn new(rect: Rect, path: Rect) -> Self {
        Enemy {
            rect,
            path,
            moving_right: true,
            facing: Facing::Right,
        }
    }
}
