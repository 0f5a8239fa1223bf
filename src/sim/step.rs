//! The per-tick simulation step.
//!
//! `step` advances a PLAYING world by exactly one tick. Processing
//! order within the tick:
//!
//!   1. Directional moves (left, right, up, down)
//!   2. Jump and double jump
//!   3. Enemy patrol and stomp
//!   4. Lethal enemy contact
//!   5. Gravity
//!   6. Fall and countdown death
//!   7. Win check (door entry, or bare coin completion)
//!
//! Every move request runs through one pipeline: candidate rect,
//! screen clamp, collectible sweep, block test, commit. A collectible
//! consumed by the sweep stays consumed even when the block test then
//! rejects the move itself.
//!
//! The timed DYING and TRANSITION phases are advanced by the
//! `update_*` helpers, which the outer loop calls instead of `step`
//! while those phases run.

use super::event::GameEvent;
use super::level;
use super::world::{Phase, WorldState};
use super::{
    CLEAR_MS, DEATH_MS, DOUBLE_JUMP_WINDOW_MS, ENEMY_SPEED, FALL_DEATH_Y, FLOAT_WINDOW_MS,
    GRAVITY_FLOAT, GRAVITY_REST, SCREEN_H, SCREEN_W, TILE,
};
use crate::domain::entity::{EntityKind, Facing, FrameInput};
use crate::domain::geom::{self, Rect};
use crate::domain::rules;

/// Advance the world by one tick. Returns the events the tick
/// produced, for sound and logging. Outside PLAYING this is a no-op.
pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.phase != Phase::Playing {
        return events;
    }

    world.tick += 1;
    let now = input.now_ms;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    resolve_moves(world, &input, &mut events);
    resolve_jump(world, &input, &mut events);
    resolve_enemies(world, &mut events);
    if resolve_lethal_contact(world, now, &mut events) {
        return events;
    }
    resolve_gravity(world, now);
    if resolve_falling_death(world, now, &mut events) {
        return events;
    }
    if resolve_time_up(world, now, &mut events) {
        return events;
    }
    resolve_win(world, now, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Movement pipeline
// ══════════════════════════════════════════════════════════════

fn resolve_moves(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if input.left {
        world.player.facing = Facing::Left;
        try_move(world, -TILE, 0.0, events);
    }
    if input.right {
        world.player.facing = Facing::Right;
        try_move(world, TILE, 0.0, events);
    }
    if input.up {
        try_move(world, 0.0, -TILE, events);
    }
    if input.down {
        try_move(world, 0.0, TILE, events);
    }
}

/// One move request: shift by a whole tile, clamp to the screen,
/// sweep collectibles at the candidate, then commit unless a blocking
/// entity overlaps. Returns whether the candidate was committed.
fn try_move(world: &mut WorldState, dx: f32, dy: f32, events: &mut Vec<GameEvent>) -> bool {
    let mut candidate = world.player.rect.shifted(dx, dy);

    if candidate.x < 0.0 {
        candidate.x = 0.0;
    }
    if candidate.right() > SCREEN_W {
        candidate.x = SCREEN_W - candidate.w;
    }
    if candidate.y < 0.0 {
        candidate.y = 0.0;
    }
    if candidate.bottom() > SCREEN_H {
        candidate.y = SCREEN_H - candidate.h;
    }

    collect_at(world, &candidate, events);

    if rules::blocked(&candidate, &world.entities) {
        return false;
    }
    world.player.rect = candidate;
    true
}

/// Consume the first collectible the candidate touches. Removal is
/// index based, one entity per sweep.
fn collect_at(world: &mut WorldState, candidate: &Rect, events: &mut Vec<GameEvent>) {
    let hit = world
        .entities
        .iter()
        .position(|e| e.kind.is_collectible() && geom::intersects(candidate, &e.rect));
    let Some(idx) = hit else {
        return;
    };
    let taken = world.entities.remove(idx);
    match taken.kind {
        EntityKind::Coin => {
            world.coins_collected += 1;
            events.push(GameEvent::CoinPicked {
                x: taken.rect.x,
                y: taken.rect.y,
            });
            if world.coins_complete() {
                events.push(GameEvent::AllCoinsCollected);
            }
        }
        EntityKind::Life => {
            world.lives += 1;
            events.push(GameEvent::LifePicked {
                x: taken.rect.x,
                y: taken.rect.y,
            });
            world.set_message("Extra life!", 60);
        }
        _ => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Jump
// ══════════════════════════════════════════════════════════════

/// Jumps are tile steps with extra bookkeeping. The first jump needs
/// ground under the feet; a second one is allowed while airborne, once
/// per ground contact, within the window after the first. Both arm the
/// reduced-gravity float. A jump rejected by the block test consumes
/// nothing.
fn resolve_jump(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if !input.jump {
        return;
    }
    let now = input.now_ms;

    if world.player.on_ground {
        if try_move(world, 0.0, -TILE, events) {
            let p = &mut world.player;
            p.on_ground = false;
            p.can_double_jump = true;
            p.last_jump_ms = now;
            p.float_until_ms = now + FLOAT_WINDOW_MS;
            events.push(GameEvent::Jumped);
        }
    } else if world.player.can_double_jump
        && now.saturating_sub(world.player.last_jump_ms) < DOUBLE_JUMP_WINDOW_MS
    {
        if try_move(world, 0.0, -TILE, events) {
            let p = &mut world.player;
            p.can_double_jump = false;
            p.float_until_ms = now + FLOAT_WINDOW_MS;
            events.push(GameEvent::DoubleJumped);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Patrol every enemy one speed step along its segment, flipping the
/// direction at the bounds, then check for a stomp. A stomp removes
/// the enemy and ends the enemy pass for this tick.
fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.enemies.len() {
        let col_before = (world.enemies[i].rect.x / TILE) as i32;
        {
            let e = &mut world.enemies[i];
            if e.moving_right {
                e.rect.x += ENEMY_SPEED;
                if e.rect.x >= e.path.right() {
                    e.moving_right = false;
                }
            } else {
                e.rect.x -= ENEMY_SPEED;
                if e.rect.x <= e.path.x {
                    e.moving_right = true;
                }
            }
        }
        let col_after = (world.enemies[i].rect.x / TILE) as i32;
        if col_before != col_after {
            let e = &mut world.enemies[i];
            e.facing = e.facing.flip();
        }

        // One-pixel slice at the player's feet against one at the
        // enemy's crown. Plain side contact misses both slices and is
        // left for the lethal check.
        let p = &world.player.rect;
        let feet = Rect::new(p.x, p.bottom() - 1.0, p.w, 1.0);
        let e = &world.enemies[i].rect;
        let crown = Rect::new(e.x, e.y, e.w, 1.0);
        if geom::intersects(&feet, &crown) {
            let gone = world.enemies.remove(i);
            events.push(GameEvent::EnemyStomped {
                x: gone.rect.x,
                y: gone.rect.y,
            });
            break;
        }
    }
}

/// Full-rect contact with any surviving enemy starts the death fade.
/// Returns true when the tick must stop here.
fn resolve_lethal_contact(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
    let p = world.player.rect;
    if world.enemies.iter().any(|e| geom::intersects(&p, &e.rect)) {
        events.push(GameEvent::PlayerDied);
        world.enter_phase(Phase::Dying, now_ms);
        return true;
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Pull the player down unless something suppresses gravity. The pull
/// is halved while the post-jump float window is open. Landing on a
/// platform ends the float and the double-jump cycle.
fn resolve_gravity(world: &mut WorldState, now_ms: u64) {
    if rules::gravity_suppressed(&world.player.rect, &world.entities) {
        let standing = rules::standing_on_platform(&world.player.rect, &world.entities);
        let p = &mut world.player;
        if standing && !p.on_ground {
            p.can_double_jump = false;
            p.float_until_ms = 0;
        }
        p.on_ground = standing;
        return;
    }

    let p = &mut world.player;
    p.on_ground = false;
    let pull = if now_ms < p.float_until_ms {
        GRAVITY_FLOAT
    } else {
        GRAVITY_REST
    };
    p.rect.y += pull;
    if p.rect.bottom() > SCREEN_H {
        p.rect.y = SCREEN_H - p.rect.h;
    }
}

// ══════════════════════════════════════════════════════════════
// Death checks
// ══════════════════════════════════════════════════════════════

fn resolve_falling_death(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
    if world.player.rect.y >= FALL_DEATH_Y {
        events.push(GameEvent::PlayerDied);
        world.enter_phase(Phase::Dying, now_ms);
        return true;
    }
    false
}

fn resolve_time_up(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
    if world.time_left_ms(now_ms) == Some(0) {
        events.push(GameEvent::PlayerDied);
        world.set_message("Out of time!", 90);
        world.enter_phase(Phase::Dying, now_ms);
        return true;
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Win
// ══════════════════════════════════════════════════════════════

/// Once every coin is collected the level can end: through the door
/// when the level has one, immediately otherwise. The door opens on
/// the first tick the count is complete, however it got complete.
fn resolve_win(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) {
    if !world.coins_complete() {
        return;
    }

    match world.door {
        Some(door) => {
            if !world.door_open {
                world.door_open = true;
                events.push(GameEvent::DoorOpened);
                world.set_message("The door is open!", 90);
            }
            if geom::intersects(&world.player.rect, &door) {
                events.push(GameEvent::DoorEntered);
                world.enter_phase(Phase::Transition, now_ms);
            }
        }
        None => {
            events.push(GameEvent::LevelCleared);
            world.enter_phase(Phase::Won, now_ms);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Timed phases
// ══════════════════════════════════════════════════════════════

/// Advance the death fade. Completion spends a life and settles into
/// LOST; losing the last life flags the run as over.
pub fn update_dying(world: &mut WorldState, now_ms: u64) {
    if world.phase != Phase::Dying {
        return;
    }
    if world.phase_progress(now_ms, DEATH_MS) >= 1.0 {
        world.lives = world.lives.saturating_sub(1);
        world.out_of_lives = world.lives == 0;
        world.enter_phase(Phase::Lost, now_ms);
    }
}

/// Advance the door walk-through. Completion lands on WON.
pub fn update_transition(world: &mut WorldState, now_ms: u64) {
    if world.phase != Phase::Transition {
        return;
    }
    if world.phase_progress(now_ms, CLEAR_MS) >= 1.0 {
        world.enter_phase(Phase::Won, now_ms);
    }
}

/// Vertical sprite offset during the death fade: a short freeze, a
/// slow rise, then a fast drop off the bottom of the screen.
pub fn death_offset(progress: f32) -> f32 {
    if progress < 0.2 {
        0.0
    } else if progress < 0.5 {
        -80.0 * (progress - 0.2) / 0.3
    } else {
        -80.0 + 320.0 * (progress - 0.5) / 0.5
    }
}

// ══════════════════════════════════════════════════════════════
// Session flow
// ══════════════════════════════════════════════════════════════

/// Confirm on WON: move to the next level, wrapping past the last one.
pub fn advance_level(world: &mut WorldState, now_ms: u64) {
    if world.levels.is_empty() {
        return;
    }
    let next = (world.current_level + 1) % world.levels.len();
    level::enter_level(world, next, now_ms);
}

/// Confirm on LOST: retry the current level, or restart the whole run
/// with fresh lives when the last one is gone.
pub fn retry_level(world: &mut WorldState, now_ms: u64) {
    let target = if world.out_of_lives {
        world.lives = world.starting_lives;
        world.out_of_lives = false;
        0
    } else {
        world.current_level
    };
    level::enter_level(world, target, now_ms);
}

/// Debug helper: clear every remaining coin as if collected.
pub fn force_collect_all(world: &mut WorldState) {
    world.entities.retain(|e| e.kind != EntityKind::Coin);
    world.coins_collected = world.coins_total;
}

/// Debug helper: end the level immediately.
pub fn force_win(world: &mut WorldState, now_ms: u64) {
    world.enter_phase(Phase::Won, now_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Enemy, Entity};
    use crate::sim::level::parse_level;

    fn world_from(text: &str) -> WorldState {
        let def = parse_level("fixture", text).unwrap();
        let mut w = WorldState::new();
        w.levels = vec![def];
        level::enter_level(&mut w, 0, 0);
        w
    }

    fn idle(now: u64) -> FrameInput {
        FrameInput::idle(now)
    }

    fn left(now: u64) -> FrameInput {
        FrameInput {
            left: true,
            ..FrameInput::idle(now)
        }
    }

    fn right(now: u64) -> FrameInput {
        FrameInput {
            right: true,
            ..FrameInput::idle(now)
        }
    }

    fn jump(now: u64) -> FrameInput {
        FrameInput {
            jump: true,
            ..FrameInput::idle(now)
        }
    }

    fn has_event(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> bool {
        events.iter().any(pred)
    }

    #[test]
    fn move_into_a_platform_is_rejected() {
        let mut w = world_from("+11\n1@1\n111");
        let before = w.player.rect;
        step(&mut w, right(10));
        assert_eq!(w.player.rect, before);
        assert_eq!(w.player.facing, Facing::Right);
    }

    #[test]
    fn move_into_free_space_commits() {
        let mut w = world_from("...+\n.@..\n1111");
        step(&mut w, right(10));
        assert_eq!(w.player.rect.x, 2.0 * TILE);
        step(&mut w, left(20));
        assert_eq!(w.player.rect.x, TILE);
        assert_eq!(w.player.facing, Facing::Left);
    }

    #[test]
    fn left_at_the_screen_edge_clamps_in_place() {
        let mut w = world_from("@..+\n1111");
        step(&mut w, left(10));
        assert_eq!(w.player.rect.x, 0.0);
        assert_eq!(w.player.facing, Facing::Left);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn coin_is_kept_even_when_the_move_is_rejected() {
        let mut w = world_from("1111\n1@.1\n1111");
        // A coin and a blocking platform share the cell to the right.
        let cell = Rect::new(2.0 * TILE, TILE, TILE, TILE);
        w.entities.push(Entity::new(EntityKind::Coin, cell));
        w.entities.push(Entity::new(EntityKind::Platform, cell));
        w.coins_total += 1;

        let before = w.player.rect;
        let events = step(&mut w, right(10));

        assert_eq!(w.player.rect, before);
        assert_eq!(w.coins_collected, 1);
        assert!(!w.entities.iter().any(|e| e.kind == EntityKind::Coin));
        assert!(has_event(&events, |e| matches!(e, GameEvent::CoinPicked { .. })));
    }

    #[test]
    fn collecting_the_last_coin_of_a_doorless_level_wins() {
        let mut w = world_from("1111\n1@+1\n1111");
        let events = step(&mut w, right(10));
        assert_eq!(w.coins_collected, 1);
        assert_eq!(w.phase, Phase::Won);
        assert!(has_event(&events, |e| matches!(e, GameEvent::AllCoinsCollected)));
        assert!(has_event(&events, |e| matches!(e, GameEvent::LevelCleared)));
    }

    #[test]
    fn life_pickup_adds_a_life() {
        let mut w = world_from("...+\n.@^.\n1111");
        let lives = w.lives;
        let events = step(&mut w, right(10));
        assert_eq!(w.lives, lives + 1);
        assert!(has_event(&events, |e| matches!(e, GameEvent::LifePicked { .. })));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn one_collectible_per_sweep() {
        let mut w = world_from("....\n.@..\n1111");
        let cell = Rect::new(2.0 * TILE, TILE, TILE, TILE);
        w.entities.push(Entity::new(EntityKind::Coin, cell));
        w.entities.push(Entity::new(EntityKind::Coin, cell));
        w.coins_total += 2;

        step(&mut w, right(10));
        assert_eq!(w.coins_collected, 1);
        assert_eq!(
            w.entities.iter().filter(|e| e.kind == EntityKind::Coin).count(),
            1
        );
    }

    #[test]
    fn jump_rises_one_tile_and_arms_the_float() {
        let mut w = world_from("...+\n....\n....\n@...\n1111");
        let y0 = w.player.rect.y;
        let events = step(&mut w, jump(0));
        // One tile up, then half a pixel of float-gravity.
        assert_eq!(w.player.rect.y, y0 - TILE + GRAVITY_FLOAT);
        assert!(has_event(&events, |e| matches!(e, GameEvent::Jumped)));
        assert!(!w.player.on_ground);
        assert!(w.player.can_double_jump);
        assert_eq!(w.player.float_until_ms, FLOAT_WINDOW_MS);
    }

    #[test]
    fn double_jump_inside_the_window() {
        let mut w = world_from("...+\n....\n....\n@...\n1111");
        step(&mut w, jump(0));
        let y = w.player.rect.y;
        let events = step(&mut w, jump(100));
        assert!(has_event(&events, |e| matches!(e, GameEvent::DoubleJumped)));
        assert_eq!(w.player.rect.y, y - TILE + GRAVITY_FLOAT);
        assert!(!w.player.can_double_jump);

        // A third press in the air does nothing.
        let y = w.player.rect.y;
        let events = step(&mut w, jump(200));
        assert!(events.is_empty());
        assert_eq!(w.player.rect.y, y + GRAVITY_FLOAT);
    }

    #[test]
    fn double_jump_after_the_window_is_refused() {
        let mut w = world_from("...+\n....\n....\n@...\n1111");
        step(&mut w, jump(0));
        // Fall for a while without landing.
        for t in 1..=30u64 {
            step(&mut w, idle(t * 16));
        }
        assert!(!w.player.on_ground);
        assert!(w.player.can_double_jump);

        let events = step(&mut w, jump(600));
        assert!(!has_event(&events, |e| matches!(e, GameEvent::DoubleJumped)));
        assert!(w.player.can_double_jump);
    }

    #[test]
    fn float_gravity_gives_way_to_rest_gravity() {
        let mut w = world_from("...+\n....\n....\n@...\n1111");
        step(&mut w, jump(0));
        let y = w.player.rect.y;
        step(&mut w, idle(100));
        assert_eq!(w.player.rect.y, y + GRAVITY_FLOAT);
        step(&mut w, idle(700));
        assert_eq!(w.player.rect.y, y + GRAVITY_FLOAT + GRAVITY_REST);
    }

    #[test]
    fn landing_ends_the_jump_cycle() {
        let mut w = world_from("...+\n....\n....\n@...\n1111");
        step(&mut w, jump(0));
        let mut t = 0;
        while !w.player.on_ground {
            t += 16;
            step(&mut w, idle(t));
            assert!(t < 60_000, "player never landed");
        }
        assert!(!w.player.can_double_jump);
        assert_eq!(w.player.float_until_ms, 0);
        assert_eq!(w.player.rect.y, 3.0 * TILE);
    }

    #[test]
    fn vine_top_holds_the_player_and_allows_climbing_down() {
        let mut w = world_from("@..+\n/...\n1111");
        let before = w.player.rect;
        step(&mut w, idle(10));
        assert_eq!(w.player.rect, before);

        let down = FrameInput {
            down: true,
            ..FrameInput::idle(20)
        };
        step(&mut w, down);
        assert_eq!(w.player.rect.y, TILE);
        step(&mut w, idle(30));
        assert_eq!(w.player.rect.y, TILE);
    }

    #[test]
    fn patrol_stays_inside_its_segment() {
        let mut w = world_from("@....+\n111111\n$....$");
        assert_eq!(w.enemies.len(), 1);
        let path = w.enemies[0].path;
        for t in 0..1000u64 {
            step(&mut w, idle(t));
            let x = w.enemies[0].rect.x;
            assert!(x >= path.x && x <= path.right(), "x={x} out of bounds");
        }
    }

    #[test]
    fn enemy_facing_toggles_at_tile_boundaries() {
        let mut w = world_from("@....+\n111111\n$....$");
        assert_eq!(w.enemies[0].facing, Facing::Right);
        for t in 0..40u64 {
            step(&mut w, idle(t));
        }
        // Crossing from column 0 into column 1 flipped the sprite.
        assert_eq!(w.enemies[0].facing, Facing::Left);
        for t in 40..80u64 {
            step(&mut w, idle(t));
        }
        assert_eq!(w.enemies[0].facing, Facing::Right);
    }

    #[test]
    fn stomp_removes_the_enemy_and_halts_the_pass() {
        let mut w = world_from("@..+\n1111");
        // First enemy's crown sits inside the player's feet slice.
        let under = Rect::new(0.0, 39.5, 30.0, 30.0);
        w.enemies.push(Enemy::new(under, Rect::new(0.0, 39.5, 100.0, 30.0)));
        let far = Rect::new(120.0, 200.0, 30.0, 30.0);
        w.enemies.push(Enemy::new(far, Rect::new(120.0, 200.0, 80.0, 30.0)));

        let events = step(&mut w, idle(10));
        assert!(has_event(&events, |e| matches!(e, GameEvent::EnemyStomped { .. })));
        assert_eq!(w.enemies.len(), 1);
        // The pass stopped before the second enemy moved.
        assert_eq!(w.enemies[0].rect.x, 120.0);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn side_contact_is_lethal() {
        let mut w = world_from("@...\n1111");
        let beside = Rect::new(20.0, 10.0, 30.0, 30.0);
        w.enemies.push(Enemy::new(beside, Rect::new(0.0, 10.0, 200.0, 30.0)));

        let events = step(&mut w, idle(10));
        assert!(has_event(&events, |e| matches!(e, GameEvent::PlayerDied)));
        assert_eq!(w.phase, Phase::Dying);
        assert_eq!(w.enemies.len(), 1);

        // A dead world no longer steps.
        let tick = w.tick;
        let events = step(&mut w, idle(20));
        assert!(events.is_empty());
        assert_eq!(w.tick, tick);
    }

    #[test]
    fn falling_off_the_world_is_lethal() {
        let mut w = world_from("@..+");
        let mut died = false;
        for t in 0..2000u64 {
            let events = step(&mut w, idle(t));
            if has_event(&events, |e| matches!(e, GameEvent::PlayerDied)) {
                died = true;
                break;
            }
        }
        assert!(died);
        assert_eq!(w.phase, Phase::Dying);
        assert!(w.player.rect.y >= FALL_DEATH_Y);
    }

    #[test]
    fn countdown_exhaustion_is_lethal() {
        let mut w = world_from("...+\n.@..\n1111");
        w.time_limit_ms = 50;
        w.level_started_ms = 0;

        step(&mut w, idle(49));
        assert_eq!(w.phase, Phase::Playing);
        let events = step(&mut w, idle(50));
        assert!(has_event(&events, |e| matches!(e, GameEvent::PlayerDied)));
        assert_eq!(w.phase, Phase::Dying);
    }

    #[test]
    fn door_opens_on_completion_and_gates_the_exit() {
        let mut w = world_from("1111\nD@+1\n1111");
        let door = w.door.unwrap();
        assert_eq!(door, Rect::new(0.0, 0.0, TILE, 2.0 * TILE));

        // Walking into the closed door does nothing.
        step(&mut w, left(10));
        assert!(geom::intersects(&w.player.rect, &door));
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.door_open);

        // Collect the coin: the door opens but the level is not over.
        step(&mut w, right(20));
        let events = step(&mut w, right(30));
        assert!(w.door_open);
        assert!(has_event(&events, |e| matches!(e, GameEvent::DoorOpened)));
        assert_eq!(w.phase, Phase::Playing);

        // Step back into the doorway.
        step(&mut w, left(40));
        let events = step(&mut w, left(50));
        assert!(has_event(&events, |e| matches!(e, GameEvent::DoorEntered)));
        assert_eq!(w.phase, Phase::Transition);
    }

    #[test]
    fn transition_completes_into_won() {
        let mut w = world_from("....\n.@..\n1111");
        w.enter_phase(Phase::Transition, 1000);
        update_transition(&mut w, 1000 + CLEAR_MS - 1);
        assert_eq!(w.phase, Phase::Transition);
        update_transition(&mut w, 1000 + CLEAR_MS);
        assert_eq!(w.phase, Phase::Won);
    }

    #[test]
    fn dying_spends_a_life_and_lands_on_lost() {
        let mut w = world_from("....\n.@..\n1111");
        w.lives = 3;
        w.enter_phase(Phase::Dying, 0);
        update_dying(&mut w, DEATH_MS - 1);
        assert_eq!(w.phase, Phase::Dying);
        update_dying(&mut w, DEATH_MS);
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(w.lives, 2);
        assert!(!w.out_of_lives);
    }

    #[test]
    fn losing_the_last_life_ends_the_run() {
        let mut w = world_from("....\n.@..\n1111");
        w.lives = 1;
        w.enter_phase(Phase::Dying, 0);
        update_dying(&mut w, DEATH_MS);
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(w.lives, 0);
        assert!(w.out_of_lives);

        w.starting_lives = 3;
        retry_level(&mut w, 5000);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.lives, 3);
        assert!(!w.out_of_lives);
        assert_eq!(w.current_level, 0);
    }

    #[test]
    fn retry_with_lives_left_replays_the_level() {
        let mut w = world_from("....\n.@+.\n1111");
        step(&mut w, right(10));
        assert_eq!(w.coins_collected, 1);

        w.lives = 2;
        retry_level(&mut w, 5000);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.lives, 2);
        assert_eq!(w.coins_collected, 0);
        assert_eq!(w.coins_total, 1);
        assert_eq!(w.player.rect.x, TILE);
    }

    #[test]
    fn winning_advances_and_wraps() {
        let a = parse_level("a", "....\n.@..\n1111").unwrap();
        let b = parse_level("b", "....\n..@.\n1111").unwrap();
        let mut w = WorldState::new();
        w.levels = vec![a, b];
        level::enter_level(&mut w, 1, 0);

        advance_level(&mut w, 100);
        assert_eq!(w.current_level, 0);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.level_name, "a");
    }

    #[test]
    fn death_offset_freezes_rises_then_drops() {
        assert_eq!(death_offset(0.0), 0.0);
        assert_eq!(death_offset(0.1), 0.0);
        assert_eq!(death_offset(0.2), 0.0);
        assert!((death_offset(0.35) + 40.0).abs() < 1e-3);
        // The boundary belongs to the drop.
        assert_eq!(death_offset(0.5), -80.0);
        assert_eq!(death_offset(0.75), 80.0);
        assert_eq!(death_offset(1.0), 240.0);
    }

    #[test]
    fn force_collect_opens_the_way_out() {
        let mut w = world_from("1111\nD@+1\n1111");
        force_collect_all(&mut w);
        assert!(w.coins_complete());
        assert!(!w.entities.iter().any(|e| e.kind == EntityKind::Coin));

        let events = step(&mut w, idle(10));
        assert!(w.door_open);
        assert!(has_event(&events, |e| matches!(e, GameEvent::DoorOpened)));
    }

    #[test]
    fn message_timer_counts_down_during_play() {
        let mut w = world_from("...+\n.@..\n1111");
        w.set_message("hop", 2);
        step(&mut w, idle(10));
        assert_eq!(w.message, "hop");
        step(&mut w, idle(20));
        assert!(w.message.is_empty());
    }
}
