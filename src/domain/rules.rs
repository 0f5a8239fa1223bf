/// Gravity-suppression and blocking rules — pure queries, no side
/// effects. These encode "what holds the player up" and "what stops a
/// move" without performing either.
///
/// ## Support Truth Table
///
/// Gravity applies per tick ONLY when none of these rows match:
/// ┌───────────────────────────────────────────┬────────────┐
/// │ Condition                                 │ Suppressed │
/// ├───────────────────────────────────────────┼────────────┤
/// │ 1 px down-probe hits a Platform           │ YES (standing) │
/// │ own rect overlaps a Vine                  │ YES (on vine)  │
/// │ no vine overlap, but down-probe hits one  │ YES (vine top) │
/// │ otherwise                                 │ NO → fall      │
/// └───────────────────────────────────────────┴────────────┘
///
/// The vine-top row is the asymmetric rule that lets the player stand
/// on the first empty tile above a vine column without sinking into it.
/// Probes are the whole rect shifted down 1 px: with the exclusive edge
/// rule in `geom`, resting contact registers only through the probe,
/// never as a direct overlap.

use super::entity::Entity;
use super::geom::{self, Rect};

/// Is there a platform directly under this rect? (1 px probe)
pub fn standing_on_platform(rect: &Rect, entities: &[Entity]) -> bool {
    let probe = rect.shifted(0.0, 1.0);
    entities
        .iter()
        .any(|e| e.kind.is_blocking() && geom::intersects(&probe, &e.rect))
}

/// Does this rect itself overlap a climbable? Every vine is scanned
/// before answering no.
pub fn on_vine(rect: &Rect, entities: &[Entity]) -> bool {
    entities
        .iter()
        .any(|e| e.kind.is_climbable() && geom::intersects(rect, &e.rect))
}

/// Standing on the first empty tile above a vine column: no direct vine
/// overlap, but the 1 px probe below touches one.
pub fn at_vine_top(rect: &Rect, entities: &[Entity]) -> bool {
    if on_vine(rect, entities) {
        return false;
    }
    let probe = rect.shifted(0.0, 1.0);
    entities
        .iter()
        .any(|e| e.kind.is_climbable() && geom::intersects(&probe, &e.rect))
}

/// Would this rect overlap any blocking entity?
pub fn blocked(rect: &Rect, entities: &[Entity]) -> bool {
    entities
        .iter()
        .any(|e| e.kind.is_blocking() && geom::intersects(rect, &e.rect))
}

/// The one gate the gravity pass consults. See the truth table above.
pub fn gravity_suppressed(rect: &Rect, entities: &[Entity]) -> bool {
    standing_on_platform(rect, entities)
        || on_vine(rect, entities)
        || at_vine_top(rect, entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityKind;

    const T: f32 = 40.0;

    /// One tile-sized entity at grid position (col, row).
    fn tile(kind: EntityKind, col: usize, row: usize) -> Entity {
        Entity::new(kind, Rect::new(col as f32 * T, row as f32 * T, T, T))
    }

    fn body_at(col: usize, row: usize) -> Rect {
        Rect::new(col as f32 * T, row as f32 * T, T, T)
    }

    // ── Standing ──

    #[test]
    fn standing_detected_through_probe() {
        let world = vec![tile(EntityKind::Platform, 1, 2)];
        let p = body_at(1, 1); // resting exactly on the platform
        assert!(standing_on_platform(&p, &world));
        assert!(gravity_suppressed(&p, &world));
    }

    #[test]
    fn airborne_body_is_not_standing() {
        let world = vec![tile(EntityKind::Platform, 1, 3)];
        let p = body_at(1, 1); // a full tile of air below
        assert!(!standing_on_platform(&p, &world));
        assert!(!gravity_suppressed(&p, &world));
    }

    #[test]
    fn hovering_one_pixel_up_is_airborne() {
        let world = vec![tile(EntityKind::Platform, 1, 2)];
        let p = body_at(1, 1).shifted(0.0, -1.0);
        // the probe only reaches the platform's top edge: exclusive, no contact
        assert!(!standing_on_platform(&p, &world));
    }

    #[test]
    fn coin_underfoot_gives_no_support() {
        let world = vec![tile(EntityKind::Coin, 1, 2)];
        let p = body_at(1, 1);
        assert!(!standing_on_platform(&p, &world));
        assert!(!gravity_suppressed(&p, &world));
    }

    // ── Vines ──

    #[test]
    fn vine_overlap_suppresses_gravity() {
        let world = vec![tile(EntityKind::Vine, 3, 5)];
        let p = body_at(3, 5);
        assert!(on_vine(&p, &world));
        assert!(!at_vine_top(&p, &world));
        assert!(gravity_suppressed(&p, &world));
    }

    #[test]
    fn vine_top_standing() {
        let world = vec![tile(EntityKind::Vine, 3, 6)];
        let p = body_at(3, 5); // directly above the vine
        assert!(!on_vine(&p, &world));
        assert!(at_vine_top(&p, &world));
        assert!(gravity_suppressed(&p, &world));
    }

    #[test]
    fn far_vine_does_not_short_circuit_the_scan() {
        // A non-overlapping vine earlier in the list must not mask the
        // one the player is actually holding.
        let world = vec![
            tile(EntityKind::Vine, 10, 2),
            tile(EntityKind::Vine, 3, 5),
        ];
        let p = body_at(3, 5);
        assert!(on_vine(&p, &world));
        assert!(gravity_suppressed(&p, &world));
    }

    #[test]
    fn beside_a_vine_still_falls() {
        let world = vec![tile(EntityKind::Vine, 3, 5)];
        let p = body_at(5, 5);
        assert!(!on_vine(&p, &world));
        assert!(!at_vine_top(&p, &world));
        assert!(!gravity_suppressed(&p, &world));
    }

    // ── Blocking ──

    #[test]
    fn platform_blocks() {
        let world = vec![tile(EntityKind::Platform, 2, 2)];
        assert!(blocked(&body_at(2, 2), &world));
        assert!(!blocked(&body_at(4, 2), &world));
    }

    #[test]
    fn collectibles_vines_and_doors_never_block() {
        let world = vec![
            tile(EntityKind::Coin, 2, 2),
            tile(EntityKind::Life, 2, 2),
            tile(EntityKind::Vine, 2, 2),
            tile(EntityKind::Door, 2, 2),
        ];
        assert!(!blocked(&body_at(2, 2), &world));
    }

    #[test]
    fn adjacent_platform_does_not_block() {
        // sharing an edge is not an overlap
        let world = vec![tile(EntityKind::Platform, 3, 2)];
        assert!(!blocked(&body_at(2, 2), &world));
    }
}
