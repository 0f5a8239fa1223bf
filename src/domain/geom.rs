/// Axis-aligned rectangles and the overlap tests every physical
/// interaction goes through.
///
/// Two boundary rules coexist here, on purpose:
///
///   - `intersects` is EXCLUSIVE on edges: rectangles sharing only a
///     boundary line do not overlap. A player resting exactly on top of
///     a platform does not collide with it; support is detected by the
///     1 px probe in `rules`, which leans into this exclusivity.
///   - `point_in_rect` is INCLUSIVE on all four edges. Menu hit-testing
///     only, never gameplay collision.

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Copy of this rect displaced by (dx, dy). Candidate and probe
    /// construction both go through here.
    pub fn shifted(&self, dx: f32, dy: f32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

/// Exclusive-edge AABB overlap.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x + a.w > b.x && b.x + b.w > a.x && a.y + a.h > b.y && b.y + b.h > a.y
}

/// Inclusive point containment. UI hit-testing only.
pub fn point_in_rect(px: f32, py: f32, r: &Rect) -> bool {
    px >= r.x && px <= r.x + r.w && py >= r.y && py <= r.y + r.h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn overlapping_rects_intersect() {
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(20.0, 20.0, 40.0, 40.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn contained_rect_intersects() {
        let outer = r(0.0, 0.0, 100.0, 100.0);
        let inner = r(30.0, 30.0, 10.0, 10.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn disjoint_on_x_axis() {
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(100.0, 0.0, 40.0, 40.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn disjoint_on_y_axis() {
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(0.0, 100.0, 40.0, 40.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn edge_touch_horizontal_is_not_intersection() {
        // a's right edge exactly at b's left edge
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(40.0, 0.0, 40.0, 40.0);
        assert!(!intersects(&a, &b));
        // one sub-pixel of overlap flips it
        let c = r(39.5, 0.0, 40.0, 40.0);
        assert!(intersects(&a, &c));
    }

    #[test]
    fn edge_touch_vertical_is_not_intersection() {
        // a rests exactly on top of b
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(0.0, 40.0, 40.0, 40.0);
        assert!(!intersects(&a, &b));
        assert!(intersects(&a, &b.shifted(0.0, -0.5)));
    }

    #[test]
    fn corner_touch_is_not_intersection() {
        let a = r(0.0, 0.0, 40.0, 40.0);
        let b = r(40.0, 40.0, 40.0, 40.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn intersects_is_symmetric() {
        let cases = [
            (r(0.0, 0.0, 40.0, 40.0), r(20.0, 20.0, 40.0, 40.0)),
            (r(0.0, 0.0, 40.0, 40.0), r(40.0, 0.0, 40.0, 40.0)),
            (r(0.0, 0.0, 40.0, 40.0), r(500.0, 300.0, 40.0, 40.0)),
            (r(10.0, 10.0, 5.0, 5.0), r(0.0, 0.0, 100.0, 100.0)),
        ];
        for (a, b) in &cases {
            assert_eq!(intersects(a, b), intersects(b, a));
        }
    }

    #[test]
    fn point_in_rect_is_edge_inclusive() {
        let b = r(100.0, 200.0, 50.0, 30.0);
        // all four corners count as inside
        assert!(point_in_rect(100.0, 200.0, &b));
        assert!(point_in_rect(150.0, 200.0, &b));
        assert!(point_in_rect(100.0, 230.0, &b));
        assert!(point_in_rect(150.0, 230.0, &b));
        assert!(point_in_rect(125.0, 215.0, &b));
        // just past an edge is outside
        assert!(!point_in_rect(150.1, 215.0, &b));
        assert!(!point_in_rect(99.9, 215.0, &b));
        assert!(!point_in_rect(125.0, 230.1, &b));
    }

    #[test]
    fn shifted_moves_only_position() {
        let a = r(10.0, 20.0, 30.0, 40.0);
        let s = a.shifted(-5.0, 2.5);
        assert_eq!(s, r(5.0, 22.5, 30.0, 40.0));
    }
}
