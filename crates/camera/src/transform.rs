use foundation::Aabb2;

/// Screen-space zoom transform: a point `p` is drawn at `p * k + (x, y)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub const fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [p[0] * self.k + self.x, p[1] * self.k + self.y]
    }

    pub fn invert(&self, p: [f64; 2]) -> [f64; 2] {
        [(p[0] - self.x) / self.k, (p[1] - self.y) / self.k]
    }

    /// Moves the content by `(dx, dy)` in untransformed units.
    pub fn translate_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + self.k * dx, self.y + self.k * dy, self.k)
    }

    /// Sets the scale while keeping the content under `anchor` in place.
    pub fn scale_to(&self, k: f64, anchor: [f64; 2]) -> Self {
        let p0 = self.invert(anchor);
        Self::new(anchor[0] - p0[0] * k, anchor[1] - p0[1] * k, k)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite()
    }
}

/// Allowed zoom range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self { min: 1.0, max: 18.0 }
    }
}

impl ScaleExtent {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, k: f64) -> f64 {
        k.clamp(self.min, self.max)
    }
}

/// Keeps `translate_extent` covering the viewport as well as possible: when
/// the extent is smaller than the viewport along an axis it is centred,
/// otherwise the nearest edge is pulled back into view.
pub fn constrain(t: ViewTransform, viewport: Aabb2, translate_extent: Aabb2) -> ViewTransform {
    let lo = t.invert(viewport.min);
    let hi = t.invert(viewport.max);
    let dx0 = lo[0] - translate_extent.min[0];
    let dx1 = hi[0] - translate_extent.max[0];
    let dy0 = lo[1] - translate_extent.min[1];
    let dy1 = hi[1] - translate_extent.max[1];
    t.translate_by(axis_shift(dx0, dx1), axis_shift(dy0, dy1))
}

fn axis_shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ScaleExtent, ViewTransform, constrain};
    use foundation::Aabb2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn scale_to_keeps_anchor_fixed() {
        let t = ViewTransform::new(30.0, -20.0, 2.0);
        let anchor = [400.0, 250.0];
        let before = t.invert(anchor);
        let zoomed = t.scale_to(5.0, anchor);
        let after = zoomed.invert(anchor);
        assert_close(before[0], after[0], 1e-9);
        assert_close(before[1], after[1], 1e-9);
        assert_eq!(zoomed.k, 5.0);
    }

    #[test]
    fn translate_by_is_scaled() {
        let t = ViewTransform::new(0.0, 0.0, 4.0).translate_by(10.0, 0.0);
        assert_eq!(t, ViewTransform::new(40.0, 0.0, 4.0));
    }

    #[test]
    fn small_extent_is_centred() {
        let viewport = Aabb2::new([0.0, 0.0], [960.0, 500.0]);
        let extent = Aabb2::new([119.0, 10.0], [841.0, 490.0]);
        let t = constrain(ViewTransform::new(200.0, -50.0, 1.0), viewport, extent);
        assert_close(t.x, 0.0, 1e-9);
        assert_close(t.y, 0.0, 1e-9);
    }

    #[test]
    fn zoomed_view_cannot_leave_extent() {
        let viewport = Aabb2::new([0.0, 0.0], [960.0, 500.0]);
        let extent = Aabb2::new([0.0, 0.0], [960.0, 500.0]);
        // Panned far right at 2x: the left edge of the extent would show a gap.
        let t = constrain(ViewTransform::new(300.0, 0.0, 2.0), viewport, extent);
        assert_close(t.x, 0.0, 1e-9);
        // Panned far left: the right edge is pulled back.
        let t = constrain(ViewTransform::new(-5000.0, 0.0, 2.0), viewport, extent);
        assert_close(t.x, -960.0, 1e-9);
        // Inside: untouched.
        let t = constrain(ViewTransform::new(-100.0, -100.0, 2.0), viewport, extent);
        assert_eq!(t, ViewTransform::new(-100.0, -100.0, 2.0));
    }

    #[test]
    fn scale_extent_clamps() {
        let e = ScaleExtent::default();
        assert_eq!(e.clamp(0.2), 1.0);
        assert_eq!(e.clamp(40.0), 18.0);
        assert_eq!(ScaleExtent::new(5.0, 2.0).min, 2.0);
    }
}
