/// Axis-aligned bounding box in screen space.
///
/// `min` is the top-left corner and `max` the bottom-right corner (screen `y`
/// grows downwards).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest box containing every finite point, or `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut out: Option<Self> = None;
        for p in points {
            if !p[0].is_finite() || !p[1].is_finite() {
                continue;
            }
            out = Some(match out {
                None => Aabb2::new(p, p),
                Some(b) => b.expand_to(p),
            });
        }
        out
    }

    pub fn expand_to(self, p: [f64; 2]) -> Self {
        Aabb2::new(
            [self.min[0].min(p[0]), self.min[1].min(p[1])],
            [self.max[0].max(p[0]), self.max[1].max(p[1])],
        )
    }

    pub fn union(self, other: Self) -> Self {
        self.expand_to(other.min).expand_to(other.max)
    }

    /// Grows the box by `pad` on every side.
    pub fn padded(self, pad: f64) -> Self {
        Aabb2::new(
            [self.min[0] - pad, self.min[1] - pad],
            [self.max[0] + pad, self.max[1] + pad],
        )
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn from_points_skips_non_finite() {
        let b = Aabb2::from_points([[1.0, 2.0], [f64::NAN, 0.0], [-3.0, 5.0]]).unwrap();
        assert_eq!(b, Aabb2::new([-3.0, 2.0], [1.0, 5.0]));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb2::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn padded_grows_every_side() {
        let b = Aabb2::new([0.0, 0.0], [10.0, 20.0]).padded(100.0);
        assert_eq!(b.min, [-100.0, -100.0]);
        assert_eq!(b.max, [110.0, 120.0]);
        assert_eq!(b.center(), [5.0, 10.0]);
    }
}
