/// Largest latitude magnitude accepted by the projection (degrees).
pub const MAX_LAT_DEG: f64 = 90.0;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    /// `(lambda, phi)` in radians with longitude wrapped to `[-180, 180]` and
    /// latitude clamped to the poles.
    pub fn to_radians(self) -> (f64, f64) {
        let lon = wrap_lon_deg(self.lon_deg);
        let lat = self.lat_deg.clamp(-MAX_LAT_DEG, MAX_LAT_DEG);
        (lon.to_radians(), lat.to_radians())
    }
}

/// Wraps a longitude into `[-180, 180]`. Exactly ±180 is preserved so the
/// antimeridian edge of the world outline stays on its own side.
pub fn wrap_lon_deg(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, wrap_lon_deg};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wraps_longitudes_outside_range() {
        assert_close(wrap_lon_deg(190.0), -170.0, 1e-12);
        assert_close(wrap_lon_deg(-190.0), 170.0, 1e-12);
        assert_close(wrap_lon_deg(180.0), 180.0, 1e-12);
        assert_close(wrap_lon_deg(540.0), 180.0, 1e-12);
    }

    #[test]
    fn clamps_latitude_to_poles() {
        let (_, phi) = GeoPoint::new(0.0, 95.0).to_radians();
        assert_close(phi, std::f64::consts::FRAC_PI_2, 1e-12);
    }
}
