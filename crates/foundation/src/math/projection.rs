use super::GeoPoint;

const NEWTON_EPS: f64 = 1e-6;
const NEWTON_MAX_ITERS: usize = 25;

/// Natural Earth I pseudo-cylindrical projection (polynomial form).
///
/// Works in radians on a unit sphere; `ScreenProjection` adds the pixel
/// scale and translation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct NaturalEarth;

impl NaturalEarth {
    pub fn forward(lambda: f64, phi: f64) -> [f64; 2] {
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        let x = lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
        let y = phi
            * (1.007226
                + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
        [x, y]
    }

    /// Inverse via Newton iteration on `y`. Returns `None` if `x`/`y` are
    /// outside the projected sphere.
    pub fn inverse(x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let mut phi = y;
        for _ in 0..NEWTON_MAX_ITERS {
            let phi2 = phi * phi;
            let phi4 = phi2 * phi2;
            let f = phi
                * (1.007226
                    + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)))
                - y;
            let df = 1.007226
                + phi2
                    * (0.015085 * 3.0
                        + phi4 * (-0.044475 * 7.0 + 0.028874 * 9.0 * phi2 - 0.005916 * 11.0 * phi4));
            let delta = f / df;
            phi -= delta;
            if delta.abs() <= NEWTON_EPS {
                break;
            }
        }
        if phi.abs() > std::f64::consts::FRAC_PI_2 + NEWTON_EPS {
            return None;
        }
        let phi2 = phi * phi;
        let denom = 0.8707
            + phi2 * (-0.131979 + phi2 * (-0.013791 + phi2 * phi2 * phi2 * (0.003971 - 0.001529 * phi2)));
        let lambda = x / denom;
        if lambda.abs() > std::f64::consts::PI + NEWTON_EPS {
            return None;
        }
        Some((lambda, phi))
    }
}

/// Natural Earth projection fitted to a pixel viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenProjection {
    /// Pixels per unit of the raw projection.
    pub scale: f64,
    /// Screen position of `(lon 0, lat 0)`.
    pub translate: [f64; 2],
}

impl ScreenProjection {
    /// Scale proportional to `min(width, height)`, centred in the viewport.
    pub fn fit(width: f64, height: f64) -> Self {
        let scale = width.min(height) / (2.0 * std::f64::consts::PI) * 1.2;
        Self {
            scale,
            translate: [width / 2.0, height / 2.0],
        }
    }

    pub fn project(&self, point: GeoPoint) -> [f64; 2] {
        let (lambda, phi) = point.to_radians();
        let [x, y] = NaturalEarth::forward(lambda, phi);
        [
            self.translate[0] + self.scale * x,
            self.translate[1] - self.scale * y,
        ]
    }

    pub fn invert(&self, screen: [f64; 2]) -> Option<GeoPoint> {
        if self.scale <= 0.0 {
            return None;
        }
        let x = (screen[0] - self.translate[0]) / self.scale;
        let y = (self.translate[1] - screen[1]) / self.scale;
        let (lambda, phi) = NaturalEarth::inverse(x, y)?;
        Some(GeoPoint::new(lambda.to_degrees(), phi.to_degrees()))
    }
}
