use std::fmt::Write as _;

use foundation::Aabb2;
use foundation::math::{GeoPoint, ScreenProjection};

use crate::geometry::{Geometry, Ring};

/// Radius used when drawing point geometries.
pub const POINT_RADIUS: f64 = 4.5;

/// Pixel size of the map container.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_dim(width),
            height: sanitize_dim(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

fn sanitize_dim(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// SVG path data for one drawn feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathData(pub String);

impl PathData {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PathData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts geographic coordinates to screen space for the current
/// container size.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryProjector {
    size: ViewportSize,
    projection: ScreenProjection,
}

impl GeometryProjector {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            projection: ScreenProjection::fit(size.width, size.height),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn projection(&self) -> ScreenProjection {
        self.projection
    }

    /// Refits the projection. Returns `false` when the size is unchanged.
    pub fn resize(&mut self, size: ViewportSize) -> bool {
        if size == self.size {
            return false;
        }
        *self = Self::new(size);
        true
    }

    pub fn project(&self, lon: f64, lat: f64) -> [f64; 2] {
        self.projection.project(GeoPoint::new(lon, lat))
    }

    pub fn project_point(&self, p: GeoPoint) -> [f64; 2] {
        self.projection.project(p)
    }

    pub fn invert(&self, x: f64, y: f64) -> Option<GeoPoint> {
        self.projection.invert([x, y])
    }

    pub fn path_for(&self, geometry: &Geometry) -> PathData {
        let mut out = String::new();
        match geometry {
            Geometry::Point(p) => self.write_circle(&mut out, *p),
            Geometry::MultiPoint(ps) => {
                for p in ps {
                    self.write_circle(&mut out, *p);
                }
            }
            Geometry::LineString(line) => self.write_ring(&mut out, line, false),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.write_ring(&mut out, line, false);
                }
            }
            Geometry::Polygon(rings) => {
                for ring in rings {
                    self.write_ring(&mut out, ring, true);
                }
            }
            Geometry::MultiPolygon(polys) => {
                for ring in polys.iter().flatten() {
                    self.write_ring(&mut out, ring, true);
                }
            }
            Geometry::Sphere => {
                let outline = sphere_outline();
                self.write_ring(&mut out, &outline, true);
            }
        }
        PathData(out)
    }

    /// Screen-space bounding box; `None` for geometries with no finite vertex.
    pub fn bounds(&self, geometry: &Geometry) -> Option<Aabb2> {
        match geometry {
            Geometry::Point(p) => {
                Aabb2::from_points([self.project_point(*p)])
            }
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => {
                Aabb2::from_points(self.projected(ps))
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                Aabb2::from_points(lines.iter().flat_map(|l| self.projected(l)))
            }
            Geometry::MultiPolygon(polys) => Aabb2::from_points(
                polys.iter().flatten().flat_map(|l| self.projected(l)),
            ),
            Geometry::Sphere => Some(self.sphere_bounds()),
        }
    }

    /// Planar area-weighted centroid of the projected polygons. Holes
    /// subtract from their polygon. Falls back to the bounds centre when the
    /// total area is degenerate.
    pub fn centroid(&self, geometry: &Geometry) -> Option<[f64; 2]> {
        let mut area_sum = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for rings in geometry.polygons() {
            for (idx, ring) in rings.iter().enumerate() {
                let pts: Vec<[f64; 2]> = self.projected(ring).collect();
                let (a, x, y) = ring_moments(&pts);
                let weight = if idx == 0 { 1.0 } else { -1.0 };
                area_sum += weight * a.abs();
                cx += weight * a.abs() * x;
                cy += weight * a.abs() * y;
            }
        }
        if area_sum > 1e-9 {
            return Some([cx / area_sum, cy / area_sum]);
        }
        self.bounds(geometry).map(|b| b.center())
    }

    /// Projected outline of the whole globe.
    pub fn sphere_bounds(&self) -> Aabb2 {
        let fallback = Aabb2::new(self.size.center(), self.size.center());
        Aabb2::from_points(self.projected(&sphere_outline())).unwrap_or(fallback)
    }

    fn projected<'a>(&'a self, ring: &'a [GeoPoint]) -> impl Iterator<Item = [f64; 2]> + 'a {
        ring.iter()
            .filter(|p| p.is_finite())
            .map(move |p| self.project_point(*p))
    }

    fn write_ring(&self, out: &mut String, ring: &Ring, close: bool) {
        let mut first = true;
        for [x, y] in self.projected(ring) {
            let cmd = if first { 'M' } else { 'L' };
            first = false;
            let _ = write!(out, "{cmd}{x:.2},{y:.2}");
        }
        if close && !first {
            out.push('Z');
        }
    }

    fn write_circle(&self, out: &mut String, p: GeoPoint) {
        if !p.is_finite() {
            return;
        }
        let [x, y] = self.project_point(p);
        let r = POINT_RADIUS;
        let _ = write!(
            out,
            "M{x:.2},{top:.2}a{r},{r} 0 1,1 0,{d}a{r},{r} 0 1,1 0,-{d}Z",
            top = y - r,
            d = 2.0 * r,
        );
    }
}

/// Signed area and centroid of a closed ring (shoelace).
fn ring_moments(pts: &[[f64; 2]]) -> (f64, f64, f64) {
    if pts.len() < 3 {
        return (0.0, 0.0, 0.0);
    }
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..pts.len() {
        let [x0, y0] = pts[i];
        let [x1, y1] = pts[(i + 1) % pts.len()];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    let area = a / 2.0;
    if area.abs() < 1e-12 {
        return (0.0, 0.0, 0.0);
    }
    (area, cx / (6.0 * area), cy / (6.0 * area))
}

/// Globe boundary: the antimeridian on the west edge going north, then on
/// the east edge going south, sampled every degree.
fn sphere_outline() -> Ring {
    let mut ring = Vec::with_capacity(362);
    for lat in -90..=90 {
        ring.push(GeoPoint::new(-180.0, lat as f64));
    }
    for lat in (-90..=90).rev() {
        ring.push(GeoPoint::new(180.0, lat as f64));
    }
    ring
}
