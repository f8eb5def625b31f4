use foundation::math::GeoPoint;

/// One closed (or open, for lines) sequence of positions.
pub type Ring = Vec<GeoPoint>;

/// Geographic geometry of a map feature, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Ring),
    MultiLineString(Vec<Ring>),
    /// Outer ring followed by holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// The whole globe; drawn as the projection outline.
    Sphere,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Area,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => GeometryKind::Line,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Sphere => {
                GeometryKind::Area
            }
        }
    }

    /// Polygons of an area geometry (empty for points, lines and the sphere).
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.len(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|p| p.iter())
                .map(Vec::len)
                .sum(),
            Geometry::Sphere => 0,
        }
    }
}

/// Meridians and parallels every `step_deg` degrees (parallels stop short of
/// the poles at ±80°, as a 10° graticule does).
pub fn graticule(step_deg: f64) -> Geometry {
    let step = if step_deg > 0.0 { step_deg } else { 10.0 };
    let mut lines: Vec<Ring> = Vec::new();

    let mut lon = -180.0;
    while lon <= 180.0 + 1e-9 {
        let mut line = Vec::new();
        let mut lat = -80.0;
        while lat <= 80.0 + 1e-9 {
            line.push(GeoPoint::new(lon, lat));
            lat += 2.5;
        }
        lines.push(line);
        lon += step;
    }

    let mut lat = -80.0;
    while lat <= 80.0 + 1e-9 {
        let mut line = Vec::new();
        let mut lon = -180.0;
        while lon <= 180.0 + 1e-9 {
            line.push(GeoPoint::new(lon, lat));
            lon += 2.5;
        }
        lines.push(line);
        lat += step;
    }

    Geometry::MultiLineString(lines)
}
