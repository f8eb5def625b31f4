use foundation::math::GeoPoint;
use scene::{CountryFeature, Geometry, Ring, World};
use serde_json::Value;

#[derive(Debug)]
pub enum GeoJsonError {
    Parse(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Parse(reason) => write!(f, "JSON parse error: {reason}"),
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// Country outlines parsed from a GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCollection {
    pub features: Vec<CountryFeature>,
    /// Features dropped because they had a `null` geometry.
    pub skipped: usize,
}

impl CountryCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| GeoJsonError::Parse(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0;
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| GeoJsonError::InvalidFeature { index, reason };
            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;
            match feat_obj.get("type").and_then(|v| v.as_str()) {
                Some("Feature") => {}
                Some(other) => return Err(invalid(format!("unexpected feature type: {other}"))),
                None => return Err(invalid("feature missing type".to_string())),
            }

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry = match feat_obj.get("geometry") {
                Some(Value::Null) => {
                    skipped += 1;
                    tracing::debug!(index, "skipping feature with null geometry");
                    continue;
                }
                Some(g) => parse_geometry(g).map_err(invalid)?,
                None => return Err(invalid("feature missing geometry".to_string())),
            };

            features.push(CountryFeature::new(id, properties, geometry));
        }

        Ok(Self { features, skipped })
    }

    pub fn into_world(self) -> World {
        World::from_features(self.features)
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    if ty == "Sphere" {
        return Ok(Geometry::Sphere);
    }
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_ring(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_ring(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            polys.iter().map(parse_rings).collect::<Result<_, _>>().map(Geometry::MultiPolygon)
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    match (arr.first().and_then(Value::as_f64), arr.get(1).and_then(Value::as_f64)) {
        (Some(lon), Some(lat)) => Ok(GeoPoint::new(lon, lat)),
        _ => Err("position must have numeric [lon, lat]".to_string()),
    }
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Ring>, String> {
    coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?
        .iter()
        .map(parse_ring)
        .collect()
}
