use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Index of a feature inside its [`crate::World`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub u32);

impl FeatureId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Placeholder shown when a feature carries no usable name.
pub const FALLBACK_COUNTRY_NAME: &str = "Country";

/// A country outline with its source properties. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Opaque identifier from the source collection (string or number).
    pub source_id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl CountryFeature {
    pub fn new(source_id: Option<String>, properties: Map<String, Value>, geometry: Geometry) -> Self {
        Self {
            source_id,
            properties,
            geometry,
        }
    }

    /// Raw display name: `name`, then `ADMIN`.
    pub fn raw_name(&self) -> Option<&str> {
        ["name", "ADMIN"]
            .iter()
            .filter_map(|key| self.properties.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.raw_name().unwrap_or(FALLBACK_COUNTRY_NAME)
    }

    /// Candidate embedded codes in priority order: `ISO_A3`, `iso_a3`, then
    /// the feature id. Numeric values are stringified.
    pub fn embedded_codes(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(3);
        for key in ["ISO_A3", "iso_a3"] {
            match self.properties.get(key) {
                Some(Value::String(s)) => out.push(s.clone()),
                Some(Value::Number(n)) => out.push(n.to_string()),
                _ => {}
            }
        }
        if let Some(id) = &self.source_id {
            out.push(id.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryFeature, FALLBACK_COUNTRY_NAME};
    use crate::geometry::Geometry;
    use serde_json::{Map, Value, json};

    fn props(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn name_prefers_name_over_admin() {
        let f = CountryFeature::new(
            None,
            props(json!({"ADMIN": "France (admin)", "name": "France"})),
            Geometry::Sphere,
        );
        assert_eq!(f.raw_name(), Some("France"));
    }

    #[test]
    fn blank_name_falls_back() {
        let f = CountryFeature::new(None, props(json!({"name": "  "})), Geometry::Sphere);
        assert_eq!(f.raw_name(), None);
        assert_eq!(f.display_name(), FALLBACK_COUNTRY_NAME);
    }

    #[test]
    fn embedded_codes_in_priority_order() {
        let f = CountryFeature::new(
            Some("FRA".into()),
            props(json!({"ISO_A3": "-99", "iso_a3": 250})),
            Geometry::Sphere,
        );
        assert_eq!(f.embedded_codes(), vec!["-99", "250", "FRA"]);
    }
}
