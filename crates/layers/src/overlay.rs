//! Point overlays drawn above the choropleth.

use std::collections::HashMap;
use std::fmt;

use catalog::{ComputeSites, SafetyFootprint, SafetyPresence};
use scene::{GeometryProjector, Iso3, IsoResolver, World};

use crate::symbology::{Color, MarkerStyle};

pub const COMPUTE_MIN_RADIUS: f64 = 2.5;
pub const COMPUTE_MAX_RADIUS: f64 = 7.0;

const SAFETY_STYLE: MarkerStyle = MarkerStyle::new(
    Color::rgba(212, 163, 115, 0.8),
    Color::rgba(255, 255, 255, 0.5),
    1.0,
);
const OPERATIONAL_STYLE: MarkerStyle = MarkerStyle::new(
    Color::rgba(124, 176, 138, 0.9),
    Color::rgba(255, 255, 255, 0.7),
    1.5,
);
const PLANNED_STYLE: MarkerStyle = MarkerStyle::new(
    Color::TRANSPARENT,
    Color::rgba(212, 163, 115, 0.9),
    1.5,
);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayKind {
    Safety,
    Compute,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 2] = [OverlayKind::Safety, OverlayKind::Compute];
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverlayKind::Safety => "safety",
            OverlayKind::Compute => "compute",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub iso3: Iso3,
    pub center: [f64; 2],
    pub radius: f64,
    pub style: MarkerStyle,
    pub title: Option<String>,
}

pub fn safety_radius(level: SafetyPresence) -> f64 {
    match level {
        SafetyPresence::High => 5.0,
        SafetyPresence::Medium => 3.5,
        SafetyPresence::Low => 2.5,
    }
}

/// `ln(1 + MW)` clamped to the marker size range.
pub fn compute_radius(mw: f64) -> f64 {
    let r = mw.max(0.0).ln_1p();
    if r.is_finite() {
        r.clamp(COMPUTE_MIN_RADIUS, COMPUTE_MAX_RADIUS)
    } else {
        COMPUTE_MAX_RADIUS
    }
}

/// Screen anchor per country: the projected centroid of the first feature
/// that resolves to it.
#[derive(Debug, Clone, Default)]
pub struct FeatureAnchors {
    by_iso: HashMap<Iso3, [f64; 2]>,
}

impl FeatureAnchors {
    pub fn build(world: &World, resolver: &IsoResolver, projector: &GeometryProjector) -> Self {
        let mut by_iso = HashMap::new();
        for (_, feature) in world.iter() {
            let iso3 = resolver.resolve(feature);
            if !iso3.is_resolved() || by_iso.contains_key(&iso3) {
                continue;
            }
            if let Some(c) = projector.centroid(&feature.geometry) {
                by_iso.insert(iso3, c);
            }
        }
        Self { by_iso }
    }

    pub fn get(&self, iso3: &Iso3) -> Option<[f64; 2]> {
        self.by_iso.get(iso3).copied()
    }

    pub fn len(&self) -> usize {
        self.by_iso.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_iso.is_empty()
    }
}

/// One marker per country with a presence level, in code order.
pub fn safety_markers(footprint: &SafetyFootprint, anchors: &FeatureAnchors) -> Vec<Marker> {
    footprint
        .levels
        .iter()
        .filter_map(|(iso3, level)| {
            Some(Marker {
                iso3: iso3.clone(),
                center: anchors.get(iso3)?,
                radius: safety_radius(*level),
                style: SAFETY_STYLE,
                title: None,
            })
        })
        .collect()
}

/// One marker per site, stacked on its country's anchor.
pub fn compute_markers(sites: &ComputeSites, anchors: &FeatureAnchors) -> Vec<Marker> {
    sites
        .sites
        .iter()
        .filter_map(|site| {
            Some(Marker {
                iso3: site.iso3.clone(),
                center: anchors.get(&site.iso3)?,
                radius: compute_radius(site.mw),
                style: if site.is_operational() {
                    OPERATIONAL_STYLE
                } else {
                    PLANNED_STYLE
                },
                title: Some(format!("{} • {} MW • {}", site.site_name, site.mw, site.status)),
            })
        })
        .collect()
}

/// Toggle state and drawn markers for both overlays.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    safety: OverlayLayer,
    compute: OverlayLayer,
}

#[derive(Debug, Clone, Default)]
struct OverlayLayer {
    enabled: bool,
    markers: Vec<Marker>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    fn layer(&self, kind: OverlayKind) -> &OverlayLayer {
        match kind {
            OverlayKind::Safety => &self.safety,
            OverlayKind::Compute => &self.compute,
        }
    }

    fn layer_mut(&mut self, kind: OverlayKind) -> &mut OverlayLayer {
        match kind {
            OverlayKind::Safety => &mut self.safety,
            OverlayKind::Compute => &mut self.compute,
        }
    }

    pub fn is_enabled(&self, kind: OverlayKind) -> bool {
        self.layer(kind).enabled
    }

    /// Turning an overlay off drops every marker it drew.
    pub fn set_enabled(&mut self, kind: OverlayKind, enabled: bool) {
        let layer = self.layer_mut(kind);
        layer.enabled = enabled;
        if !enabled {
            layer.markers.clear();
        }
    }

    /// Replaces the drawn markers. Ignored while the overlay is off.
    pub fn draw(&mut self, kind: OverlayKind, markers: Vec<Marker>) {
        let layer = self.layer_mut(kind);
        if layer.enabled {
            layer.markers = markers;
        }
    }

    /// Removes drawn markers but keeps the toggle.
    pub fn clear(&mut self, kind: OverlayKind) {
        self.layer_mut(kind).markers.clear();
    }

    pub fn clear_all(&mut self) {
        for kind in OverlayKind::ALL {
            self.clear(kind);
        }
    }

    pub fn markers(&self, kind: OverlayKind) -> &[Marker] {
        &self.layer(kind).markers
    }
}

#[cfg(test)]
mod tests {
    use super::{
        COMPUTE_MAX_RADIUS, COMPUTE_MIN_RADIUS, FeatureAnchors, OverlayKind, OverlaySet,
        compute_markers, compute_radius, safety_markers, safety_radius,
    };
    use catalog::{ComputeSites, SafetyFootprint, SafetyPresence};
    use foundation::math::GeoPoint;
    use scene::{
        CountryFeature, Geometry, GeometryProjector, IsoResolver, ViewportSize, World,
    };
    use serde_json::json;

    fn world() -> World {
        let square = |lon: f64, lat: f64| {
            Geometry::Polygon(vec![vec![
                GeoPoint::new(lon, lat),
                GeoPoint::new(lon + 5.0, lat),
                GeoPoint::new(lon + 5.0, lat + 5.0),
                GeoPoint::new(lon, lat + 5.0),
                GeoPoint::new(lon, lat),
            ]])
        };
        let props = |name: &str| json!({ "name": name }).as_object().cloned().unwrap_or_default();
        World::from_features(vec![
            CountryFeature::new(None, props("United States"), square(-100.0, 35.0)),
            CountryFeature::new(None, props("United Kingdom"), square(-3.0, 52.0)),
        ])
    }

    fn anchors() -> FeatureAnchors {
        let projector = GeometryProjector::new(ViewportSize::new(960.0, 500.0));
        FeatureAnchors::build(&world(), &IsoResolver::new(), &projector)
    }

    fn sites() -> ComputeSites {
        ComputeSites::from_json_str(
            "sites.json",
            r#"[
                {"iso3": "USA", "mw": 1000, "status": "operational", "site_name": "North"},
                {"iso3": "USA", "mw": 2, "status": "planned", "site_name": "South"},
                {"iso3": "NZL", "mw": 50, "status": "operational", "site_name": "Far"}
            ]"#,
        )
        .expect("valid json")
    }

    #[test]
    fn radii_follow_levels_and_capacity() {
        assert_eq!(safety_radius(SafetyPresence::High), 5.0);
        assert_eq!(safety_radius(SafetyPresence::Medium), 3.5);
        assert_eq!(safety_radius(SafetyPresence::Low), 2.5);
        assert_eq!(compute_radius(0.0), COMPUTE_MIN_RADIUS);
        assert_eq!(compute_radius(1e9), COMPUTE_MAX_RADIUS);
        assert!((compute_radius(100.0) - 101f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn compute_markers_skip_countries_without_geometry() {
        let markers = compute_markers(&sites(), &anchors());
        assert_eq!(markers.len(), 2);
        assert!(markers[0].style.fill.a > 0.0);
        assert!(markers[1].style.fill.is_transparent());
        assert_eq!(markers[0].title.as_deref(), Some("North • 1000 MW • operational"));
    }

    #[test]
    fn safety_markers_use_presence_radius() {
        let fp = SafetyFootprint::from_json_str("s.json", r#"{"GBR": "L", "USA": "none"}"#)
            .expect("valid json");
        let markers = safety_markers(&fp, &anchors());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].radius, 5.0);
    }

    #[test]
    fn disabling_overlay_removes_every_marker() {
        let mut overlays = OverlaySet::new();
        overlays.set_enabled(OverlayKind::Compute, true);
        overlays.draw(OverlayKind::Compute, compute_markers(&sites(), &anchors()));
        assert_eq!(overlays.markers(OverlayKind::Compute).len(), 2);

        overlays.set_enabled(OverlayKind::Compute, false);
        assert_eq!(overlays.markers(OverlayKind::Compute).len(), 0);

        overlays.draw(OverlayKind::Compute, compute_markers(&sites(), &anchors()));
        assert_eq!(overlays.markers(OverlayKind::Compute).len(), 0);
    }
}
