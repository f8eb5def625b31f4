use std::sync::Arc;
use std::time::Duration;

use formats::{CompositeTable, CountryCollection};
use scene::{AliasTable, World};
use serde::{Deserialize, Serialize};

use crate::datasets::{
    CompositeDataset, CompositeFormat, ComputeSites, DatasetBundle, IndicatorDataset,
    SafetyFootprint, aliases_from_json_str, country_meta_from_json_str, endonyms_from_json_str,
};
use crate::error::CatalogError;
use crate::source::DataSource;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Relative locations of every input, resolved against a [`DataSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLocations {
    pub world: String,
    pub aliases: String,
    pub aliases_ext: String,
    pub readiness: String,
    pub exposure: String,
    pub grid_headroom: String,
    pub safety: String,
    pub compute_sites: String,
    pub country_meta: String,
    pub endonyms: String,
    pub composite_csv: String,
    pub composite_json: String,
}

impl Default for DatasetLocations {
    fn default() -> Self {
        Self {
            world: "data/world.geojson".into(),
            aliases: "data/aliases.json".into(),
            aliases_ext: "data/aliases_ext.json".into(),
            readiness: "data/readiness.json".into(),
            exposure: "data/exposure.json".into(),
            grid_headroom: "data/grid_headroom.json".into(),
            safety: "data/safety_footprint.json".into(),
            compute_sites: "data/compute_sites.json".into(),
            country_meta: "data/g20_meta.json".into(),
            endonyms: "data/endonyms.json".into(),
            composite_csv: "data/oxford_readiness_2024_long_iso3.csv".into(),
            composite_json: "data/oxford_readiness_2024.json".into(),
        }
    }
}

/// Loads geometry and datasets through one [`DataSource`], each fetch
/// bounded by the same timeout.
#[derive(Clone)]
pub struct DatasetLoader {
    source: Arc<dyn DataSource>,
    timeout: Duration,
    locations: DatasetLocations,
}

impl std::fmt::Debug for DatasetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetLoader")
            .field("source", &self.source.describe())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DatasetLoader {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_LOAD_TIMEOUT,
            locations: DatasetLocations::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_locations(mut self, locations: DatasetLocations) -> Self {
        self.locations = locations;
        self
    }

    pub fn locations(&self) -> &DatasetLocations {
        &self.locations
    }

    pub async fn fetch_text(&self, location: &str) -> Result<String, CatalogError> {
        let bytes = tokio::time::timeout(self.timeout, self.source.fetch(location))
            .await
            .map_err(|_| CatalogError::Timeout {
                location: location.to_string(),
                after_ms: self.timeout.as_millis() as u64,
            })??;
        String::from_utf8(bytes).map_err(|e| CatalogError::corrupt(location, e))
    }

    /// Country outlines. Failure here is fatal for the render attempt.
    pub async fn load_world(&self) -> Result<World, CatalogError> {
        let location = &self.locations.world;
        let text = self.fetch_text(location).await?;
        let collection = CountryCollection::from_geojson_str(&text)
            .map_err(|e| CatalogError::corrupt(location, e))?;
        if collection.skipped > 0 {
            tracing::debug!(skipped = collection.skipped, "features without geometry dropped");
        }
        tracing::info!(features = collection.features.len(), "world geometry loaded");
        Ok(collection.into_world())
    }

    async fn optional<T, F>(&self, location: &str, parse: F) -> Option<T>
    where
        F: FnOnce(&str, &str) -> Result<T, CatalogError>,
    {
        let result = match self.fetch_text(location).await {
            Ok(text) => parse(location, &text),
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(location, %error, "dataset unavailable");
                None
            }
        }
    }

    /// Tabular form first, structured form second.
    pub async fn load_composite(&self) -> Option<CompositeDataset> {
        let csv = self
            .optional(&self.locations.composite_csv, |loc, text| {
                CompositeTable::from_csv_str(text).map_err(|e| CatalogError::corrupt(loc, e))
            })
            .await;
        if let Some(table) = csv {
            tracing::info!(rows = table.rows.len(), skipped = table.skipped, "composite source: CSV");
            return Some(CompositeDataset {
                table,
                format: CompositeFormat::Csv,
            });
        }
        let table = self
            .optional(&self.locations.composite_json, |loc, text| {
                CompositeTable::from_json_str(text).map_err(|e| CatalogError::corrupt(loc, e))
            })
            .await?;
        tracing::info!(rows = table.rows.len(), "composite source: JSON");
        Some(CompositeDataset {
            table,
            format: CompositeFormat::Json,
        })
    }

    /// Every non-geometry dataset, fetched concurrently. Failures leave the
    /// corresponding field empty.
    pub async fn load_bundle(&self) -> DatasetBundle {
        let loc = &self.locations;
        let (aliases, aliases_ext, readiness, exposure, grid, safety, compute, meta, endonyms, composite) =
            futures_util::join!(
                self.optional(&loc.aliases, aliases_from_json_str),
                self.optional(&loc.aliases_ext, aliases_from_json_str),
                self.optional(&loc.readiness, IndicatorDataset::from_json_str),
                self.optional(&loc.exposure, IndicatorDataset::from_json_str),
                self.optional(&loc.grid_headroom, IndicatorDataset::from_json_str),
                self.optional(&loc.safety, SafetyFootprint::from_json_str),
                self.optional(&loc.compute_sites, ComputeSites::from_json_str),
                self.optional(&loc.country_meta, country_meta_from_json_str),
                self.optional(&loc.endonyms, endonyms_from_json_str),
                self.load_composite(),
            );

        let aliases = AliasTable::merged(aliases.into_iter().chain(aliases_ext));
        let bundle = DatasetBundle {
            aliases,
            readiness,
            exposure,
            grid_headroom: grid,
            safety,
            composite,
            endonyms: endonyms.unwrap_or_default(),
            country_meta: meta.unwrap_or_default(),
            ..DatasetBundle::default()
        };
        let bundle = match compute {
            Some(sites) => bundle.with_compute_sites(sites),
            None => bundle,
        };
        tracing::debug!(aliases = bundle.aliases.len(), "datasets loaded");
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetLoader, DatasetLocations};
    use crate::datasets::CompositeFormat;
    use crate::error::CatalogError;
    use crate::source::InMemorySource;
    use formats::CompositeMetric;
    use scene::Iso3;
    use std::sync::Arc;
    use std::time::Duration;

    fn iso(code: &str) -> Iso3 {
        Iso3::parse(code).expect("valid code")
    }

    #[tokio::test]
    async fn partial_failures_leave_other_datasets_loaded() {
        let source = InMemorySource::new()
            .with_file("data/readiness.json", r#"{"USA": 80}"#)
            .with_file("data/exposure.json", "{ not json")
            .with_file("data/aliases.json", r#"{"Holland": "NLD", "Burma": "MMR"}"#)
            .with_file("data/aliases_ext.json", r#"{"holland": "NLX"}"#)
            .with_file(
                "data/compute_sites.json",
                r#"[{"iso3": "USA", "mw": 100, "status": "operational", "site_name": "A"}]"#,
            );
        let loader = DatasetLoader::new(Arc::new(source));
        let bundle = loader.load_bundle().await;

        assert_eq!(bundle.readiness.as_ref().and_then(|d| d.get(&iso("USA"))), Some(80.0));
        assert!(bundle.exposure.is_none());
        assert!(bundle.grid_headroom.is_none());
        assert!(bundle.composite.is_none());
        assert_eq!(bundle.aliases.get("holland"), Some(&iso("NLX")));
        assert_eq!(bundle.aliases.get("burma"), Some(&iso("MMR")));
        assert_eq!(
            bundle.compute_mw.as_ref().and_then(|d| d.get(&iso("USA"))),
            Some(100.0)
        );
    }

    #[tokio::test]
    async fn composite_prefers_csv() {
        let source = InMemorySource::new()
            .with_file(
                "data/oxford_readiness_2024_long_iso3.csv",
                "iso3,metric,value\nUSA,overall,87\n",
            )
            .with_file("data/oxford_readiness_2024.json", r#"{"USA": {"overall": 1}}"#);
        let loader = DatasetLoader::new(Arc::new(source));
        let composite = loader.load_composite().await.expect("composite");
        assert_eq!(composite.format, CompositeFormat::Csv);
        assert_eq!(
            composite.metric(CompositeMetric::Overall).get(&iso("USA")),
            Some(87.0)
        );
    }

    #[tokio::test]
    async fn composite_falls_back_to_json() {
        let source = InMemorySource::new()
            .with_file("data/oxford_readiness_2024.json", r#"{"USA": {"government": 64}}"#);
        let loader = DatasetLoader::new(Arc::new(source));
        let composite = loader.load_composite().await.expect("composite");
        assert_eq!(composite.format, CompositeFormat::Json);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let source = InMemorySource::new()
            .with_file("data/world.geojson", r#"{"type":"FeatureCollection","features":[]}"#)
            .with_delay("data/world.geojson", Duration::from_secs(30));
        let loader = DatasetLoader::new(Arc::new(source)).with_timeout(Duration::from_secs(10));
        let err = loader.load_world().await.unwrap_err();
        assert_eq!(
            err,
            CatalogError::Timeout {
                location: "data/world.geojson".into(),
                after_ms: 10_000
            }
        );
    }

    #[tokio::test]
    async fn world_loads_from_custom_location() {
        let source = InMemorySource::new().with_file(
            "countries.json",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"FRA","properties":{"name":"France"},
                 "geometry":{"type":"Point","coordinates":[2.35,48.85]}}]}"#,
        );
        let locations = DatasetLocations {
            world: "countries.json".into(),
            ..DatasetLocations::default()
        };
        let loader = DatasetLoader::new(Arc::new(source)).with_locations(locations);
        let world = loader.load_world().await.expect("world");
        assert_eq!(world.len(), 1);
    }
}
