use std::collections::BTreeMap;
use std::sync::Arc;

use catalog::{DatasetVersion, IndicatorDataset};

use crate::choropleth::{RenderedLayer, ScaleMode, render_indicator};
use crate::indicator::MetricKey;

pub type LayerCacheKey = (MetricKey, ScaleMode);

#[derive(Debug, Clone)]
struct CachedLayer {
    version: DatasetVersion,
    layer: Arc<RenderedLayer>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Rendered layers keyed by `(metric, scale mode)`.
///
/// Each metric is pinned to the content version of its dataset; pinning a
/// different version evicts every entry rendered from the old one.
#[derive(Debug, Default)]
pub struct LayerCache {
    entries: BTreeMap<LayerCacheKey, CachedLayer>,
    pinned_versions: BTreeMap<MetricKey, DatasetVersion>,
    stats: LayerCacheStats,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> LayerCacheStats {
        self.stats
    }

    pub fn contains(&self, key: &LayerCacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Records the dataset version for `metric` and returns the evicted keys.
    pub fn pin_dataset_version(
        &mut self,
        metric: MetricKey,
        version: DatasetVersion,
    ) -> Vec<LayerCacheKey> {
        let stale: Vec<LayerCacheKey> = self
            .entries
            .iter()
            .filter(|((m, _), e)| *m == metric && e.version != version)
            .map(|(k, _)| *k)
            .collect();
        for key in &stale {
            self.entries.remove(key);
        }
        self.stats.evictions += stale.len() as u64;
        if !stale.is_empty() {
            tracing::debug!(%metric, %version, evicted = stale.len(), "layer cache invalidated");
        }
        self.pinned_versions.insert(metric, version);
        stale
    }

    /// Cached layer for `(metric, mode)`, rendering it on a miss. The key uses
    /// the mode the metric actually renders with.
    pub fn get_or_render(
        &mut self,
        metric: MetricKey,
        data: &Arc<IndicatorDataset>,
        mode: ScaleMode,
    ) -> Arc<RenderedLayer> {
        if self.pinned_versions.get(&metric) != Some(data.version()) {
            self.pin_dataset_version(metric, data.version().clone());
        }
        let key = (metric, metric.effective_mode(mode));
        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            return hit.layer.clone();
        }
        self.stats.misses += 1;
        let layer = Arc::new(render_indicator(metric, data.clone(), mode));
        self.entries.insert(
            key,
            CachedLayer {
                version: data.version().clone(),
                layer: layer.clone(),
            },
        );
        layer
    }

    pub fn clear(&mut self) {
        self.stats.evictions += self.entries.len() as u64;
        self.entries.clear();
        self.pinned_versions.clear();
    }
}
