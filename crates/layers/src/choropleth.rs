//! Binning, coloring and legends for the indicator layer.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use catalog::IndicatorDataset;
use scene::Iso3;
use serde::{Deserialize, Serialize};

use crate::indicator::{Indicator, LayerSelection};
use crate::symbology::{Color, Palette};

/// Fixed thresholds for indicators already on a 0–100 scale.
pub const ABSOLUTE_EDGES: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

const QUANTILES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    Quantile,
    #[default]
    Absolute,
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleMode::Quantile => "quantile",
            ScaleMode::Absolute => "absolute",
        })
    }
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quantile" => Ok(ScaleMode::Quantile),
            "absolute" => Ok(ScaleMode::Absolute),
            other => Err(format!("unknown scale mode: {other}")),
        }
    }
}

/// Four non-decreasing thresholds splitting values into five classes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BinEdges(pub [f64; 4]);

impl BinEdges {
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    /// Class of a finite value: the first edge it does not exceed, else 4.
    pub fn class_of(&self, value: f64) -> usize {
        self.0.iter().position(|edge| value <= *edge).unwrap_or(4)
    }
}

/// Quantile edges use linear interpolation between ranks over the sorted
/// finite values; no values at all yields zero edges.
pub fn compute_bins(values: &[f64], mode: ScaleMode) -> BinEdges {
    if mode == ScaleMode::Absolute {
        return BinEdges(ABSOLUTE_EDGES);
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return BinEdges([0.0; 4]);
    }
    sorted.sort_by(f64::total_cmp);
    BinEdges(QUANTILES.map(|p| quantile_sorted(&sorted, p)))
}

fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let idx = (n - 1) as f64 * p;
    let lo = idx.floor() as usize;
    let hi = (idx.ceil() as usize).min(n - 1);
    let h = idx - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * h
}

/// Absent and non-finite values take the no-data color before any bin
/// lookup.
pub fn color_for(value: Option<f64>, edges: &BinEdges, palette: &Palette) -> Color {
    match value {
        Some(v) if v.is_finite() => palette.classes[edges.class_of(v)],
        _ => palette.no_data,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub mode: ScaleMode,
    /// One entry per class, low to high.
    pub entries: Vec<LegendEntry>,
    pub no_data: LegendEntry,
}

impl Legend {
    pub fn new(indicator: Indicator, mode: ScaleMode, edges: &BinEdges, palette: &Palette) -> Self {
        let [b0, b1, b2, b3] = edges.0.map(|b| indicator.format_bound(b));
        let labels = [
            format!("≤ {b0}"),
            format!("{b0}–{b1}"),
            format!("{b1}–{b2}"),
            format!("{b2}–{b3}"),
            format!("> {b3}"),
        ];
        let entries = labels
            .into_iter()
            .zip(palette.classes)
            .map(|(label, color)| LegendEntry { label, color })
            .collect();
        Self {
            title: indicator.title().to_string(),
            mode,
            entries,
            no_data: LegendEntry {
                label: "No data".to_string(),
                color: palette.no_data,
            },
        }
    }
}

/// A fully computed choropleth for one indicator and scale mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLayer {
    pub indicator: Indicator,
    pub mode: ScaleMode,
    pub edges: BinEdges,
    pub palette: Palette,
    pub legend: Legend,
    data: Arc<IndicatorDataset>,
}

impl RenderedLayer {
    pub fn value_for(&self, iso3: &Iso3) -> Option<f64> {
        if !iso3.is_resolved() {
            return None;
        }
        self.data.get(iso3)
    }

    /// Unresolved codes and countries without data share the no-data color.
    pub fn fill_for(&self, iso3: &Iso3) -> Color {
        color_for(self.value_for(iso3), &self.edges, &self.palette)
    }

    /// `"{name}: {value}"`, or `None` when the country has no value.
    pub fn tooltip_for(&self, name: &str, iso3: &Iso3) -> Option<String> {
        let value = self.value_for(iso3)?;
        Some(format!("{name}: {}", self.indicator.format_value(value)))
    }

    pub fn dataset(&self) -> &Arc<IndicatorDataset> {
        &self.data
    }
}

/// What the map shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerState {
    /// No indicator selected; base map only.
    Cleared,
    /// Selected, but its dataset has not arrived (or failed).
    Loading { title: String },
    Ready(Arc<RenderedLayer>),
}

impl LayerState {
    pub fn rendered(&self) -> Option<&Arc<RenderedLayer>> {
        match self {
            LayerState::Ready(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LayerState::Loading { .. })
    }
}

/// Computes one layer from its dataset. Pure: the same inputs always give
/// the same output.
pub fn render_indicator(
    indicator: Indicator,
    data: Arc<IndicatorDataset>,
    selected_mode: ScaleMode,
) -> RenderedLayer {
    let mode = indicator.effective_mode(selected_mode);
    let values: Vec<f64> = data.values().collect();
    let edges = compute_bins(&values, mode);
    let palette = indicator.palette();
    RenderedLayer {
        indicator,
        mode,
        edges,
        palette,
        legend: Legend::new(indicator, mode, &edges, &palette),
        data,
    }
}

/// Resolves a selection into a layer state without caching.
pub fn render_layer(
    selection: LayerSelection,
    data: Option<Arc<IndicatorDataset>>,
    mode: ScaleMode,
) -> LayerState {
    let Some(indicator) = selection.indicator() else {
        return LayerState::Cleared;
    };
    match data {
        Some(data) => LayerState::Ready(Arc::new(render_indicator(indicator, data, mode))),
        None => LayerState::Loading {
            title: indicator.title().to_string(),
        },
    }
}
