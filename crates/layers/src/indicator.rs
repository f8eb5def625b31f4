use std::fmt;
use std::str::FromStr;

pub use formats::CompositeMetric;

use crate::choropleth::ScaleMode;
use crate::symbology::Palette;

/// A numeric indicator that can drive the choropleth.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    Readiness,
    Exposure,
    GridHeadroom,
    ComputeCapacity,
    Composite(CompositeMetric),
}

/// Cache key for rendered layers.
pub type MetricKey = Indicator;

impl Indicator {
    pub fn title(&self) -> &'static str {
        match self {
            Indicator::Readiness => "Readiness (0–100)",
            Indicator::Exposure => "Exposure (0–100)",
            Indicator::GridHeadroom => "Grid headroom (%)",
            Indicator::ComputeCapacity => "Compute capacity (MW)",
            Indicator::Composite(_) => "AI Readiness (2024)",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Indicator::GridHeadroom => Palette::DIVERGING_HEADROOM,
            Indicator::Composite(_) => Palette::COLORBLIND_BLUES,
            _ => Palette::NIGHT_BLUE,
        }
    }

    /// Composite sub-metrics follow the selected scale mode; the other
    /// indicators have no fixed range and always use quantiles.
    pub fn effective_mode(&self, selected: ScaleMode) -> ScaleMode {
        match self {
            Indicator::Composite(_) => selected,
            _ => ScaleMode::Quantile,
        }
    }

    /// Tooltip value text.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Indicator::GridHeadroom => {
                let sign = if value > 0.0 { "+" } else { "" };
                format!("{sign}{value:.1}%")
            }
            Indicator::ComputeCapacity => format!("{} MW", group_thousands(value)),
            Indicator::Composite(_) => format!("{value:.0}/100"),
            _ => format!("{value:.0}"),
        }
    }

    /// Legend bound text.
    pub fn format_bound(&self, bound: f64) -> String {
        match self {
            Indicator::GridHeadroom => self.format_value(bound),
            _ => format!("{bound:.0}"),
        }
    }

    /// Stable name used on the command line and in preferences.
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Readiness => "readiness",
            Indicator::Exposure => "exposure",
            Indicator::GridHeadroom => "grid",
            Indicator::ComputeCapacity => "compute",
            Indicator::Composite(CompositeMetric::Overall) => "composite",
            Indicator::Composite(CompositeMetric::Government) => "composite:government",
            Indicator::Composite(CompositeMetric::TechnologySector) => {
                "composite:technology_sector"
            }
            Indicator::Composite(CompositeMetric::DataInfrastructure) => {
                "composite:data_infrastructure"
            }
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayer(pub String);

impl fmt::Display for UnknownLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layer: {}", self.0)
    }
}

impl std::error::Error for UnknownLayer {}

impl FromStr for Indicator {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let parsed = match lower.as_str() {
            "readiness" => Some(Indicator::Readiness),
            "exposure" => Some(Indicator::Exposure),
            "grid" | "grid_headroom" => Some(Indicator::GridHeadroom),
            "compute" => Some(Indicator::ComputeCapacity),
            "composite" | "oxford" => Some(Indicator::Composite(CompositeMetric::Overall)),
            other => other
                .strip_prefix("composite:")
                .or_else(|| other.strip_prefix("oxford:"))
                .and_then(|m| CompositeMetric::ALL.into_iter().find(|c| c.key() == m))
                .map(Indicator::Composite),
        };
        parsed.ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

/// The layer picked in the layer selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum LayerSelection {
    #[default]
    None,
    Indicator(Indicator),
}

impl LayerSelection {
    pub fn indicator(&self) -> Option<Indicator> {
        match self {
            LayerSelection::None => None,
            LayerSelection::Indicator(i) => Some(*i),
        }
    }
}

impl FromStr for LayerSelection {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(LayerSelection::None);
        }
        s.parse().map(LayerSelection::Indicator)
    }
}

/// `1234567.5` → `1,234,567.5` (up to three fractional digits, trailing
/// zeros trimmed).
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let abs = rounded.abs();
    let int_part = abs.trunc() as u64;
    let frac = format!("{:.3}", abs - abs.trunc());
    let frac = frac.trim_start_matches('0').trim_end_matches('0').trim_end_matches('.');

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac}")
}
