use std::collections::{BTreeMap, HashMap};

use formats::{CompositeMetric, CompositeTable};
use scene::{AliasTable, Iso3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// Content digest of a dataset, used to invalidate cached layers when the
/// same dataset is loaded again with different values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetVersion(pub String);

impl DatasetVersion {
    fn of_values<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a Iso3, f64)>,
    {
        let mut hasher = blake3::Hasher::new();
        for (iso3, value) in entries {
            hasher.update(iso3.as_str().as_bytes());
            hasher.update(&value.to_le_bytes());
        }
        DatasetVersion(hasher.finalize().to_hex().to_string())
    }
}

impl std::fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0[..self.0.len().min(12)])
    }
}

/// Numeric indicator keyed by country. Countries without data are absent,
/// never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDataset {
    values: BTreeMap<Iso3, f64>,
    version: DatasetVersion,
}

impl Default for IndicatorDataset {
    fn default() -> Self {
        Self::from_values(std::iter::empty())
    }
}

impl IndicatorDataset {
    /// Keeps only resolved codes with finite values. A repeated code keeps
    /// its last value.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Iso3, f64)>,
    {
        let values: BTreeMap<Iso3, f64> = values
            .into_iter()
            .filter(|(iso3, v)| iso3.is_resolved() && v.is_finite())
            .collect();
        let version = DatasetVersion::of_values(values.iter().map(|(k, v)| (k, *v)));
        Self { values, version }
    }

    /// `{ "ISO": number, ... }`. Numbers written as strings (`"42"`) are
    /// accepted; other non-numeric entries and bad codes are skipped.
    pub fn from_json_str(location: &str, payload: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, Value> =
            serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
        let mut skipped = 0usize;
        let values: Vec<(Iso3, f64)> = raw
            .into_iter()
            .filter_map(|(code, value)| {
                let parsed = Iso3::parse(&code).zip(numeric_value(&value));
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();
        if skipped > 0 {
            tracing::debug!(location, skipped, "dropped non-numeric indicator entries");
        }
        Ok(Self::from_values(values))
    }

    pub fn get(&self, iso3: &Iso3) -> Option<f64> {
        self.values.get(iso3).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Iso3, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn version(&self) -> &DatasetVersion {
        &self.version
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Composite readiness dataset and the format it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDataset {
    pub table: CompositeTable,
    pub format: CompositeFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompositeFormat {
    Csv,
    Json,
}

impl CompositeDataset {
    pub fn metric(&self, metric: CompositeMetric) -> IndicatorDataset {
        IndicatorDataset::from_values(
            self.table
                .rows
                .iter()
                .filter_map(|(iso3, scores)| Some((iso3.clone(), scores.get(metric)?))),
        )
    }

    pub fn scores(&self, iso3: &Iso3) -> Option<&formats::CompositeScores> {
        self.table.get(iso3)
    }
}

/// One data-centre site.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeSite {
    pub iso3: Iso3,
    pub mw: f64,
    pub status: String,
    pub site_name: String,
    pub city: Option<String>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

impl ComputeSite {
    pub fn is_operational(&self) -> bool {
        self.status.eq_ignore_ascii_case("operational")
    }
}

#[derive(Debug, Deserialize)]
struct RawComputeSite {
    #[serde(default)]
    iso3: String,
    #[serde(default)]
    mw: Option<f64>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    site_name: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputeSites {
    pub sites: Vec<ComputeSite>,
}

impl ComputeSites {
    /// JSON array of site records. Sites without a valid code or MW figure
    /// are dropped.
    pub fn from_json_str(location: &str, payload: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawComputeSite> =
            serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
        let sites = raw
            .into_iter()
            .filter_map(|r| {
                let iso3 = Iso3::parse(&r.iso3)?;
                let mw = r.mw.filter(|v| v.is_finite())?;
                Some(ComputeSite {
                    iso3,
                    mw,
                    status: r.status,
                    site_name: r.site_name,
                    city: r.city,
                    operator: r.operator,
                    notes: r.notes,
                })
            })
            .collect();
        Ok(Self { sites })
    }

    /// Per-country total capacity in MW.
    pub fn total_mw_by_country(&self) -> IndicatorDataset {
        let mut totals: BTreeMap<Iso3, f64> = BTreeMap::new();
        for site in &self.sites {
            *totals.entry(site.iso3.clone()).or_default() += site.mw;
        }
        IndicatorDataset::from_values(totals)
    }

    pub fn for_country<'a>(&'a self, iso3: &'a Iso3) -> impl Iterator<Item = &'a ComputeSite> + 'a {
        self.sites.iter().filter(move |s| &s.iso3 == iso3)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Ordered presence levels of the safety-institute overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafetyPresence {
    Low,
    Medium,
    High,
}

impl SafetyPresence {
    /// `S`, `M`, `L` codes; `none` and anything else yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "L" | "l" => Some(SafetyPresence::High),
            "M" | "m" => Some(SafetyPresence::Medium),
            "S" | "s" => Some(SafetyPresence::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyFootprint {
    pub levels: BTreeMap<Iso3, SafetyPresence>,
}

impl SafetyFootprint {
    pub fn from_json_str(location: &str, payload: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, Value> =
            serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
        let levels = raw
            .into_iter()
            .filter_map(|(code, level)| {
                Some((Iso3::parse(&code)?, SafetyPresence::from_code(level.as_str()?)?))
            })
            .collect();
        Ok(Self { levels })
    }

    pub fn get(&self, iso3: &Iso3) -> Option<SafetyPresence> {
        self.levels.get(iso3).copied()
    }
}

/// Locally curated facts preferred over the remote lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMeta {
    #[serde(default)]
    pub capital_primary: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

pub fn country_meta_from_json_str(
    location: &str,
    payload: &str,
) -> Result<HashMap<Iso3, CountryMeta>, CatalogError> {
    let raw: HashMap<String, CountryMeta> =
        serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, meta)| Some((Iso3::parse(&code)?, meta)))
        .collect())
}

/// `{ "ISO": "native name" }`.
pub fn endonyms_from_json_str(
    location: &str,
    payload: &str,
) -> Result<HashMap<Iso3, String>, CatalogError> {
    let raw: HashMap<String, Value> =
        serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, name)| {
            let name = name.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            Some((Iso3::parse(&code)?, name.to_string()))
        })
        .collect())
}

/// `{ "name": "ISO" }`. Keys are normalized by the table.
pub fn aliases_from_json_str(location: &str, payload: &str) -> Result<AliasTable, CatalogError> {
    let raw: HashMap<String, Value> =
        serde_json::from_str(payload).map_err(|e| CatalogError::corrupt(location, e))?;
    Ok(AliasTable::from_pairs(raw.iter().filter_map(|(name, code)| {
        Some((name.as_str(), code.as_str()?))
    })))
}

/// Everything the map needs besides geometry. Each dataset is optional so a
/// failed load leaves only that indicator without data.
#[derive(Debug, Clone, Default)]
pub struct DatasetBundle {
    pub aliases: AliasTable,
    pub readiness: Option<IndicatorDataset>,
    pub exposure: Option<IndicatorDataset>,
    pub grid_headroom: Option<IndicatorDataset>,
    pub safety: Option<SafetyFootprint>,
    pub compute_sites: Option<ComputeSites>,
    pub compute_mw: Option<IndicatorDataset>,
    pub composite: Option<CompositeDataset>,
    pub endonyms: HashMap<Iso3, String>,
    pub country_meta: HashMap<Iso3, CountryMeta>,
}

impl DatasetBundle {
    pub fn with_compute_sites(mut self, sites: ComputeSites) -> Self {
        self.compute_mw = Some(sites.total_mw_by_country());
        self.compute_sites = Some(sites);
        self
    }
}
