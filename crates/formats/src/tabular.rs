use std::collections::BTreeMap;
use std::collections::HashMap;

use scene::Iso3;
use serde::{Deserialize, Serialize};

/// Sub-metrics of the composite readiness dataset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMetric {
    Overall,
    Government,
    TechnologySector,
    DataInfrastructure,
}

impl CompositeMetric {
    pub const ALL: [CompositeMetric; 4] = [
        CompositeMetric::Overall,
        CompositeMetric::Government,
        CompositeMetric::TechnologySector,
        CompositeMetric::DataInfrastructure,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CompositeMetric::Overall => "overall",
            CompositeMetric::Government => "government",
            CompositeMetric::TechnologySector => "technology_sector",
            CompositeMetric::DataInfrastructure => "data_infrastructure",
        }
    }

    /// Maps a source metric label (e.g. `oxford_readiness_technology_pillar`)
    /// to a sub-metric. Substring rules are checked in a fixed order:
    /// technology, data, overall.
    pub fn from_source_name(raw: &str) -> Option<Self> {
        let metric = raw.trim().to_ascii_lowercase();
        if metric.contains("technology") {
            Some(CompositeMetric::TechnologySector)
        } else if metric.contains("data") {
            Some(CompositeMetric::DataInfrastructure)
        } else if metric.contains("overall") || metric.contains("oxford_readiness") {
            Some(CompositeMetric::Overall)
        } else {
            Self::ALL.into_iter().find(|m| m.key() == metric)
        }
    }
}

impl std::fmt::Display for CompositeMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One country's composite scores. Missing sub-metrics stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeScores {
    #[serde(default)]
    pub overall: Option<f64>,
    #[serde(default)]
    pub government: Option<f64>,
    #[serde(default)]
    pub technology_sector: Option<f64>,
    #[serde(default)]
    pub data_infrastructure: Option<f64>,
}

impl CompositeScores {
    pub fn get(&self, metric: CompositeMetric) -> Option<f64> {
        match metric {
            CompositeMetric::Overall => self.overall,
            CompositeMetric::Government => self.government,
            CompositeMetric::TechnologySector => self.technology_sector,
            CompositeMetric::DataInfrastructure => self.data_infrastructure,
        }
        .filter(|v| v.is_finite())
    }

    pub fn set(&mut self, metric: CompositeMetric, value: f64) {
        let slot = match metric {
            CompositeMetric::Overall => &mut self.overall,
            CompositeMetric::Government => &mut self.government,
            CompositeMetric::TechnologySector => &mut self.technology_sector,
            CompositeMetric::DataInfrastructure => &mut self.data_infrastructure,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        CompositeMetric::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

#[derive(Debug)]
pub enum TabularError {
    Csv(String),
    MissingColumn(&'static str),
    Json(String),
}

impl std::fmt::Display for TabularError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabularError::Csv(reason) => write!(f, "CSV error: {reason}"),
            TabularError::MissingColumn(name) => write!(f, "missing column: {name}"),
            TabularError::Json(reason) => write!(f, "JSON parse error: {reason}"),
        }
    }
}

impl std::error::Error for TabularError {}

/// Composite readiness keyed by country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeTable {
    pub rows: BTreeMap<Iso3, CompositeScores>,
    /// Malformed or unrecognised rows that were dropped.
    pub skipped: usize,
}

impl CompositeTable {
    pub fn get(&self, iso3: &Iso3) -> Option<&CompositeScores> {
        self.rows.get(iso3)
    }

    /// Long-format CSV with `iso3`, `metric` and `value` columns located by
    /// (case-insensitive) header name. Bad rows are skipped one by one.
    pub fn from_csv_str(payload: &str) -> Result<Self, TabularError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(payload.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| TabularError::Csv(e.to_string()))?
            .clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(TabularError::MissingColumn(name))
        };
        let idx_iso = column("iso3")?;
        let idx_metric = column("metric")?;
        let idx_value = column("value")?;

        let mut table = CompositeTable::default();
        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(line, error = %e, "skipping unreadable composite row");
                    table.skipped += 1;
                    continue;
                }
            };
            if record.len() < 3 {
                table.skipped += 1;
                continue;
            }
            let iso3 = record.get(idx_iso).and_then(Iso3::parse);
            let metric = record.get(idx_metric).and_then(CompositeMetric::from_source_name);
            let value = record
                .get(idx_value)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite());
            match (iso3, metric, value) {
                (Some(iso3), Some(metric), Some(value)) => {
                    table.rows.entry(iso3).or_default().set(metric, value);
                }
                _ => {
                    tracing::debug!(line, "skipping malformed composite row");
                    table.skipped += 1;
                }
            }
        }
        Ok(table)
    }

    /// Structured form: `{ "ISO": { "overall": 71.2, ... }, ... }`.
    pub fn from_json_str(payload: &str) -> Result<Self, TabularError> {
        let raw: HashMap<String, CompositeScores> =
            serde_json::from_str(payload).map_err(|e| TabularError::Json(e.to_string()))?;
        let mut table = CompositeTable::default();
        for (code, scores) in raw {
            match Iso3::parse(&code) {
                Some(iso3) => {
                    table.rows.insert(iso3, scores);
                }
                None => table.skipped += 1,
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeMetric, CompositeTable, TabularError};
    use pretty_assertions::assert_eq;
    use scene::Iso3;

    fn iso(code: &str) -> Iso3 {
        Iso3::parse(code).expect("valid code")
    }

    #[test]
    fn maps_source_metric_names() {
        use CompositeMetric::*;
        assert_eq!(
            CompositeMetric::from_source_name("Oxford_Readiness_Technology_Sector"),
            Some(TechnologySector)
        );
        assert_eq!(CompositeMetric::from_source_name("data & infra"), Some(DataInfrastructure));
        assert_eq!(CompositeMetric::from_source_name("oxford_readiness_2024"), Some(Overall));
        assert_eq!(CompositeMetric::from_source_name("overall_score"), Some(Overall));
        assert_eq!(CompositeMetric::from_source_name("government"), Some(Government));
        assert_eq!(CompositeMetric::from_source_name("population"), None);
    }

    #[test]
    fn csv_skips_bad_rows_and_keeps_the_rest() {
        let payload = "\
Metric,ISO3,Value
overall,usa,87.0
government,USA,90
technology,USA,not-a-number
overall,,55
data_infrastructure,FRA
government,DEU,71.5
unknown_metric,DEU,3
";
        let table = CompositeTable::from_csv_str(payload).expect("headers present");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped, 4);
        let usa = table.get(&iso("USA")).expect("usa row");
        assert_eq!(usa.get(CompositeMetric::Overall), Some(87.0));
        assert_eq!(usa.get(CompositeMetric::Government), Some(90.0));
        assert_eq!(usa.get(CompositeMetric::TechnologySector), None);
        assert_eq!(
            table.get(&iso("DEU")).and_then(|s| s.government),
            Some(71.5)
        );
    }

    #[test]
    fn csv_without_required_column_fails() {
        let err = CompositeTable::from_csv_str("iso3,value\nUSA,1\n").unwrap_err();
        assert!(matches!(err, TabularError::MissingColumn("metric")));
    }

    #[test]
    fn json_form_parses_partial_records() {
        let payload = r#"{"GBR": {"overall": 78, "government": null}, "??": {"overall": 1}}"#;
        let table = CompositeTable::from_json_str(payload).expect("valid json");
        assert_eq!(table.skipped, 1);
        let gbr = table.get(&iso("GBR")).expect("gbr");
        assert_eq!(gbr.get(CompositeMetric::Overall), Some(78.0));
        assert!(gbr.government.is_none());
        assert!(!gbr.is_empty());
    }
}
