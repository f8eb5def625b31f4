//! Remote country facts by name.

use std::collections::HashMap;
use std::time::Duration;

use foundation::normalize_name;
use serde::Deserialize;

use crate::source::BoxFuture;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Facts returned by a lookup. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryRecord {
    pub common_name: Option<String>,
    pub flag_url: Option<String>,
    pub capitals: Vec<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<u64>,
    pub area_km2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    InvalidName(String),
    Request(String),
    Status(u16),
    NoMatch(String),
    Decode(String),
    Timeout,
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::InvalidName(name) => write!(f, "cannot look up country name {name:?}"),
            LookupError::Request(reason) => write!(f, "country lookup request failed: {reason}"),
            LookupError::Status(code) => write!(f, "country lookup returned HTTP {code}"),
            LookupError::NoMatch(name) => write!(f, "no country matches {name:?}"),
            LookupError::Decode(reason) => write!(f, "country lookup response invalid: {reason}"),
            LookupError::Timeout => write!(f, "country lookup timed out"),
        }
    }
}

impl std::error::Error for LookupError {}

pub trait CountryLookup: Send + Sync {
    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<CountryRecord, LookupError>>;
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    #[serde(default)]
    name: Option<RawName>,
    #[serde(default)]
    flags: Option<RawFlags>,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    subregion: Option<String>,
    #[serde(default)]
    population: Option<u64>,
    #[serde(default)]
    area: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl From<RawCountry> for CountryRecord {
    fn from(raw: RawCountry) -> Self {
        CountryRecord {
            common_name: non_empty(raw.name.and_then(|n| n.common)),
            flag_url: non_empty(raw.flags.and_then(|f| f.png.or(f.svg))),
            capitals: raw
                .capital
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            region: non_empty(raw.region),
            subregion: non_empty(raw.subregion),
            population: raw.population,
            area_km2: raw.area.filter(|a| a.is_finite()),
        }
    }
}

/// Picks the record whose common name equals `name`, else the first one.
pub fn parse_lookup_response(name: &str, payload: &[u8]) -> Result<CountryRecord, LookupError> {
    let raw: Vec<RawCountry> =
        serde_json::from_slice(payload).map_err(|e| LookupError::Decode(e.to_string()))?;
    let wanted = normalize_name(name);
    let mut records: Vec<CountryRecord> = raw.into_iter().map(CountryRecord::from).collect();
    let exact = records.iter().position(|r| {
        r.common_name
            .as_deref()
            .is_some_and(|n| normalize_name(n) == wanted)
    });
    match exact {
        Some(idx) => Ok(records.swap_remove(idx)),
        None if !records.is_empty() => Ok(records.swap_remove(0)),
        None => Err(LookupError::NoMatch(name.to_string())),
    }
}

/// Client for the public REST Countries service.
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RestCountriesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// `{base}/name/{name}?fullText=true`, with the name percent-encoded.
    pub fn url_for(&self, name: &str) -> Result<reqwest::Url, LookupError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LookupError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Request(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .push("name")
            .push(name);
        url.query_pairs_mut().append_pair("fullText", "true");
        Ok(url)
    }
}

impl Default for RestCountriesClient {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_BASE_URL, crate::loader::DEFAULT_LOAD_TIMEOUT)
    }
}

impl CountryLookup for RestCountriesClient {
    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<CountryRecord, LookupError>> {
        let name = name.trim().to_string();
        Box::pin(async move {
            if name.is_empty() {
                return Err(LookupError::InvalidName(name));
            }
            let url = self.url_for(&name)?;
            let request = async {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| LookupError::Request(e.to_string()))?;
                if resp.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(LookupError::NoMatch(name.clone()));
                }
                if !resp.status().is_success() {
                    return Err(LookupError::Status(resp.status().as_u16()));
                }
                resp.bytes()
                    .await
                    .map_err(|e| LookupError::Request(e.to_string()))
            };
            let body = tokio::time::timeout(self.timeout, request)
                .await
                .map_err(|_| LookupError::Timeout)??;
            parse_lookup_response(&name, &body)
        })
    }
}

/// Answers from a fixed table keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: HashMap<String, CountryRecord>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, name: &str, record: CountryRecord) -> Self {
        self.records.insert(normalize_name(name), record);
        self
    }
}

impl CountryLookup for StaticLookup {
    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<CountryRecord, LookupError>> {
        let result = self
            .records
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| LookupError::NoMatch(name.to_string()));
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupError, RestCountriesClient, parse_lookup_response};
    use std::time::Duration;

    const BODY: &str = r#"[
        {"name": {"common": "Guinea-Bissau"}, "capital": ["Bissau"], "region": "Africa",
         "population": 1967998, "area": 36125.0},
        {"name": {"common": "Guinea"}, "flags": {"png": "https://flags.test/gn.png"},
         "capital": ["Conakry"], "region": "Africa", "subregion": "Western Africa",
         "population": 13132792, "area": 245857.0}
    ]"#;

    #[test]
    fn prefers_exact_common_name() {
        let record = parse_lookup_response("guinea", BODY.as_bytes()).expect("match");
        assert_eq!(record.common_name.as_deref(), Some("Guinea"));
        assert_eq!(record.capitals, vec!["Conakry".to_string()]);
        assert_eq!(record.flag_url.as_deref(), Some("https://flags.test/gn.png"));
        assert_eq!(record.subregion.as_deref(), Some("Western Africa"));
    }

    #[test]
    fn falls_back_to_first_record() {
        let record = parse_lookup_response("Bissau", BODY.as_bytes()).expect("first");
        assert_eq!(record.common_name.as_deref(), Some("Guinea-Bissau"));
        assert!(record.subregion.is_none());
    }

    #[test]
    fn empty_or_invalid_bodies_fail() {
        assert_eq!(
            parse_lookup_response("x", b"[]"),
            Err(LookupError::NoMatch("x".into()))
        );
        assert!(matches!(
            parse_lookup_response("x", br#"{"status": 404}"#),
            Err(LookupError::Decode(_))
        ));
    }

    #[test]
    fn url_encodes_name_and_requests_full_text() {
        let client = RestCountriesClient::new("https://restcountries.com/v3.1/", Duration::from_secs(1));
        let url = client.url_for("Côte d'Ivoire").expect("url");
        assert!(url.as_str().starts_with("https://restcountries.com/v3.1/name/C%C3%B4te"));
        assert_eq!(url.query(), Some("fullText=true"));
    }
}
