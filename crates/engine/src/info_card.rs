//! Country detail card: local facts merged with a remote lookup.
//!
//! The card is always complete. A failed lookup leaves every remote field
//! [`Field::Unavailable`] while local metadata still fills what it can.

use std::fmt;
use std::sync::Arc;

use catalog::{
    ComputeSites, CountryLookup, CountryMeta, CountryRecord, is_us_name, us_population_total,
};
use formats::{CompositeMetric, CompositeScores};
use layers::group_thousands;
use scene::Iso3;

const COMPOSITE_YEAR: u16 = 2024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Value(String),
    Unavailable,
}

impl Field {
    fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Field::Value(v),
            _ => Field::Unavailable,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Value(v) => Some(v),
            Field::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Field::Value(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value(v) => f.write_str(v),
            Field::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// One row per composite sub-metric, `NN/100 (2024)` or `n/a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRows {
    pub overall: String,
    pub government: String,
    pub technology_sector: String,
    pub data_infrastructure: String,
}

impl CompositeRows {
    /// `None` when every sub-metric is missing.
    pub fn from_scores(scores: &CompositeScores) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let row = |metric| match scores.get(metric) {
            Some(v) => format!("{v:.0}/100 ({COMPOSITE_YEAR})"),
            None => "n/a".to_string(),
        };
        Some(Self {
            overall: row(CompositeMetric::Overall),
            government: row(CompositeMetric::Government),
            technology_sector: row(CompositeMetric::TechnologySector),
            data_infrastructure: row(CompositeMetric::DataInfrastructure),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLine {
    /// `"{site} — {mw} MW"`.
    pub heading: String,
    /// Operator and city joined by ` · `, when either is known.
    pub detail: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeSummary {
    pub total: String,
    pub sites: Vec<SiteLine>,
}

impl ComputeSummary {
    /// `None` when the country has no sites.
    pub fn for_country(sites: &ComputeSites, iso3: &Iso3) -> Option<Self> {
        if !iso3.is_resolved() {
            return None;
        }
        let matching: Vec<_> = sites.for_country(iso3).collect();
        if matching.is_empty() {
            return None;
        }
        let total: f64 = matching.iter().map(|s| s.mw).sum();
        let sites = matching
            .into_iter()
            .map(|s| {
                let parts: Vec<&str> = [s.operator.as_deref(), s.city.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|p| !p.is_empty())
                    .collect();
                SiteLine {
                    heading: format!("{} — {} MW", s.site_name, group_thousands(s.mw)),
                    detail: (!parts.is_empty()).then(|| parts.join(" · ")),
                    status: (!s.status.is_empty()).then(|| s.status.clone()),
                    notes: s.notes.clone().filter(|n| !n.is_empty()),
                }
            })
            .collect();
        Some(Self {
            total: format!("{} MW", group_thousands(total)),
            sites,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoCard {
    pub name: String,
    pub flag_url: Option<String>,
    pub capital: Field,
    pub region: Field,
    /// Hidden when the lookup has none.
    pub subregion: Option<String>,
    pub population: Field,
    pub area: Field,
    pub composite: Option<CompositeRows>,
    /// Present only while the compute layer is active.
    pub compute: Option<ComputeSummary>,
}

/// Local inputs for one card.
#[derive(Debug, Clone, Copy)]
pub struct CardContext<'a> {
    pub name: &'a str,
    pub iso3: &'a Iso3,
    pub meta: Option<&'a CountryMeta>,
    pub composite: Option<&'a CompositeScores>,
    /// Set when the compute layer is the active layer.
    pub compute_sites: Option<&'a ComputeSites>,
}

/// Builds a card from local context and the lookup result, if any.
pub fn assemble_card(ctx: CardContext<'_>, remote: Option<&CountryRecord>) -> InfoCard {
    let name = remote
        .and_then(|r| r.common_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| ctx.name.to_string());

    let remote_capital = remote
        .map(|r| r.capitals.join(", "))
        .filter(|c| !c.is_empty());
    let capital = ctx
        .meta
        .and_then(|m| m.capital_primary.clone())
        .filter(|c| !c.is_empty())
        .or(remote_capital);
    let region = ctx
        .meta
        .and_then(|m| m.region.clone())
        .filter(|r| !r.is_empty())
        .or_else(|| remote.and_then(|r| r.region.clone()));

    let is_us = ctx.iso3.as_str() == "USA" || is_us_name(ctx.name);
    let population = remote
        .and_then(|r| r.population)
        .or_else(|| is_us.then(us_population_total))
        .map(|p| group_thousands(p as f64));
    let area = remote
        .and_then(|r| r.area_km2)
        .filter(|a| a.is_finite())
        .map(|a| group_thousands(a.round()));

    InfoCard {
        name,
        flag_url: remote.and_then(|r| r.flag_url.clone()),
        capital: Field::from_option(capital),
        region: Field::from_option(region),
        subregion: remote
            .and_then(|r| r.subregion.clone())
            .filter(|s| !s.is_empty()),
        population: Field::from_option(population),
        area: Field::from_option(area),
        composite: ctx.composite.and_then(CompositeRows::from_scores),
        compute: ctx
            .compute_sites
            .and_then(|sites| ComputeSummary::for_country(sites, ctx.iso3)),
    }
}

/// Queries the lookup service and assembles the card. Never fails.
#[derive(Clone)]
pub struct InfoCardAssembler {
    lookup: Arc<dyn CountryLookup>,
}

impl fmt::Debug for InfoCardAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfoCardAssembler").finish_non_exhaustive()
    }
}

impl InfoCardAssembler {
    pub fn new(lookup: Arc<dyn CountryLookup>) -> Self {
        Self { lookup }
    }

    pub async fn assemble(&self, ctx: CardContext<'_>) -> InfoCard {
        let remote = match self.lookup.lookup(ctx.name).await {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(name = ctx.name, %error, "country lookup failed");
                None
            }
        };
        assemble_card(ctx, remote.as_ref())
    }
}
