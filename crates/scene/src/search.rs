use std::collections::{BTreeSet, HashMap};

use foundation::normalize_name;

use crate::feature::FeatureId;
use crate::iso::{Iso3, IsoResolver};
use crate::world::World;

#[derive(Debug, Clone)]
struct SearchEntry {
    id: FeatureId,
    iso3: Iso3,
    exonym: String,
    endonym: Option<String>,
}

/// Exact-match country lookup over exonyms, endonyms and alias keys.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    resolver: IsoResolver,
    suggestions: Vec<String>,
}

impl SearchIndex {
    /// Indexes every feature in load order. `endonyms` maps a code to the
    /// country's native name.
    pub fn build(world: &World, resolver: &IsoResolver, endonyms: &HashMap<Iso3, String>) -> Self {
        let mut entries = Vec::with_capacity(world.len());
        let mut labels = BTreeSet::new();

        for (id, feature) in world.iter() {
            let iso3 = resolver.resolve(feature);
            let endonym = endonyms
                .get(&iso3)
                .filter(|_| iso3.is_resolved())
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            let display = endonym.unwrap_or_else(|| feature.display_name());
            labels.insert(display.to_string());
            entries.push(SearchEntry {
                id,
                exonym: normalize_name(feature.display_name()),
                endonym: endonym.map(normalize_name),
                iso3,
            });
        }
        labels.extend(resolver.aliases().labels().map(str::to_string));

        Self {
            entries,
            resolver: resolver.clone(),
            suggestions: labels.into_iter().collect(),
        }
    }

    /// First feature, in load order, whose exonym, endonym or alias key
    /// equals the normalized query.
    pub fn resolve(&self, query: &str) -> Option<FeatureId> {
        let q = normalize_name(query);
        if q.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| {
                e.exonym == q
                    || e.endonym.as_deref() == Some(q.as_str())
                    || self.resolver.alias_matches(&q, &e.iso3)
            })
            .map(|e| e.id)
    }

    /// Sorted, de-duplicated names offered while typing.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SearchIndex;
    use crate::feature::{CountryFeature, FeatureId};
    use crate::geometry::Geometry;
    use crate::iso::{AliasTable, Iso3, IsoResolver};
    use crate::world::World;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn feature(props: Value) -> CountryFeature {
        CountryFeature::new(
            None,
            props.as_object().cloned().unwrap_or_default(),
            Geometry::Sphere,
        )
    }

    fn world() -> World {
        World::from_features(vec![
            feature(json!({"name": "France", "ISO_A3": "FRA"})),
            feature(json!({"name": "United States of America"})),
            feature(json!({"name": "Germany"})),
            feature(json!({"name": "Atlantis"})),
        ])
    }

    #[test]
    fn usa_query_uses_static_aliases() {
        let index = SearchIndex::build(&world(), &IsoResolver::new(), &HashMap::new());
        for q in ["usa", "USA", "  U.S. ", "United States"] {
            assert_eq!(index.resolve(q), Some(FeatureId(1)), "query {q:?}");
        }
    }

    #[test]
    fn endonym_and_diacritics_match() {
        let mut endonyms = HashMap::new();
        endonyms.insert(Iso3::parse("DEU").expect("code"), "Deutschland".to_string());
        endonyms.insert(Iso3::parse("FRA").expect("code"), "République française".to_string());
        let index = SearchIndex::build(&world(), &IsoResolver::new(), &endonyms);
        assert_eq!(index.resolve("deutschland"), Some(FeatureId(2)));
        assert_eq!(index.resolve("republique FRANCAISE"), Some(FeatureId(0)));
        assert_eq!(index.resolve("france"), Some(FeatureId(0)));
    }

    #[test]
    fn dynamic_alias_maps_to_resolved_feature() {
        let resolver = IsoResolver::with_aliases(AliasTable::from_pairs([("Hexagone", "FRA")]));
        let index = SearchIndex::build(&world(), &resolver, &HashMap::new());
        assert_eq!(index.resolve("hexagone"), Some(FeatureId(0)));
    }

    #[test]
    fn no_fuzzy_or_empty_matches() {
        let index = SearchIndex::build(&world(), &IsoResolver::new(), &HashMap::new());
        assert_eq!(index.resolve("fran"), None);
        assert_eq!(index.resolve("   "), None);
        assert_eq!(index.resolve("atlantis"), Some(FeatureId(3)));
    }

    #[test]
    fn suggestions_are_sorted_and_unique() {
        let resolver = IsoResolver::with_aliases(AliasTable::from_pairs([("Hexagone", "FRA")]));
        let index = SearchIndex::build(&world(), &resolver, &HashMap::new());
        assert_eq!(
            index.suggestions(),
            &[
                "Atlantis".to_string(),
                "France".to_string(),
                "Germany".to_string(),
                "Hexagone".to_string(),
                "United States of America".to_string(),
            ]
        );
    }
}
