use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use foundation::normalize_name;
use once_cell::sync::Lazy;

use crate::feature::CountryFeature;

/// A three-letter uppercase country code, or empty when a feature could not
/// be resolved. Consumers treat the empty code as "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iso3(String);

impl Iso3 {
    /// Accepts exactly three ASCII letters in any case.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == 3 && raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            Some(Self(raw.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn unresolved() -> Self {
        Self(String::new())
    }

    pub fn is_resolved(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iso3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

const STATIC_NAMES: &[(&str, &str)] = &[
    ("united states", "USA"),
    ("united states of america", "USA"),
    ("u.s.", "USA"),
    ("usa", "USA"),
    ("united kingdom", "GBR"),
    ("uk", "GBR"),
    ("britain", "GBR"),
    ("great britain", "GBR"),
    ("china", "CHN"),
    ("people's republic of china", "CHN"),
    ("prc", "CHN"),
    ("south korea", "KOR"),
    ("republic of korea", "KOR"),
    ("germany", "DEU"),
    ("france", "FRA"),
    ("italy", "ITA"),
    ("canada", "CAN"),
    ("japan", "JPN"),
    ("india", "IND"),
    ("australia", "AUS"),
    ("brazil", "BRA"),
    ("mexico", "MEX"),
    ("argentina", "ARG"),
    ("south africa", "ZAF"),
    ("russia", "RUS"),
    ("russian federation", "RUS"),
    ("indonesia", "IDN"),
    ("turkey", "TUR"),
    ("saudi arabia", "SAU"),
    ("cote d'ivoire", "CIV"),
    ("côte d’ivoire", "CIV"),
    ("ivory coast", "CIV"),
];

static NAME_TO_ISO3: Lazy<HashMap<String, Iso3>> = Lazy::new(|| {
    STATIC_NAMES
        .iter()
        .filter_map(|(name, code)| Some((normalize_name(name), Iso3::parse(code)?)))
        .collect()
});

/// Looks a normalized name up in the built-in variant table.
pub fn static_lookup(normalized: &str) -> Option<&'static Iso3> {
    NAME_TO_ISO3.get(normalized)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub iso3: Iso3,
    /// The alias as written in its source, used for suggestions.
    pub label: String,
}

/// Dynamically loaded name → ISO3 aliases, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from raw pairs. Pairs whose code is not three letters
    /// or whose name normalizes to nothing are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = Self::new();
        for (name, code) in pairs {
            table.insert(name.as_ref(), code.as_ref());
        }
        table
    }

    /// Inserts one alias, replacing any existing entry for the same
    /// normalized key. Returns `false` when the pair was rejected.
    pub fn insert(&mut self, name: &str, code: &str) -> bool {
        let key = normalize_name(name);
        let Some(iso3) = Iso3::parse(code) else {
            return false;
        };
        if key.is_empty() {
            return false;
        }
        self.entries.insert(
            key,
            AliasEntry {
                iso3,
                label: name.trim().to_string(),
            },
        );
        true
    }

    /// Merges tables in order; a later table wins on key collision.
    pub fn merged<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = AliasTable>,
    {
        let mut out = Self::new();
        for table in tables {
            out.entries.extend(table.entries);
        }
        out
    }

    pub fn get(&self, normalized: &str) -> Option<&Iso3> {
        self.entries.get(normalized).map(|e| &e.iso3)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AliasEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.label.as_str())
    }
}

/// Resolves country features to ISO3 codes: embedded code, then static
/// name table, then dynamic aliases.
#[derive(Debug, Clone, Default)]
pub struct IsoResolver {
    aliases: Arc<AliasTable>,
}

impl IsoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: AliasTable) -> Self {
        Self {
            aliases: Arc::new(aliases),
        }
    }

    pub fn set_aliases(&mut self, aliases: AliasTable) {
        self.aliases = Arc::new(aliases);
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Total: every feature yields a code or [`Iso3::unresolved`].
    pub fn resolve(&self, feature: &CountryFeature) -> Iso3 {
        // Lenient: any three-letter candidate is accepted without checking
        // it against a list of real countries.
        if let Some(code) = feature
            .embedded_codes()
            .iter()
            .find_map(|c| Iso3::parse(c))
        {
            return code;
        }
        feature
            .raw_name()
            .and_then(|name| self.resolve_name(name))
            .unwrap_or_default()
    }

    /// Name-only resolution through the static then dynamic tables.
    pub fn resolve_name(&self, raw: &str) -> Option<Iso3> {
        let key = normalize_name(raw);
        if key.is_empty() {
            return None;
        }
        static_lookup(&key)
            .or_else(|| self.aliases.get(&key))
            .cloned()
    }

    /// Whether `normalized` is an alias key (static or dynamic) for `iso3`.
    pub fn alias_matches(&self, normalized: &str, iso3: &Iso3) -> bool {
        if !iso3.is_resolved() {
            return false;
        }
        static_lookup(normalized) == Some(iso3) || self.aliases.get(normalized) == Some(iso3)
    }
}
