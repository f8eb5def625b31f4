#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound { location: String },
    Io { location: String, reason: String },
    Http { location: String, reason: String },
    Timeout { location: String, after_ms: u64 },
    Corrupt { location: String, reason: String },
}

impl CatalogError {
    pub fn location(&self) -> &str {
        match self {
            CatalogError::NotFound { location }
            | CatalogError::Io { location, .. }
            | CatalogError::Http { location, .. }
            | CatalogError::Timeout { location, .. }
            | CatalogError::Corrupt { location, .. } => location,
        }
    }

    pub fn corrupt(location: &str, reason: impl std::fmt::Display) -> Self {
        CatalogError::Corrupt {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound { location } => write!(f, "dataset not found: {location}"),
            CatalogError::Io { location, reason } => {
                write!(f, "failed to read {location}: {reason}")
            }
            CatalogError::Http { location, reason } => {
                write!(f, "request for {location} failed: {reason}")
            }
            CatalogError::Timeout { location, after_ms } => {
                write!(f, "loading {location} timed out after {after_ms} ms")
            }
            CatalogError::Corrupt { location, reason } => {
                write!(f, "dataset {location} is corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
