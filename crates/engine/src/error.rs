use catalog::CatalogError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Country outlines could not be loaded; the map cannot render.
    Geometry(CatalogError),
    Config { source: String, reason: String },
    Preferences { path: String, reason: String },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Geometry(e) => write!(f, "map geometry unavailable: {e}"),
            EngineError::Config { source, reason } => {
                write!(f, "invalid configuration in {source}: {reason}")
            }
            EngineError::Preferences { path, reason } => {
                write!(f, "preferences at {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for EngineError {
    fn from(value: CatalogError) -> Self {
        EngineError::Geometry(value)
    }
}
