//! Display preferences read once at startup and written back on toggle.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use layers::ScaleMode;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Which name a country is labelled with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    #[default]
    Common,
    /// The endonym when one is known.
    Native,
}

impl LabelMode {
    pub fn toggled(self) -> Self {
        match self {
            LabelMode::Common => LabelMode::Native,
            LabelMode::Native => LabelMode::Common,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub label_mode: LabelMode,
    pub theme: Theme,
    /// Last scale mode picked for composite layers.
    pub scale_mode: ScaleMode,
}

pub trait PreferenceStore: Send + Sync {
    /// Stored preferences, or defaults when nothing was saved yet.
    fn load(&self) -> Result<Preferences, EngineError>;

    fn save(&self, preferences: &Preferences) -> Result<(), EngineError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    stored: Mutex<Option<Preferences>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(preferences: Preferences) -> Self {
        Self {
            stored: Mutex::new(Some(preferences)),
        }
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn load(&self) -> Result<Preferences, EngineError> {
        let stored = self.stored.lock().map_err(|e| EngineError::Preferences {
            path: "memory".to_string(),
            reason: e.to_string(),
        })?;
        Ok((*stored).unwrap_or_default())
    }

    fn save(&self, preferences: &Preferences) -> Result<(), EngineError> {
        let mut stored = self.stored.lock().map_err(|e| EngineError::Preferences {
            path: "memory".to_string(),
            reason: e.to_string(),
        })?;
        *stored = Some(*preferences);
        Ok(())
    }
}

/// Preferences kept as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
}

impl JsonFilePreferences {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, reason: impl std::fmt::Display) -> EngineError {
        EngineError::Preferences {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn load(&self) -> Result<Preferences, EngineError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| self.error(e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(self.error(e)),
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        let text = serde_json::to_string_pretty(preferences).map_err(|e| self.error(e))?;
        std::fs::write(&self.path, text).map_err(|e| self.error(e))
    }
}
