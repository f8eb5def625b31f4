//! Where dataset bytes come from.
//!
//! A [`DataSource`] resolves a relative location (e.g. `data/readiness.json`)
//! to raw bytes. Implementations cover the local filesystem, an HTTP base
//! URL, and an in-memory map for tests and embedding.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use crate::error::CatalogError;

/// Boxed future so the trait stays dyn-compatible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait DataSource: Send + Sync {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    fn fetch(&self, location: &str) -> BoxFuture<'_, Result<Vec<u8>, CatalogError>>;
}

/// Reads locations relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }

    fn fetch(&self, location: &str) -> BoxFuture<'_, Result<Vec<u8>, CatalogError>> {
        let path = self.root.join(location);
        let location = location.to_string();
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(CatalogError::NotFound { location })
                }
                Err(e) => Err(CatalogError::Io {
                    location,
                    reason: e.to_string(),
                }),
            }
        })
    }
}

/// Fetches locations relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn url_for(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            return location.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }
}

impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch(&self, location: &str) -> BoxFuture<'_, Result<Vec<u8>, CatalogError>> {
        let url = self.url_for(location);
        Box::pin(async move {
            let http_err = |reason: String| CatalogError::Http {
                location: url.clone(),
                reason,
            };
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| http_err(e.to_string()))?;

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(CatalogError::NotFound {
                    location: url.clone(),
                });
            }
            if !resp.status().is_success() {
                return Err(http_err(format!("HTTP error: {}", resp.status())));
            }
            let bytes = resp.bytes().await.map_err(|e| http_err(e.to_string()))?;
            Ok(bytes.to_vec())
        })
    }
}

/// Serves fixed payloads; locations can be given an artificial delay.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, location: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        self.insert(location, payload);
        self
    }

    pub fn with_delay(mut self, location: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(location.into(), delay);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.files.insert(location.into(), payload.into());
    }
}

impl DataSource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory:{} files", self.files.len())
    }

    fn fetch(&self, location: &str) -> BoxFuture<'_, Result<Vec<u8>, CatalogError>> {
        let location = location.to_string();
        Box::pin(async move {
            if let Some(delay) = self.delays.get(&location) {
                tokio::time::sleep(*delay).await;
            }
            self.files
                .get(&location)
                .cloned()
                .ok_or(CatalogError::NotFound { location })
        })
    }
}
