//! The external dataset source seam.
//!
//! The engine never owns transport: it asks a [DatasetProvider] for the raw
//! text of a named resource and copes with whatever comes back. Two
//! implementations ship with the crate — a blocking HTTP provider (behind the
//! `http` feature) for the common static-hosting layout, and an in-memory
//! provider for tests, demos, and embedded data.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "http")]
use std::time::Duration;

#[cfg(feature = "http")]
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Source of raw dataset text, fetched by resource name.
pub trait DatasetProvider {
    fn fetch(&self, resource: &str) -> Result<String, FetchError>;
}

/// Errors encountered while retrieving a named resource.
#[derive(Debug)]
pub enum FetchError {
    #[cfg(feature = "http")]
    Http(reqwest::Error),
    Status(u16),
    Missing(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "http")]
            FetchError::Http(err) => write!(f, "transport error: {err}"),
            FetchError::Status(code) => write!(f, "status {code}"),
            FetchError::Missing(resource) => write!(f, "no such resource '{resource}'"),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}

/// Blocking HTTP provider for datasets published as `{base_url}/{name}.json`.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpDatasetProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpDatasetProvider {
    /// Create a provider rooted at `base_url` (e.g. `http://localhost:3000/data`).
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build dataset HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}.json", self.base_url, resource)
    }
}

#[cfg(feature = "http")]
impl DatasetProvider for HttpDatasetProvider {
    fn fetch(&self, resource: &str) -> Result<String, FetchError> {
        let response = self.client.get(self.resource_url(resource)).send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.text()?)
    }
}

/// In-memory provider: resources registered up front, anything else missing.
#[derive(Debug, Clone, Default)]
pub struct StaticDatasetProvider {
    entries: HashMap<String, String>,
}

impl StaticDatasetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a resource body.
    pub fn with(mut self, resource: &str, body: &str) -> Self {
        self.insert(resource, body);
        self
    }

    pub fn insert(&mut self, resource: &str, body: &str) {
        self.entries.insert(resource.to_string(), body.to_string());
    }
}

impl DatasetProvider for StaticDatasetProvider {
    fn fetch(&self, resource: &str) -> Result<String, FetchError> {
        self.entries
            .get(resource)
            .cloned()
            .ok_or_else(|| FetchError::Missing(resource.to_string()))
    }
}
