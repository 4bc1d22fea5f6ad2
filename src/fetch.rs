//! Part sources: where listings and assets come from
//!
//! [`PartSource`] is the seam between the cache machinery and the parts
//! repository. [`HttpSource`] talks to a parts server with a blocking
//! client (fetch jobs already run on worker threads); [`DirSource`] reads
//! the same layout from a local directory, which is also what the tests
//! use via an in-memory mock.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::entities::variant::{self, VariantDescriptor};
use crate::error::VisageError;

/// External parts repository
pub trait PartSource: Send + Sync {
    /// Ordered variant descriptors for one category. Failure is fatal
    /// for the category.
    fn list_variants(&self, category: &str) -> Result<Vec<VariantDescriptor>, VisageError>;

    /// Raw SVG text for one variant
    fn fetch_part(&self, category: &str, name: &str) -> Result<String, VisageError>;
}

/// Parts server over HTTP
pub struct HttpSource {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self, VisageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("visage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VisageError::Transport(e.to_string()))?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn get_text(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        response.text().map_err(|e| e.to_string())
    }
}

impl PartSource for HttpSource {
    fn list_variants(&self, category: &str) -> Result<Vec<VariantDescriptor>, VisageError> {
        let url = format!("{}/parts/{}/index.html", self.base, category);
        debug!("listing {}", url);
        let html = self
            .get_text(&url)
            .map_err(|reason| VisageError::ListingFetch {
                category: category.to_string(),
                reason,
            })?;
        Ok(variant::parse_listing(category, &html))
    }

    fn fetch_part(&self, category: &str, name: &str) -> Result<String, VisageError> {
        let url = format!("{}/parts/{}/{}", self.base, category, name);
        debug!("fetching {}", url);
        self.get_text(&url).map_err(|reason| VisageError::AssetFetch {
            category: category.to_string(),
            name: name.to_string(),
            reason,
        })
    }
}

/// Parts repository checked out on disk, same layout as the server
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PartSource for DirSource {
    fn list_variants(&self, category: &str) -> Result<Vec<VariantDescriptor>, VisageError> {
        let path = self.root.join(category).join("index.html");
        let html = std::fs::read_to_string(&path).map_err(|e| VisageError::ListingFetch {
            category: category.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(variant::parse_listing(category, &html))
    }

    fn fetch_part(&self, category: &str, name: &str) -> Result<String, VisageError> {
        let path = self.root.join(category).join(name);
        std::fs::read_to_string(&path).map_err(|e| VisageError::AssetFetch {
            category: category.to_string(),
            name: name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
