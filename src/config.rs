//! Session settings and fixed category layout
//!
//! Defaults match the parts repository this tool was built against:
//! capacity 10 entries per category cache, preload radius 2, 512 px PNG
//! export width.

use serde::{Deserialize, Serialize};

/// Layer stacking order, bottom to top. Also the fetch order at startup.
pub const CATEGORY_ORDER: &[&str] = &[
    "backhair", "bust", "neck", "ears", "head", "eyes", "eyebrows", "nose", "mouth", "freckles",
    "hair", "glasses", "hat",
];

/// Selecting a hair variant drives the back-hair selection through the
/// alignment table; back-hair is never selected directly.
pub const LINK_PRIMARY: &str = "hair";
pub const LINK_FOLLOWER: &str = "backhair";

/// Tunables for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Max resolved/pending entries kept per category cache
    pub cache_capacity: usize,
    /// Neighbors preloaded on each side of a new selection
    pub preload_radius: usize,
    /// Pixel width of PNG exports (height follows the viewBox aspect)
    pub png_width: u32,
    /// How long `select` waits for the target part to settle
    pub fetch_timeout_ms: u64,
    /// Worker thread count, 0 = auto (3/4 of available parallelism)
    pub workers_override: usize,
    /// Categories fetched at session start, in layer order
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_capacity: 10,
            preload_radius: 2,
            png_width: 512,
            fetch_timeout_ms: 30_000,
            workers_override: 0,
            categories: CATEGORY_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Worker count after resolving the auto setting
    pub fn worker_threads(&self) -> usize {
        if self.workers_override > 0 {
            return self.workers_override;
        }
        (std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8)
            * 3
            / 4)
        .max(1)
    }
}
