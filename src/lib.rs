//! visage - layered SVG avatar composer
//!
//! Builds avatars from independently authored SVG part files served by a
//! parts repository. Each category (hair, eyes, nose, ...) has an ordered
//! circular variant list; a session keeps a bounded per-category cache of
//! parsed parts, preloads neighbors around the current selection, keeps
//! the back-hair selection aligned to the hair selection, and composes
//! the active parts into one attributed SVG document for PNG/SVG export.

// Core engine (cache, preload, alignment, session, workers)
pub mod core;

// App modules
pub mod cli;
pub mod compose;
pub mod config;
pub mod entities;
pub mod error;
pub mod export;
pub mod fetch;
pub mod permalink;
pub mod runner;
pub mod svg;

// Re-export commonly used types
pub use config::Settings;
pub use core::align::AlignmentTable;
pub use core::cache::PartStore;
pub use core::session::{Session, SessionEvent};
pub use entities::{Category, Palette, Part, PartLayer, PartStatus, VariantDescriptor};
pub use error::VisageError;
pub use fetch::{DirSource, HttpSource, PartSource};
