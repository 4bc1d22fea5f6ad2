//! Core engine: part cache, preload scheduling, alignment and session

pub mod align;
pub mod cache;
pub mod preload;
pub mod session;
pub mod workers;
