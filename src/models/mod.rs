// src/models/mod.rs

//! Domain models for the digest application.

mod config;
mod posting;
mod source;

// Re-export all public types
pub use config::{Config, DigestConfig, FetchConfig, NotifierConfig, ProfileConfig, RankingConfig};
pub use posting::{DedupKey, Posting};
pub use source::{CardSelectors, SourceConfig};
