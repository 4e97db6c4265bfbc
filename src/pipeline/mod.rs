//! Pipeline entry points.
//!
//! - `run_collect`: Fetch every source and rank the matching postings
//! - `run_pipeline`: Collect, render and deliver the daily digest

pub mod aggregate;
pub mod collect;
pub mod digest;

pub use aggregate::{AggregateStats, Aggregator, dedupe};
pub use collect::{SourceBatch, collect_all};
pub use digest::{render_digest, run_collect, run_pipeline};
