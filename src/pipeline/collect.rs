// src/pipeline/collect.rs

//! Fetching postings from every source.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::models::{FetchConfig, Posting};
use crate::services::SourceAdapter;

/// Postings from one source, tagged with its name for the run report.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub postings: Vec<Posting>,
}

/// Query every source once and return one batch per source, in input order.
///
/// Sources may run concurrently up to `max_concurrent`, but results are
/// yielded in source order. A failing source contributes an empty batch.
pub async fn collect_all(
    sources: &[Box<dyn SourceAdapter>],
    fetch: &FetchConfig,
) -> Vec<SourceBatch> {
    let delay = Duration::from_millis(fetch.request_delay_ms);
    let concurrency = fetch.max_concurrent.max(1);

    let mut batch_stream = stream::iter(sources)
        .map(|source| async move {
            SourceBatch {
                source: source.name().to_string(),
                postings: source.fetch_or_empty().await,
            }
        })
        .buffered(concurrency);

    let mut batches = Vec::with_capacity(sources.len());
    while let Some(batch) = batch_stream.next().await {
        batches.push(batch);

        if !delay.is_zero() && batches.len() < sources.len() {
            tokio::time::sleep(delay).await;
        }
    }
    batches
}
