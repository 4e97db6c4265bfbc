// src/pipeline/digest.rs

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, Posting};
use crate::services::{
    Classifier, DeliveryReceipt, Digest, DigestRenderer, Notifier, Recipient, build_sources,
};
use crate::utils::{http, report};

use super::aggregate::Aggregator;
use super::collect::collect_all;

/// Fetch every enabled source and return the ranked, capped postings.
pub async fn run_collect(config: &Config) -> Result<Vec<Posting>> {
    let aggregator = Aggregator::new(
        Classifier::new(&config.profile)?,
        config.ranking.clone(),
    );
    let client = http::create_client(&config.fetch)?;
    let sources = build_sources(config.enabled_sources(), &client);

    log::info!("Querying {} sources", sources.len());
    let batches = collect_all(&sources, &config.fetch).await;

    let per_source: Vec<(&str, String)> = batches
        .iter()
        .map(|b| (b.source.as_str(), b.postings.len().to_string()))
        .collect();
    report::summary("Sources", &per_source);

    let (postings, stats) =
        aggregator.aggregate_with_stats(batches.into_iter().map(|b| b.postings).collect())?;

    report::summary(
        "Aggregation",
        &[
            ("Fetched", stats.flattened.to_string()),
            ("Matched profile", stats.matched.to_string()),
            ("Unique", stats.unique.to_string()),
            ("Kept", stats.kept.to_string()),
        ],
    );

    Ok(postings)
}

/// Render postings with the configured digest settings, stamped now.
pub fn render_digest(config: &Config, postings: &[Posting]) -> Digest {
    DigestRenderer::new(config.digest.clone()).render(postings, Local::now())
}

/// Run the full pipeline: collect → aggregate → render → deliver.
pub async fn run_pipeline(
    config: &Config,
    notifier: &dyn Notifier,
    recipient: &Recipient,
) -> Result<DeliveryReceipt> {
    report::header("Job digest run");

    report::step(1, 3, "Collect - Fetching and ranking postings");
    let postings = run_collect(config).await?;

    report::step(2, 3, "Render - Building digest");
    let digest = render_digest(config, &postings);
    if digest.is_empty() {
        log::warn!("No postings matched the profile; sending placeholder digest");
    }

    report::step(3, 3, "Deliver - Sending digest");
    let receipt = notifier.deliver(&digest, recipient).await?;

    log::info!(
        "✓ Delivered {} postings to {}",
        digest.posting_count,
        receipt.recipient
    );
    Ok(receipt)
}
