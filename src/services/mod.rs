//! Service layer for the digest application.
//!
//! - Posting classification (`Classifier`)
//! - Listing site adapters (`SourceAdapter`, `HtmlSource`)
//! - Digest rendering (`DigestRenderer`)
//! - Digest delivery (`Notifier`, `SmtpNotifier`, `OutboxNotifier`)

mod classifier;
mod notifier;
mod renderer;
mod sources;

pub use classifier::Classifier;
pub use notifier::{DeliveryReceipt, Notifier, OutboxNotifier, Recipient, SmtpNotifier};
pub use renderer::{Digest, DigestRenderer};
pub use sources::{HtmlSource, SourceAdapter, build_sources};
