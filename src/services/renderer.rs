// src/services/renderer.rs

//! HTML digest rendering.

use chrono::{DateTime, Local};

use crate::models::{DigestConfig, Posting};
use crate::utils::text::escape_html;

/// A rendered digest, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub posting_count: usize,
    pub generated_at: DateTime<Local>,
}

impl Digest {
    /// Whether the digest carries the "no matches" placeholder.
    pub fn is_empty(&self) -> bool {
        self.posting_count == 0
    }
}

/// Renders ranked postings into an HTML digest.
pub struct DigestRenderer {
    config: DigestConfig,
}

impl DigestRenderer {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Render postings in the order given.
    pub fn render(&self, postings: &[Posting], generated_at: DateTime<Local>) -> Digest {
        let html = if postings.is_empty() {
            format!("<p>{}</p>", escape_html(&self.config.empty_message))
        } else {
            self.render_table(postings, generated_at)
        };

        Digest {
            subject: self.subject(generated_at),
            html,
            posting_count: postings.len(),
            generated_at,
        }
    }

    /// Subject line for the given run date.
    pub fn subject(&self, generated_at: DateTime<Local>) -> String {
        format!(
            "{} – {}",
            self.config.subject_prefix,
            generated_at.format("%Y-%m-%d")
        )
    }

    fn render_table(&self, postings: &[Posting], generated_at: DateTime<Local>) -> String {
        let mut html = String::new();

        html.push_str(&format!("<p>{}</p>\n", self.config.headline));
        html.push_str(
            "<table border=\"1\" cellspacing=\"0\" cellpadding=\"6\" \
             style=\"border-collapse:collapse;font-family:Arial;font-size:14px\">\n",
        );
        html.push_str("  <thead>\n");
        html.push_str(
            "    <tr><th>Source</th><th>Title</th><th>Company</th>\
             <th>Location</th><th>Summary</th></tr>\n",
        );
        html.push_str("  </thead>\n");
        html.push_str("  <tbody>\n");

        for posting in postings {
            html.push_str("    <tr>\n");
            html.push_str(&format!("      <td>{}</td>\n", escape_html(&posting.source)));
            html.push_str(&format!(
                "      <td><a href=\"{}\" target=\"_blank\">{}</a></td>\n",
                escape_html(&posting.link),
                escape_html(&posting.title)
            ));
            html.push_str(&format!("      <td>{}</td>\n", escape_html(&posting.company)));
            html.push_str(&format!("      <td>{}</td>\n", escape_html(&posting.location)));
            html.push_str(&format!(
                "      <td style=\"max-width:600px\">{}</td>\n",
                escape_html(&posting.snippet)
            ));
            html.push_str("    </tr>\n");
        }

        html.push_str("  </tbody>\n");
        html.push_str("</table>\n");
        html.push_str(&format!(
            "<p style=\"font-size:12px;color:#666\">Generated on {} {}</p>\n",
            generated_at.format("%Y-%m-%d %H:%M:%S"),
            escape_html(&self.config.timezone_label)
        ));

        html
    }
}
