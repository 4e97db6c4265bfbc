// src/utils/text.rs

//! Text normalization helpers.

/// Collapse every run of whitespace into a single space and trim both ends.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join fields with single spaces, then lower-case and normalize whitespace.
///
/// Empty fields leave no trace in the result, so four empty fields yield `""`.
pub fn searchable(fields: &[&str]) -> String {
    clean(&fields.join(" ")).to_lowercase()
}

/// Escape text for safe inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean("  Python \n\t Developer  "), "Python Developer");
        assert_eq!(clean(""), "");
        assert_eq!(clean(" \n "), "");
    }

    #[test]
    fn test_searchable_joins_and_lowercases() {
        assert_eq!(
            searchable(&["Data  Analyst", "Acme", "", "SQL"]),
            "data analyst acme sql"
        );
        assert_eq!(searchable(&["", "", "", ""]), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D"</b> 'x'"#),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt; &#39;x&#39;"
        );
    }
}
