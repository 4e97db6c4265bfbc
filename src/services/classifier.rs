// src/services/classifier.rs

//! Seniority and skill classification of posting text.
//!
//! Both predicates accept arbitrary text; matching ignores case and
//! runs of whitespace.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{Posting, ProfileConfig};
use crate::utils::text::clean;

/// Two or more years of experience, e.g. "3 years", "5+ yrs", "2yrs".
const EXPERIENCE_PATTERN: &str = r"\b([2-9]\+?\s*years?|[2-9]\s*yrs)\b";

/// An explicit zero-to-one years range, e.g. "0-1 years", "0 - 1 yr".
const ZERO_TO_ONE_PATTERN: &str = r"\b0\s*-\s*1\s*(years?|yrs?)\b";

/// Classifier built from a candidate profile.
#[derive(Debug, Clone)]
pub struct Classifier {
    entry_level_phrases: Vec<String>,
    required_skills: Vec<String>,
    any_skills: Vec<String>,
    experience: Regex,
    zero_to_one: Regex,
}

impl Classifier {
    /// Create a classifier from the given profile.
    pub fn new(profile: &ProfileConfig) -> Result<Self> {
        Ok(Self {
            entry_level_phrases: lowercase_all(&profile.entry_level_phrases),
            required_skills: lowercase_all(&profile.required_skills),
            any_skills: lowercase_all(&profile.any_skills),
            experience: compile(EXPERIENCE_PATTERN)?,
            zero_to_one: compile(ZERO_TO_ONE_PATTERN)?,
        })
    }

    /// Whether the text describes an entry-level role.
    ///
    /// A matched entry-level phrase is overridden by an explicit 2+ years
    /// requirement. Text without such a phrase still passes on an explicit
    /// "0-1 years" range, and that branch skips the experience check.
    pub fn is_entry_level(&self, text: &str) -> bool {
        self.entry_level_in(&normalize(text))
    }

    /// Whether the text names every required skill and at least one of the rest.
    pub fn has_required_skills(&self, text: &str) -> bool {
        self.skills_in(&normalize(text))
    }

    /// Both predicates evaluated against a posting's searchable text.
    pub fn matches(&self, posting: &Posting) -> bool {
        let text = posting.search_text();
        self.entry_level_in(&text) && self.skills_in(&text)
    }

    fn entry_level_in(&self, text: &str) -> bool {
        if self.entry_level_phrases.iter().any(|p| text.contains(p.as_str())) {
            return !self.experience.is_match(text);
        }
        self.zero_to_one.is_match(text)
    }

    fn skills_in(&self, text: &str) -> bool {
        self.required_skills.iter().all(|s| text.contains(s.as_str()))
            && self.any_skills.iter().any(|s| text.contains(s.as_str()))
    }
}

/// Lower-cased with whitespace collapsed, the form profile terms are kept in.
fn normalize(text: &str) -> String {
    clean(text).to_lowercase()
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| normalize(s)).collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::config(format!("bad pattern {pattern}: {e}")))
}
