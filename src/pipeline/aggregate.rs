// src/pipeline/aggregate.rs

//! Aggregation of per-source postings into a ranked digest list.
//!
//! Stages, in order: flatten → normalize → filter → deduplicate → rank → cap.
//! Nothing here performs I/O; the same input always yields the same output.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{Posting, RankingConfig};
use crate::services::Classifier;
use crate::utils::text::clean;

/// Posting counts after each stage, for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub flattened: usize,
    pub matched: usize,
    pub unique: usize,
    pub kept: usize,
}

/// Filters, deduplicates, ranks and caps postings.
#[derive(Debug, Clone)]
pub struct Aggregator {
    classifier: Classifier,
    ranking: RankingConfig,
    preferred_location: String,
    onsite_phrases: Vec<String>,
    city_priority: Vec<String>,
}

impl Aggregator {
    /// Create an aggregator from a classifier and ranking settings.
    pub fn new(classifier: Classifier, ranking: RankingConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items.iter().map(|s| clean(s).to_lowercase()).collect()
        };
        Self {
            classifier,
            preferred_location: clean(&ranking.preferred_location).to_lowercase(),
            onsite_phrases: lower(&ranking.onsite_phrases),
            city_priority: lower(&ranking.city_priority),
            ranking,
        }
    }

    /// Run every stage over the per-source batches, given in source order.
    ///
    /// Fails only when a posting has no source, which no adapter produces.
    pub fn aggregate(&self, batches: Vec<Vec<Posting>>) -> Result<Vec<Posting>> {
        self.aggregate_with_stats(batches).map(|(postings, _)| postings)
    }

    /// Same as [`Aggregator::aggregate`], also returning stage counts.
    pub fn aggregate_with_stats(
        &self,
        batches: Vec<Vec<Posting>>,
    ) -> Result<(Vec<Posting>, AggregateStats)> {
        let flattened: Vec<Posting> = batches
            .into_iter()
            .flatten()
            .map(Posting::normalized)
            .collect();
        if let Some(bad) = flattened.iter().find(|p| p.source.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "posting without a source: {:?}",
                bad.title
            )));
        }

        let mut stats = AggregateStats {
            flattened: flattened.len(),
            ..AggregateStats::default()
        };

        let matched: Vec<Posting> = flattened
            .into_iter()
            .filter(|p| self.classifier.matches(p))
            .collect();
        stats.matched = matched.len();

        let mut unique = dedupe(matched);
        stats.unique = unique.len();

        self.rank(&mut unique);
        unique.truncate(self.ranking.max_results);
        stats.kept = unique.len();

        log::debug!(
            "Aggregated {} → {} matched → {} unique → {} kept",
            stats.flattened,
            stats.matched,
            stats.unique,
            stats.kept
        );

        Ok((unique, stats))
    }

    /// Preference score: one point for the preferred location, one for on-site work.
    pub fn preference_score(&self, posting: &Posting) -> u8 {
        let preferred = location_of(posting).contains(self.preferred_location.as_str());
        let text = posting.search_text();
        let onsite = self
            .onsite_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()));
        u8::from(preferred) + u8::from(onsite)
    }

    /// Index of the whole location in the city priority list.
    pub fn city_position(&self, posting: &Posting) -> usize {
        let location = location_of(posting);
        if location.is_empty() {
            return self.ranking.unranked_position;
        }
        self.city_priority
            .iter()
            .position(|city| *city == location)
            .unwrap_or(self.ranking.unranked_position)
    }

    /// Composite ranking key; smaller sorts first.
    pub fn rank_key(&self, posting: &Posting) -> (Reverse<u8>, usize, String) {
        (
            Reverse(self.preference_score(posting)),
            self.city_position(posting),
            posting.source.clone(),
        )
    }

    /// Stable sort: higher preference, then city position, then source name.
    pub fn rank(&self, postings: &mut [Posting]) {
        postings.sort_by_cached_key(|p| self.rank_key(p));
    }
}

fn location_of(posting: &Posting) -> String {
    clean(&posting.location).to_lowercase()
}

/// Keep the first posting for each dedup key, preserving order.
pub fn dedupe(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    postings
        .into_iter()
        .filter(|p| seen.insert(p.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileConfig;

    fn aggregator() -> Aggregator {
        let classifier = Classifier::new(&ProfileConfig::default()).unwrap();
        Aggregator::new(classifier, RankingConfig::default())
    }

    /// A posting that passes both classifier predicates.
    fn valid(source: &str, title: &str, location: &str, snippet: &str) -> Posting {
        Posting::new(
            source,
            title,
            "Acme",
            location,
            &format!("https://example.com/{}/{}", source, title.replace(' ', "-")),
            &format!("fresher python sql pandas {snippet}"),
        )
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregator();
        assert!(agg.aggregate(vec![]).unwrap().is_empty());
        assert!(agg.aggregate(vec![vec![], vec![], vec![]]).unwrap().is_empty());
    }

    #[test]
    fn test_filter_drops_non_matching() {
        let agg = aggregator();
        let senior = Posting::new(
            "Indeed",
            "Senior Python Engineer",
            "Acme",
            "Chennai",
            "https://example.com/senior",
            "python sql pandas 5+ years",
        );
        let ok = valid("Indeed", "Junior Analyst", "Chennai", "");
        let out = agg.aggregate(vec![vec![senior, ok.clone()]]).unwrap();
        assert_eq!(out, vec![ok]);
    }

    #[test]
    fn test_duplicate_keeps_first_occurrence() {
        let agg = aggregator();
        let a = Posting::new(
            "Indeed",
            "Python Developer Fresher",
            "Acme",
            "Hyderabad",
            "https://example.com/job/1",
            "onsite, 0-1 years, python sql pandas",
        );
        let b = Posting::new(
            "Naukri",
            "python developer fresher",
            "ACME",
            "Hyderabad",
            "https://example.com/job/1",
            "duplicate test python sql numpy",
        );
        let out = agg.aggregate(vec![vec![a.clone()], vec![b]]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].snippet, a.snippet);
        assert_eq!(out[0].source, "Indeed");
    }

    #[test]
    fn test_raw_whitespace_is_normalized_before_dedupe() {
        let agg = aggregator();
        let tidy = valid("Indeed", "Python Developer", "Chennai", "");
        let raw = Posting {
            source: "Naukri".into(),
            title: "  Python   Developer ".into(),
            location: " Chennai ".into(),
            link: format!(" {} ", tidy.link),
            ..tidy.clone()
        };

        let (out, stats) = agg
            .aggregate_with_stats(vec![vec![raw], vec![tidy]])
            .unwrap();
        assert_eq!(stats.unique, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "Naukri");
        assert_eq!(out[0].title, "Python Developer");
        assert_eq!(out[0].location, "Chennai");
        assert_eq!(agg.city_position(&out[0]), 1);
    }

    #[test]
    fn test_dedupe_distinguishes_links() {
        let a = valid("Indeed", "Analyst", "Chennai", "");
        let b = Posting {
            link: "https://example.com/other".into(),
            ..a.clone()
        };
        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_hyderabad_onsite_ranks_before_chennai() {
        let agg = aggregator();
        let chennai = valid("Indeed", "Analyst", "Chennai", "");
        let hyderabad = Posting {
            location: "Hyderabad".into(),
            snippet: format!("{} work from office", chennai.snippet),
            link: "https://example.com/hyd".into(),
            ..chennai.clone()
        };
        let out = agg
            .aggregate(vec![vec![chennai.clone(), hyderabad.clone()]])
            .unwrap();
        assert_eq!(out, vec![hyderabad, chennai]);
    }

    #[test]
    fn test_preference_score() {
        let agg = aggregator();
        let remote = valid("Indeed", "Analyst", "Chennai", "remote");
        let onsite = valid("Indeed", "Analyst", "Pune", "wfo");
        let both = valid("Indeed", "Analyst", "Hyderabad, Telangana", "on-site");
        assert_eq!(agg.preference_score(&remote), 0);
        assert_eq!(agg.preference_score(&onsite), 1);
        assert_eq!(agg.preference_score(&both), 2);
    }

    #[test]
    fn test_city_position_is_exact_match() {
        let agg = aggregator();
        assert_eq!(agg.city_position(&valid("X", "a", "Hyderabad", "")), 0);
        assert_eq!(agg.city_position(&valid("X", "a", "BENGALURU", "")), 3);
        assert_eq!(agg.city_position(&valid("X", "a", "India", "")), 4);
        assert_eq!(agg.city_position(&valid("X", "a", "Chennai, Tamil Nadu", "")), 99);
        assert_eq!(agg.city_position(&valid("X", "a", "", "")), 99);

        let padded = Posting {
            location: " Chennai ".into(),
            ..valid("X", "a", "", "")
        };
        assert_eq!(agg.city_position(&padded), 1);
    }

    #[test]
    fn test_secondary_and_tertiary_keys() {
        let agg = aggregator();
        let india = valid("Foundit", "a", "India", "");
        let chennai_naukri = valid("Naukri", "b", "Chennai", "");
        let chennai_indeed = valid("Indeed", "c", "Chennai", "");
        let pune = valid("Alpha", "d", "Pune", "");
        let out = agg
            .aggregate(vec![vec![
                pune.clone(),
                india.clone(),
                chennai_naukri.clone(),
                chennai_indeed.clone(),
            ]])
            .unwrap();
        assert_eq!(out, vec![chennai_indeed, chennai_naukri, india, pune]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let agg = aggregator();
        let first = valid("Indeed", "First", "Chennai", "");
        let second = valid("Indeed", "Second", "Chennai", "");
        let third = valid("Indeed", "Third", "Chennai", "");
        let out = agg
            .aggregate(vec![vec![first.clone(), second.clone()], vec![third.clone()]])
            .unwrap();
        assert_eq!(out, vec![first, second, third]);
    }

    #[test]
    fn test_cap_keeps_top_sixty() {
        let agg = aggregator();
        let cities = ["Hyderabad", "Chennai", "Bangalore", "Pune", ""];
        let batches: Vec<Vec<Posting>> = (0..100)
            .map(|i| {
                let extra = if i % 3 == 0 { "office" } else { "" };
                vec![valid(
                    &format!("source-{i:03}"),
                    &format!("Analyst {i}"),
                    cities[i % cities.len()],
                    extra,
                )]
            })
            .collect();

        let (out, stats) = agg.aggregate_with_stats(batches.clone()).unwrap();
        assert_eq!(out.len(), 60);
        assert_eq!(stats.flattened, 100);
        assert_eq!(stats.unique, 100);
        assert_eq!(stats.kept, 60);

        let mut all: Vec<Posting> = batches.into_iter().flatten().collect();
        agg.rank(&mut all);
        assert_eq!(out[..], all[..60]);

        for pair in out.windows(2) {
            assert!(agg.rank_key(&pair[0]) <= agg.rank_key(&pair[1]));
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let agg = aggregator();
        let input = vec![
            vec![
                valid("Naukri", "b", "Chennai", "office"),
                valid("Naukri", "a", "", ""),
            ],
            vec![valid("Indeed", "c", "Hyderabad", "")],
        ];
        let once = agg.aggregate(input.clone()).unwrap();
        let twice = agg.aggregate(input).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_source_fails_loudly() {
        let agg = aggregator();
        let mut posting = valid("Indeed", "a", "Chennai", "");
        posting.source.clear();
        assert!(matches!(
            agg.aggregate(vec![vec![posting]]),
            Err(AppError::Validation(_))
        ));
    }
}
