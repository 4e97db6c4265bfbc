//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CardSelectors, SourceConfig};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetching behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Skill and seniority profile postings are matched against
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Ordering and truncation of the final list
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Listing sites, queried in this order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,

    /// Digest presentation
    #[serde(default)]
    pub digest: DigestConfig,

    /// Delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if self.profile.entry_level_phrases.is_empty() {
            return Err(AppError::validation("No entry-level phrases defined"));
        }
        if self.profile.required_skills.is_empty() {
            return Err(AppError::validation("No required skills defined"));
        }
        if self.profile.any_skills.is_empty() {
            return Err(AppError::validation("No any-of skills defined"));
        }
        // A blank term is contained in every text and would match anything
        Self::validate_terms("profile.entry_level_phrases", &self.profile.entry_level_phrases)?;
        Self::validate_terms("profile.required_skills", &self.profile.required_skills)?;
        Self::validate_terms("profile.any_skills", &self.profile.any_skills)?;
        Self::validate_terms("ranking.onsite_phrases", &self.ranking.onsite_phrases)?;
        Self::validate_terms("ranking.city_priority", &self.ranking.city_priority)?;
        if self.ranking.preferred_location.trim().is_empty() {
            return Err(AppError::validation("ranking.preferred_location is empty"));
        }
        if self.ranking.max_results == 0 {
            return Err(AppError::validation("ranking.max_results must be > 0"));
        }
        if self.ranking.unranked_position < self.ranking.city_priority.len() {
            return Err(AppError::validation(
                "ranking.unranked_position must sort after every priority city",
            ));
        }
        if self.notifier.smtp_host.trim().is_empty() || self.notifier.smtp_port == 0 {
            return Err(AppError::validation("notifier SMTP host/port not set"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            Self::validate_source(source)?;
        }
        Ok(())
    }

    fn validate_terms(field: &str, terms: &[String]) -> Result<()> {
        if terms.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::validation(format!("{field} has a blank entry")));
        }
        Ok(())
    }

    fn validate_source(source: &SourceConfig) -> Result<()> {
        if source.name.trim().is_empty() {
            return Err(AppError::validation("Source with empty name"));
        }
        url::Url::parse(&source.url)?;
        if source.selectors.cards.is_empty() {
            return Err(AppError::validation(format!(
                "Source {} has no card selectors",
                source.name
            )));
        }
        for selector in source.selectors.all() {
            Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }

    /// Sources that are switched on, in configured order.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.enabled)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            profile: ProfileConfig::default(),
            ranking: RankingConfig::default(),
            sources: defaults::sources(),
            digest: DigestConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay after each source in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum sources fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Candidate profile used by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Phrases that mark a posting as entry level
    #[serde(default = "defaults::entry_level_phrases")]
    pub entry_level_phrases: Vec<String>,

    /// Skills that must all appear
    #[serde(default = "defaults::required_skills")]
    pub required_skills: Vec<String>,

    /// Skills of which at least one must appear
    #[serde(default = "defaults::any_skills")]
    pub any_skills: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            entry_level_phrases: defaults::entry_level_phrases(),
            required_skills: defaults::required_skills(),
            any_skills: defaults::any_skills(),
        }
    }
}

/// Ranking and truncation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Location substring that earns a preference point
    #[serde(default = "defaults::preferred_location")]
    pub preferred_location: String,

    /// Phrases indicating on-site work, each earning the same single point
    #[serde(default = "defaults::onsite_phrases")]
    pub onsite_phrases: Vec<String>,

    /// Cities in priority order, compared against the whole location
    #[serde(default = "defaults::city_priority")]
    pub city_priority: Vec<String>,

    /// Position given to locations outside `city_priority`
    #[serde(default = "defaults::unranked_position")]
    pub unranked_position: usize,

    /// Maximum postings in a digest
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            preferred_location: defaults::preferred_location(),
            onsite_phrases: defaults::onsite_phrases(),
            city_priority: defaults::city_priority(),
            unranked_position: defaults::unranked_position(),
            max_results: defaults::max_results(),
        }
    }
}

/// Digest presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Subject line, followed by the run date
    #[serde(default = "defaults::subject_prefix")]
    pub subject_prefix: String,

    /// Paragraph shown above the table (trusted HTML)
    #[serde(default = "defaults::headline")]
    pub headline: String,

    /// Paragraph shown when nothing matched
    #[serde(default = "defaults::empty_message")]
    pub empty_message: String,

    /// Label printed after the generation timestamp
    #[serde(default = "defaults::timezone_label")]
    pub timezone_label: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            subject_prefix: defaults::subject_prefix(),
            headline: defaults::headline(),
            empty_message: defaults::empty_message(),
            timezone_label: defaults::timezone_label(),
        }
    }
}

/// Delivery settings. Credentials are read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Environment variable holding the sender address
    #[serde(default = "defaults::sender_env")]
    pub sender_env: String,

    /// Environment variable holding the recipient address
    #[serde(default = "defaults::recipient_env")]
    pub recipient_env: String,

    /// Environment variable holding the SMTP app password
    #[serde(default = "defaults::password_env")]
    pub password_env: String,

    /// SMTP relay host
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port (465 is implicit TLS)
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Upgrade a plain connection with STARTTLS instead of implicit TLS
    #[serde(default)]
    pub smtp_starttls: bool,

    /// Directory messages are written to by offline runs
    #[serde(default = "defaults::outbox_dir")]
    pub outbox_dir: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sender_env: defaults::sender_env(),
            recipient_env: defaults::recipient_env(),
            password_env: defaults::password_env(),
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
            smtp_starttls: false,
            outbox_dir: defaults::outbox_dir(),
        }
    }
}

mod defaults {
    use super::{CardSelectors, SourceConfig};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0".into()
    }
    pub fn timeout() -> u64 {
        25
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Profile defaults
    pub fn entry_level_phrases() -> Vec<String> {
        strings(&[
            "fresher",
            "0 year",
            "0-1 year",
            "0 – 1 year",
            "entry level",
            "entry-level",
            "graduate",
            "campus",
        ])
    }
    pub fn required_skills() -> Vec<String> {
        strings(&["python", "sql"])
    }
    pub fn any_skills() -> Vec<String> {
        strings(&["machine learning", "pandas", "numpy", "visual studio"])
    }

    // Ranking defaults
    pub fn preferred_location() -> String {
        "hyderabad".into()
    }
    pub fn onsite_phrases() -> Vec<String> {
        strings(&["onsite", "on-site", "work from office", "wfo", "office"])
    }
    pub fn city_priority() -> Vec<String> {
        strings(&["hyderabad", "chennai", "bangalore", "bengaluru", "india"])
    }
    pub fn unranked_position() -> usize {
        99
    }
    pub fn max_results() -> usize {
        60
    }

    // Digest defaults
    pub fn subject_prefix() -> String {
        "Daily Fresher Jobs (India)".into()
    }
    pub fn headline() -> String {
        "Daily fresher jobs matching <b>Python, SQL, Machine Learning, Pandas, NumPy, \
         Visual Studio</b> (India). Prefer Hyderabad if onsite."
            .into()
    }
    pub fn empty_message() -> String {
        "No matching fresher jobs found today.".into()
    }
    pub fn timezone_label() -> String {
        "IST".into()
    }

    // Notifier defaults
    pub fn sender_env() -> String {
        "GMAIL_SENDER".into()
    }
    pub fn recipient_env() -> String {
        "RECIPIENT".into()
    }
    pub fn password_env() -> String {
        "GMAIL_APP_PASSWORD".into()
    }
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
    pub fn outbox_dir() -> String {
        "outbox".into()
    }

    // Source defaults
    pub fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "Indeed".to_string(),
                url: "https://in.indeed.com/jobs?q=Python+SQL+%22Machine+Learning%22+Pandas+NumPy+%22Visual+Studio%22+fresher&l=India&fromage=3".to_string(),
                enabled: true,
                selectors: CardSelectors {
                    cards: strings(&["a.tapItem", ".job_seen_beacon"]),
                    title: "h2.jobTitle, span[title]".to_string(),
                    company: Some(".companyName".to_string()),
                    location: Some(".companyLocation".to_string()),
                    snippet: Some(".job-snippet".to_string()),
                    link: None,
                    link_attr: "href".to_string(),
                },
                default_location: None,
            },
            SourceConfig {
                name: "Naukri".to_string(),
                url: "https://www.naukri.com/python-sql-machine-learning-pandas-numpy-visual-studio-0-years-jobs".to_string(),
                enabled: true,
                selectors: CardSelectors {
                    cards: strings(&[".srp-jobtuple, .jobTuple"]),
                    title: "a.title, a[href]".to_string(),
                    company: Some(".subTitle, .companyInfo .comp-name, .comp-name".to_string()),
                    location: Some(".loc, .job-location".to_string()),
                    snippet: Some(".job-description, .job-desc".to_string()),
                    link: Some("a.title, a[href]".to_string()),
                    link_attr: "href".to_string(),
                },
                default_location: None,
            },
            SourceConfig {
                name: "Foundit".to_string(),
                url: "https://www.foundit.in/srp/results?query=Python%20SQL%20Machine%20Learning%20Pandas%20NumPy%20Visual%20Studio&experience=0".to_string(),
                enabled: true,
                selectors: CardSelectors {
                    cards: strings(&["[data-job-id], .srpResultCard"]),
                    title: "a[href]".to_string(),
                    company: Some(".company-name, .company".to_string()),
                    location: Some(".location, .job-location".to_string()),
                    snippet: Some(".job-descrip, .job-desc".to_string()),
                    link: Some("a[href]".to_string()),
                    link_attr: "href".to_string(),
                },
                default_location: Some("India".to_string()),
            },
        ]
    }
}
