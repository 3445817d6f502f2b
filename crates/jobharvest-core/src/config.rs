//! Run configuration: three-tier resolution of flags, environment and defaults.
//!
//! For every field the highest-ranked source that provides a value wins:
//! explicit flag > environment variable > built-in default. A blank flag counts
//! as not given. An environment variable counts as soon as it is set, even to
//! an empty string.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;
use crate::guard::OUTPUT_FILE_NAME;
use crate::models::SearchQuery;
use crate::traits::EnvSource;
use crate::util::{non_blank, parse_env_bool, split_list, split_unique_list};

pub const ENV_SITE_NAME: &str = "SITE_NAME";
pub const ENV_SEARCH_TERMS: &str = "SEARCH_TERMS";
pub const ENV_GOOGLE_SEARCH_TERM: &str = "GOOGLE_SEARCH_TERM";
pub const ENV_LOCATION: &str = "LOCATION";
pub const ENV_RESULTS_WANTED: &str = "RESULTS_WANTED";
pub const ENV_HOURS_OLD: &str = "HOURS_OLD";
pub const ENV_COUNTRY_INDEED: &str = "COUNTRY_INDEED";
pub const ENV_LINKEDIN_FETCH_DESCRIPTION: &str = "LINKEDIN_FETCH_DESCRIPTION";
pub const ENV_DATA_DIR: &str = "DATA_DIR";

pub const DEFAULT_SITES: &str = "indeed,linkedin,glassdoor";
pub const DEFAULT_SEARCH_TERMS: &str = "Azure,devops";
pub const DEFAULT_LOCATION: &str = "Canada";
pub const DEFAULT_RESULTS_WANTED: u32 = 20;
pub const DEFAULT_HOURS_OLD: u32 = 24;
pub const DEFAULT_COUNTRY_INDEED: &str = "canada";
pub const DEFAULT_LINKEDIN_FETCH_DESCRIPTION: bool = true;
pub const DEFAULT_DATA_DIR: &str = "/DATA";

/// Raw values of the command-line flags, before any resolution.
///
/// Numeric flags are kept as strings so malformed values are reported
/// as configuration errors by the resolver rather than by the flag parser.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub site: Option<String>,
    pub terms: Option<String>,
    pub google_term: Option<String>,
    pub location: Option<String>,
    pub results: Option<String>,
    pub hours_old: Option<String>,
    pub country_indeed: Option<String>,
    pub linkedin_fetch_description: bool,
    pub no_linkedin_fetch_description: bool,
    pub data_dir: Option<String>,
}

/// Fully resolved, immutable parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub sites: Vec<String>,
    pub search_terms: Vec<String>,
    pub google_search_term_override: Option<String>,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
    pub linkedin_fetch_description: bool,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// `<output_dir>/flat_jobs_list.csv`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE_NAME)
    }

    /// The Google search term for `term`: the fixed override if one was
    /// configured, otherwise the term itself.
    pub fn google_term_for<'a>(&'a self, term: &'a str) -> &'a str {
        self.google_search_term_override.as_deref().unwrap_or(term)
    }

    /// Build the provider query for one search term.
    pub fn query_for(&self, term: &str) -> SearchQuery {
        SearchQuery {
            sites: self.sites.clone(),
            search_term: term.to_string(),
            google_search_term: self.google_term_for(term).to_string(),
            location: self.location.clone(),
            results_wanted: self.results_wanted,
            hours_old: self.hours_old,
            country_indeed: self.country_indeed.clone(),
            linkedin_fetch_description: self.linkedin_fetch_description,
        }
    }
}

/// Non-fatal oddities noticed while resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Both `--linkedin-fetch-description` and `--no-linkedin-fetch-description` were given.
    ConflictingLinkedinFlags,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::ConflictingLinkedinFlags => write!(
                f,
                "Both --linkedin-fetch-description and --no-linkedin-fetch-description set; prefer disable."
            ),
        }
    }
}

/// A resolved config together with any warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: RunConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolves a [`RunConfig`] from flags and an environment.
pub struct ConfigResolver<'a, E: EnvSource> {
    flags: &'a ConfigFlags,
    env: &'a E,
}

impl<'a, E: EnvSource> ConfigResolver<'a, E> {
    pub fn new(flags: &'a ConfigFlags, env: &'a E) -> Self {
        Self { flags, env }
    }

    /// Resolve only the output directory (`--data-dir` > `DATA_DIR` > `/DATA`).
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.string(&self.flags.data_dir, ENV_DATA_DIR, DEFAULT_DATA_DIR))
    }

    /// Resolve every field. Fails only on unusable numeric values.
    pub fn resolve(&self) -> Result<Resolution, AppError> {
        let mut warnings = Vec::new();

        let sites = split_unique_list(&self.string(&self.flags.site, ENV_SITE_NAME, DEFAULT_SITES));
        let search_terms =
            split_list(&self.string(&self.flags.terms, ENV_SEARCH_TERMS, DEFAULT_SEARCH_TERMS));
        let google_search_term_override = non_blank(self.flags.google_term.clone())
            .or_else(|| self.env.var(ENV_GOOGLE_SEARCH_TERM));

        let results_wanted = self.positive_int(
            &self.flags.results,
            "--results",
            ENV_RESULTS_WANTED,
            DEFAULT_RESULTS_WANTED,
        )?;
        let hours_old = self.positive_int(
            &self.flags.hours_old,
            "--hours-old",
            ENV_HOURS_OLD,
            DEFAULT_HOURS_OLD,
        )?;

        let linkedin_fetch_description = self.linkedin_fetch_description(&mut warnings);

        let config = RunConfig {
            sites,
            search_terms,
            google_search_term_override,
            location: self.string(&self.flags.location, ENV_LOCATION, DEFAULT_LOCATION),
            results_wanted,
            hours_old,
            country_indeed: self.string(
                &self.flags.country_indeed,
                ENV_COUNTRY_INDEED,
                DEFAULT_COUNTRY_INDEED,
            ),
            linkedin_fetch_description,
            output_dir: self.output_dir(),
        };

        Ok(Resolution { config, warnings })
    }

    fn string(&self, flag: &Option<String>, key: &str, default: &str) -> String {
        non_blank(flag.clone())
            .or_else(|| self.env.var(key))
            .unwrap_or_else(|| default.to_string())
    }

    fn positive_int(
        &self,
        flag: &Option<String>,
        flag_name: &str,
        key: &str,
        default: u32,
    ) -> Result<u32, AppError> {
        let (raw, source) = match non_blank(flag.clone()) {
            Some(raw) => (raw, flag_name),
            None => match self.env.var(key) {
                Some(raw) => (raw, key),
                None => return Ok(default),
            },
        };

        let parsed: u32 = raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!(
                "Invalid {source} '{raw}': must be a positive integer"
            ))
        })?;
        if parsed == 0 {
            return Err(AppError::ConfigError(format!("{source} must be at least 1")));
        }
        Ok(parsed)
    }

    fn linkedin_fetch_description(&self, warnings: &mut Vec<ConfigWarning>) -> bool {
        let enable = self.flags.linkedin_fetch_description;
        let disable = self.flags.no_linkedin_fetch_description;

        if enable && disable {
            warnings.push(ConfigWarning::ConflictingLinkedinFlags);
        }

        if disable {
            false
        } else if enable {
            true
        } else {
            self.env
                .var(ENV_LINKEDIN_FETCH_DESCRIPTION)
                .map(|raw| parse_env_bool(&raw))
                .unwrap_or(DEFAULT_LINKEDIN_FETCH_DESCRIPTION)
        }
    }
}

/// Create the output directory (and parents) if it does not exist yet.
pub fn ensure_output_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
