use std::path::Path;

use crate::config::{ConfigWarning, RunConfig};
use crate::error::AppError;
use crate::models::SearchQuery;

/// Events emitted by the pipeline for progress reporting.
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    Starting,
    OutputExists {
        path: &'a Path,
    },
    ConfigWarning {
        warning: &'a ConfigWarning,
    },
    ConfigResolved {
        config: &'a RunConfig,
    },
    ConfigFailed {
        error: &'a AppError,
    },
    TermStarted {
        index: usize,
        total: usize,
        query: &'a SearchQuery,
    },
    TermFetched {
        term: &'a str,
        rows: usize,
        total_rows: usize,
    },
    Collected {
        terms: usize,
        total_rows: usize,
    },
    ScrapeFailed {
        term: &'a str,
        error: &'a AppError,
    },
    Written {
        path: &'a Path,
        rows: usize,
    },
    WriteFailed {
        path: &'a Path,
        error: &'a AppError,
    },
}

/// Trait for receiving run events (decoupled logging).
pub trait RunReporter: Send + Sync {
    fn report(&self, event: RunEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl RunReporter for NullReporter {}

/// Reporter that uses the `tracing` crate.
///
/// Progress goes out at INFO, warnings at WARN and failures at ERROR, so a
/// subscriber can split the streams by level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunReporter;

impl RunReporter for TracingRunReporter {
    fn report(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::Starting => {
                tracing::info!("Starting job collector...");
            }
            RunEvent::OutputExists { path } => {
                tracing::info!(
                    "Output file already exists at {}. Please remove it before running again.",
                    path.display()
                );
                tracing::info!("Exiting normally...");
            }
            RunEvent::ConfigWarning { warning } => {
                tracing::warn!("{warning}");
            }
            RunEvent::ConfigResolved { config } => match serde_json::to_string(config) {
                Ok(json) => tracing::debug!(config = %json, "Configuration resolved"),
                Err(e) => tracing::debug!(error = %e, "Configuration resolved (not serializable)"),
            },
            RunEvent::ConfigFailed { error } => {
                tracing::error!(%error, "Invalid configuration");
            }
            RunEvent::TermStarted {
                index,
                total,
                query,
            } => {
                tracing::info!(
                    "Processing search term {}/{}: '{}'",
                    index + 1,
                    total,
                    query.search_term
                );
                tracing::info!(
                    sites = ?query.sites,
                    term = %query.search_term,
                    google_term = %query.google_search_term,
                    location = %query.location,
                    results = query.results_wanted,
                    hours_old = query.hours_old,
                    "Querying job source"
                );
            }
            RunEvent::TermFetched {
                term,
                rows,
                total_rows,
            } => {
                tracing::info!(%term, rows, total_rows, "Fetched {} jobs", rows);
            }
            RunEvent::Collected { terms, total_rows } => {
                tracing::info!(terms, "Found {} jobs", total_rows);
            }
            RunEvent::ScrapeFailed { term, error } => {
                tracing::error!(
                    %term,
                    remote = error.is_provider_error(),
                    "Scrape failed: {error}"
                );
            }
            RunEvent::Written { path, rows } => {
                tracing::info!(rows, "Wrote {}", path.display());
            }
            RunEvent::WriteFailed { path, error } => {
                tracing::error!(path = %path.display(), "Write failed: {error}");
            }
        }
    }
}
