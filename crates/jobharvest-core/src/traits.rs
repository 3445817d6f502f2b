use std::future::Future;

use crate::error::AppError;
use crate::models::{JobRecordBatch, SearchQuery};

/// Fetches job postings for one search term from an external provider.
///
/// Implementations own everything remote: site querying, pagination, rate
/// limiting and parsing. Any column schema and any row count is acceptable.
pub trait JobSource: Send + Sync + Clone {
    fn fetch(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<JobRecordBatch, AppError>> + Send;
}

/// Builds the [`JobSource`] for a run.
///
/// Construction is deferred until after the pre-flight check and config
/// resolution, so a bad provider setting never blocks an idempotent skip.
pub trait JobSourceFactory {
    type Source: JobSource;

    fn create(&self) -> Result<Self::Source, AppError>;
}

/// Read-only view of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
