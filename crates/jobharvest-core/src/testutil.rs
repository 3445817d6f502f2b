//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{JobRecord, JobRecordBatch, SearchQuery};
use crate::report::{RunEvent, RunReporter};
use crate::traits::{JobSource, JobSourceFactory};

// ---------------------------------------------------------------------------
// MockJobSource
// ---------------------------------------------------------------------------

/// Mock job source that replays a queue of responses and records every query.
#[derive(Clone, Default)]
pub struct MockJobSource {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns an empty batch.
    responses: Arc<Mutex<Vec<Result<JobRecordBatch, AppError>>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<JobRecordBatch, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Every query received so far, in call order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl JobSource for MockJobSource {
    async fn fetch(&self, query: &SearchQuery) -> Result<JobRecordBatch, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(JobRecordBatch::default())
        } else {
            responses.remove(0)
        }
    }
}

impl JobSourceFactory for MockJobSource {
    type Source = MockJobSource;

    fn create(&self) -> Result<MockJobSource, AppError> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// FailingSourceFactory
// ---------------------------------------------------------------------------

/// Factory that fails to build its source.
#[derive(Clone)]
pub struct FailingSourceFactory {
    message: String,
}

impl FailingSourceFactory {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl JobSourceFactory for FailingSourceFactory {
    type Source = MockJobSource;

    fn create(&self) -> Result<MockJobSource, AppError> {
        Err(AppError::ConfigError(self.message.clone()))
    }
}

/// Build a batch of `n` records titled `{prefix}-0 .. {prefix}-{n-1}`.
pub fn make_batch(prefix: &str, n: usize) -> JobRecordBatch {
    let records = (0..n)
        .map(|i| {
            let mut record = JobRecord::new();
            record.insert("title".into(), format!("{prefix}-{i}").into());
            record.insert("search_term".into(), prefix.into());
            record.insert("rank".into(), (i as u64).into());
            record
        })
        .collect();
    JobRecordBatch::from_records(records)
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records a compact label for each event.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl RunReporter for RecordingReporter {
    fn report(&self, event: RunEvent<'_>) {
        let label = match event {
            RunEvent::Starting => "starting".to_string(),
            RunEvent::OutputExists { .. } => "output_exists".to_string(),
            RunEvent::ConfigWarning { .. } => "config_warning".to_string(),
            RunEvent::ConfigResolved { .. } => "config_resolved".to_string(),
            RunEvent::ConfigFailed { .. } => "config_failed".to_string(),
            RunEvent::TermStarted { query, .. } => format!("term_started:{}", query.search_term),
            RunEvent::TermFetched { term, rows, .. } => format!("term_fetched:{term}:{rows}"),
            RunEvent::Collected { total_rows, .. } => format!("collected:{total_rows}"),
            RunEvent::ScrapeFailed { term, .. } => format!("scrape_failed:{term}"),
            RunEvent::Written { rows, .. } => format!("written:{rows}"),
            RunEvent::WriteFailed { .. } => "write_failed".to_string(),
        };
        self.events.lock().unwrap().push(label);
    }
}
