use std::path::PathBuf;

use serde::Serialize;

use crate::error::AppError;

/// One job posting as returned by a provider: column name → value.
///
/// Column identity is provider-defined and never inspected by the pipeline.
pub type JobRecord = serde_json::Map<String, serde_json::Value>;

/// Parameters for a single provider call (one search term).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub sites: Vec<String>,
    pub search_term: String,
    pub google_search_term: String,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
    pub linkedin_fetch_description: bool,
}

/// Rows returned by one provider call, plus the column shape they came with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRecordBatch {
    columns: Vec<String>,
    records: Vec<JobRecord>,
}

impl JobRecordBatch {
    /// Build a batch with an explicit column order.
    ///
    /// Keys that appear in records but not in `columns` are appended in
    /// first-seen order, so no value is ever dropped on output.
    pub fn new(columns: Vec<String>, records: Vec<JobRecord>) -> Self {
        let mut batch = Self {
            columns: Vec::new(),
            records: Vec::new(),
        };
        for column in columns {
            push_unique(&mut batch.columns, column);
        }
        for record in &records {
            for key in record.keys() {
                push_unique(&mut batch.columns, key.clone());
            }
        }
        batch.records = records;
        batch
    }

    /// Build a batch whose columns are the union of record keys in first-seen order.
    pub fn from_records(records: Vec<JobRecord>) -> Self {
        Self::new(Vec::new(), records)
    }

    /// Parse a JSON array of objects into a batch.
    pub fn from_json(value: serde_json::Value) -> Result<Self, AppError> {
        let serde_json::Value::Array(items) = value else {
            return Err(AppError::ProviderError(
                "expected a JSON array of job records".into(),
            ));
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(AppError::ProviderError(format!(
                    "job record {i} is not an object: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(records))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Concatenation of every batch fetched during a run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedDataset {
    columns: Vec<String>,
    records: Vec<JobRecord>,
}

impl AggregatedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch: records keep their order, new columns are added after
    /// the ones already known (outer concatenation).
    pub fn append(&mut self, batch: JobRecordBatch) {
        for column in batch.columns {
            push_unique(&mut self.columns, column);
        }
        self.records.extend(batch.records);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn push_unique(columns: &mut Vec<String>, column: String) {
    if !columns.contains(&column) {
        columns.push(column);
    }
}

/// Final result of one invocation. Selects the process exit code.
#[derive(Debug)]
pub enum RunOutcome {
    /// The dataset was written.
    Success { rows: usize, path: PathBuf },
    /// The output file was already present; nothing was done.
    AlreadyExists { path: PathBuf },
    /// A configuration value was unusable; no provider call was made.
    ConfigFailure(AppError),
    /// The provider failed for `term`; nothing was written.
    ScrapeFailure { term: String, cause: AppError },
    /// The dataset could not be written.
    WriteFailure { path: PathBuf, cause: AppError },
}

impl RunOutcome {
    pub const EXIT_SUCCESS: u8 = 0;
    pub const EXIT_SCRAPE_FAILURE: u8 = 2;
    pub const EXIT_WRITE_FAILURE: u8 = 3;
    pub const EXIT_CONFIG_FAILURE: u8 = 4;

    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success { .. } | RunOutcome::AlreadyExists { .. } => Self::EXIT_SUCCESS,
            RunOutcome::ScrapeFailure { .. } => Self::EXIT_SCRAPE_FAILURE,
            RunOutcome::WriteFailure { .. } => Self::EXIT_WRITE_FAILURE,
            RunOutcome::ConfigFailure(_) => Self::EXIT_CONFIG_FAILURE,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == Self::EXIT_SUCCESS
    }
}
