pub mod collect;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod traits;
pub mod util;

#[cfg(test)]
pub mod testutil;

pub use collect::{CollectError, CollectService};
pub use config::{ConfigFlags, ConfigResolver, ConfigWarning, Resolution, RunConfig};
pub use error::AppError;
pub use guard::{OUTPUT_FILE_NAME, Preflight};
pub use models::{AggregatedDataset, JobRecord, JobRecordBatch, RunOutcome, SearchQuery};
pub use report::{NullReporter, RunEvent, RunReporter, TracingRunReporter};
pub use traits::{EnvSource, JobSource, JobSourceFactory, ProcessEnv};
