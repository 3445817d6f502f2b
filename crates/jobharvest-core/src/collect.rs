use thiserror::Error;

use crate::config::RunConfig;
use crate::error::AppError;
use crate::models::AggregatedDataset;
use crate::report::{RunEvent, RunReporter};
use crate::traits::JobSource;

/// The job source failed for one search term; the whole run is void.
#[derive(Error, Debug)]
#[error("scrape failed for term '{term}': {source}")]
pub struct CollectError {
    pub term: String,
    #[source]
    pub source: AppError,
}

/// Runs the per-term fetch loop and concatenates the results.
///
/// Terms are processed strictly in order, one provider call at a time.
/// The first failing term aborts the loop and discards what was fetched.
pub struct CollectService<S: JobSource> {
    source: S,
}

impl<S: JobSource> CollectService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch every configured search term and return the combined dataset.
    pub async fn collect<R: RunReporter>(
        &self,
        config: &RunConfig,
        reporter: &R,
    ) -> Result<AggregatedDataset, CollectError> {
        let total = config.search_terms.len();
        let mut dataset = AggregatedDataset::new();

        for (index, term) in config.search_terms.iter().enumerate() {
            let query = config.query_for(term);
            reporter.report(RunEvent::TermStarted {
                index,
                total,
                query: &query,
            });

            let batch = self
                .source
                .fetch(&query)
                .await
                .map_err(|source| CollectError {
                    term: term.clone(),
                    source,
                })?;

            let rows = batch.len();
            dataset.append(batch);
            reporter.report(RunEvent::TermFetched {
                term,
                rows,
                total_rows: dataset.len(),
            });
        }

        reporter.report(RunEvent::Collected {
            terms: total,
            total_rows: dataset.len(),
        });

        Ok(dataset)
    }
}
