use crate::collect::CollectService;
use crate::config::{ConfigFlags, ConfigResolver, ensure_output_dir};
use crate::guard::{OUTPUT_FILE_NAME, Preflight, check_output};
use crate::models::RunOutcome;
use crate::output::write_dataset;
use crate::report::{RunEvent, RunReporter};
use crate::traits::{EnvSource, JobSourceFactory};

/// Run one batch collection end to end.
///
/// 1. Pre-flight: if the output file already exists, stop (success)
/// 2. Resolve the full configuration, build the job source and create the
///    output directory
/// 3. Fetch every search term in order, failing fast
/// 4. Write the combined dataset once
///
/// Every failure is mapped into a [`RunOutcome`]; nothing here panics.
pub async fn run<E, F, R>(flags: &ConfigFlags, env: &E, factory: &F, reporter: &R) -> RunOutcome
where
    E: EnvSource,
    F: JobSourceFactory,
    R: RunReporter,
{
    reporter.report(RunEvent::Starting);

    let resolver = ConfigResolver::new(flags, env);

    // 1. Guard
    let output_dir = resolver.output_dir();
    let path = match check_output(&output_dir) {
        Ok(Preflight::Exists(path)) => {
            reporter.report(RunEvent::OutputExists { path: &path });
            return RunOutcome::AlreadyExists { path };
        }
        Ok(Preflight::Proceed(path)) => path,
        Err(error) => {
            let path = output_dir.join(OUTPUT_FILE_NAME);
            reporter.report(RunEvent::WriteFailed {
                path: &path,
                error: &error,
            });
            return RunOutcome::WriteFailure { path, cause: error };
        }
    };

    // 2. Resolve
    let resolution = match resolver.resolve() {
        Ok(resolution) => resolution,
        Err(error) => {
            reporter.report(RunEvent::ConfigFailed { error: &error });
            return RunOutcome::ConfigFailure(error);
        }
    };
    for warning in &resolution.warnings {
        reporter.report(RunEvent::ConfigWarning { warning });
    }
    let config = resolution.config;
    reporter.report(RunEvent::ConfigResolved { config: &config });

    let source = match factory.create() {
        Ok(source) => source,
        Err(error) => {
            reporter.report(RunEvent::ConfigFailed { error: &error });
            return RunOutcome::ConfigFailure(error);
        }
    };

    if let Err(error) = ensure_output_dir(&config.output_dir) {
        reporter.report(RunEvent::WriteFailed {
            path: &path,
            error: &error,
        });
        return RunOutcome::WriteFailure { path, cause: error };
    }

    // 3. Collect
    let dataset = match CollectService::new(source).collect(&config, reporter).await {
        Ok(dataset) => dataset,
        Err(e) => {
            reporter.report(RunEvent::ScrapeFailed {
                term: &e.term,
                error: &e.source,
            });
            return RunOutcome::ScrapeFailure {
                term: e.term,
                cause: e.source,
            };
        }
    };

    // 4. Write
    match write_dataset(&dataset, &path) {
        Ok(rows) => {
            reporter.report(RunEvent::Written { path: &path, rows });
            RunOutcome::Success { rows, path }
        }
        Err(error) => {
            reporter.report(RunEvent::WriteFailed {
                path: &path,
                error: &error,
            });
            RunOutcome::WriteFailure { path, cause: error }
        }
    }
}
