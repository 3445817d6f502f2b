use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use jobharvest_client::JobSpyApiFactory;
use jobharvest_client::jobspy::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use jobharvest_core::pipeline;
use jobharvest_core::{ConfigFlags, ProcessEnv, RunOutcome, TracingRunReporter};

// Every run flag falls back to its environment variable, then to a built-in
// default. Numeric values stay strings here so a bad value exits with the
// configuration error code instead of clap's usage code.
#[derive(Parser, Debug)]
#[command(
    name = "jobharvest",
    version,
    about = "Scrape job postings for several search terms and save them as one CSV"
)]
struct Cli {
    /// Comma-separated site list, e.g. indeed,linkedin,glassdoor [env: SITE_NAME]
    #[arg(long)]
    site: Option<String>,

    /// Comma-separated search term list [env: SEARCH_TERMS, default: Azure,devops]
    #[arg(long)]
    terms: Option<String>,

    /// Google Jobs search term used for every term [env: GOOGLE_SEARCH_TERM]
    #[arg(long)]
    google_term: Option<String>,

    /// Location filter [env: LOCATION, default: Canada]
    #[arg(long)]
    location: Option<String>,

    /// Max results to fetch per term [env: RESULTS_WANTED, default: 20]
    #[arg(long, value_name = "N")]
    results: Option<String>,

    /// Max posting age in hours [env: HOURS_OLD, default: 24]
    #[arg(long, value_name = "HOURS")]
    hours_old: Option<String>,

    /// Indeed country [env: COUNTRY_INDEED, default: canada]
    #[arg(long)]
    country_indeed: Option<String>,

    /// Fetch LinkedIn long descriptions [env: LINKEDIN_FETCH_DESCRIPTION]
    #[arg(long)]
    linkedin_fetch_description: bool,

    /// Disable LinkedIn long descriptions (wins over --linkedin-fetch-description)
    #[arg(long)]
    no_linkedin_fetch_description: bool,

    /// Output directory [env: DATA_DIR, default: /DATA]
    #[arg(long)]
    data_dir: Option<String>,

    /// Base URL of the JobSpy-compatible search API
    #[arg(long, env = "JOBSPY_API_URL", default_value = DEFAULT_BASE_URL)]
    provider_url: String,

    /// API key sent as x-api-key
    #[arg(long, env = "JOBSPY_API_KEY", hide_env_values = true)]
    provider_api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "JOBSPY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    provider_timeout: u64,
}

impl Cli {
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            site: self.site.clone(),
            terms: self.terms.clone(),
            google_term: self.google_term.clone(),
            location: self.location.clone(),
            results: self.results.clone(),
            hours_old: self.hours_old.clone(),
            country_indeed: self.country_indeed.clone(),
            linkedin_fetch_description: self.linkedin_fetch_description,
            no_linkedin_fetch_description: self.no_linkedin_fetch_description,
            data_dir: self.data_dir.clone(),
        }
    }

    fn source_factory(&self) -> JobSpyApiFactory {
        JobSpyApiFactory {
            base_url: self.provider_url.clone(),
            api_key: self.provider_api_key.clone(),
            timeout: Duration::from_secs(self.provider_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to set up logging: {e}");
        return ExitCode::from(RunOutcome::EXIT_CONFIG_FAILURE);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(RunOutcome::EXIT_CONFIG_FAILURE);
        }
    };

    let outcome = pipeline::run(
        &cli.config_flags(),
        &ProcessEnv,
        &cli.source_factory(),
        &TracingRunReporter,
    )
    .await;

    ExitCode::from(outcome.exit_code())
}

/// Progress goes to stdout, warnings and errors to stderr.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("jobharvest=info".parse()?)
        .add_directive("jobharvest_core=info".parse()?)
        .add_directive("jobharvest_client=info".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::WARN)
                .or_else(std::io::stdout),
        )
        .init();

    Ok(())
}
