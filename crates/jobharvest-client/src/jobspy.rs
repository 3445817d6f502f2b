use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::models::{JobRecordBatch, SearchQuery};
use jobharvest_core::traits::{JobSource, JobSourceFactory};
use reqwest::Client;
use url::Url;

/// Search route relative to the API base URL.
pub const SEARCH_PATH: &str = "api/v1/search_jobs";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Job source backed by a JobSpy-compatible REST API.
///
/// Issues one `GET {base}/api/v1/search_jobs` per search term and returns the
/// `jobs` array of the response as a batch, untouched.
#[derive(Clone)]
pub struct JobSpyApiSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl JobSpyApiSource {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let endpoint = search_endpoint(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("jobharvest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: None,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Send `x-api-key` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for site in &query.sites {
                pairs.append_pair("site_name", site);
            }
            pairs
                .append_pair("search_term", &query.search_term)
                .append_pair("google_search_term", &query.google_search_term)
                .append_pair("location", &query.location)
                .append_pair("results_wanted", &query.results_wanted.to_string())
                .append_pair("hours_old", &query.hours_old.to_string())
                .append_pair("country_indeed", &query.country_indeed)
                .append_pair(
                    "linkedin_fetch_description",
                    if query.linkedin_fetch_description {
                        "true"
                    } else {
                        "false"
                    },
                );
        }
        url
    }
}

impl JobSource for JobSpyApiSource {
    async fn fetch(&self, query: &SearchQuery) -> Result<JobRecordBatch, AppError> {
        let url = self.request_url(query);
        tracing::debug!(%url, "Requesting job search");

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for search term '{}'",
                status.as_u16(),
                query.search_term
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::ProviderError(format!("Failed to decode response body: {e}"))
            }
        })?;

        parse_search_response(body)
    }
}

/// Settings needed to build a [`JobSpyApiSource`] once the run is known to proceed.
#[derive(Debug, Clone)]
pub struct JobSpyApiFactory {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl JobSpyApiFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl JobSourceFactory for JobSpyApiFactory {
    type Source = JobSpyApiSource;

    fn create(&self) -> Result<JobSpyApiSource, AppError> {
        let source = JobSpyApiSource::with_timeout(&self.base_url, self.timeout)?;
        Ok(match &self.api_key {
            Some(key) => source.with_api_key(key.clone()),
            None => source,
        })
    }
}

/// Resolve `{base_url}/api/v1/search_jobs`, keeping any path prefix of the base.
fn search_endpoint(base_url: &str) -> Result<Url, AppError> {
    let mut base = Url::parse(base_url).map_err(|e| {
        AppError::ConfigError(format!("Invalid provider URL '{base_url}': {e}"))
    })?;

    match base.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::ConfigError(format!(
                "Provider URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(SEARCH_PATH)
        .map_err(|e| AppError::ConfigError(format!("Invalid provider URL '{base_url}': {e}")))
}

/// Turn a search response into a batch.
///
/// Accepts `{"count": n, "jobs": [...]}` or a bare array of job objects.
fn parse_search_response(body: serde_json::Value) -> Result<JobRecordBatch, AppError> {
    let jobs = match body {
        serde_json::Value::Object(mut obj) => {
            let jobs = obj.remove("jobs").ok_or_else(|| {
                AppError::ProviderError("Response has no 'jobs' field".to_string())
            })?;
            if let Some(count) = obj.get("count").and_then(serde_json::Value::as_u64) {
                tracing::debug!(count, "Provider reported job count");
            }
            jobs
        }
        array @ serde_json::Value::Array(_) => array,
        other => {
            return Err(AppError::ProviderError(format!(
                "Unexpected response shape: {other}"
            )));
        }
    };

    JobRecordBatch::from_json(jobs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn query(term: &str) -> SearchQuery {
        SearchQuery {
            sites: vec!["indeed".into(), "linkedin".into()],
            search_term: term.into(),
            google_search_term: format!("{term} jobs"),
            location: "Canada".into(),
            results_wanted: 20,
            hours_old: 24,
            country_indeed: "canada".into(),
            linkedin_fetch_description: true,
        }
    }

    #[test]
    fn test_search_endpoint() {
        assert_eq!(
            search_endpoint("http://localhost:8000").unwrap().as_str(),
            "http://localhost:8000/api/v1/search_jobs"
        );
        assert_eq!(
            search_endpoint("https://jobs.example.com/proxy").unwrap().as_str(),
            "https://jobs.example.com/proxy/api/v1/search_jobs"
        );
        assert_eq!(
            search_endpoint("https://jobs.example.com/proxy/").unwrap().as_str(),
            "https://jobs.example.com/proxy/api/v1/search_jobs"
        );
    }

    #[test]
    fn test_search_endpoint_rejects_bad_urls() {
        assert!(matches!(
            search_endpoint("not a url"),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            search_endpoint("ftp://example.com"),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_request_url_carries_every_parameter() {
        let source = JobSpyApiSource::new("http://localhost:8000").unwrap();
        let url = source.request_url(&query("platform engineer"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        let sites: Vec<_> = pairs
            .iter()
            .filter(|(k, _)| k == "site_name")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(sites, ["indeed", "linkedin"]);
        assert!(pairs.contains(&("search_term".into(), "platform engineer".into())));
        assert!(pairs.contains(&("google_search_term".into(), "platform engineer jobs".into())));
        assert!(pairs.contains(&("results_wanted".into(), "20".into())));
        assert!(pairs.contains(&("hours_old".into(), "24".into())));
        assert!(pairs.contains(&("country_indeed".into(), "canada".into())));
        assert!(pairs.contains(&("linkedin_fetch_description".into(), "true".into())));
    }

    #[test]
    fn test_parse_search_response_shapes() {
        let batch = parse_search_response(json!({
            "count": 2,
            "jobs": [{"title": "SRE", "site": "indeed"}, {"title": "Dev", "site": "linkedin"}]
        }))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.columns(), ["title", "site"]);

        let batch = parse_search_response(json!([{"title": "SRE"}])).unwrap();
        assert_eq!(batch.len(), 1);

        assert!(matches!(
            parse_search_response(json!({"count": 0})),
            Err(AppError::ProviderError(_))
        ));
        assert!(matches!(
            parse_search_response(json!("nope")),
            Err(AppError::ProviderError(_))
        ));
    }

    #[test]
    fn test_factory_rejects_bad_url() {
        let factory = JobSpyApiFactory::new("::not-a-url::");
        assert!(matches!(factory.create(), Err(AppError::ConfigError(_))));
    }

    #[tokio::test]
    async fn fetch_returns_jobs_in_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/search_jobs"))
            .and(query_param("search_term", "devops"))
            .and(query_param("site_name", "linkedin"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "jobs": [
                    {"title": "DevOps 1", "company": "Acme", "min_amount": 90000},
                    {"title": "DevOps 2", "company": "Initech", "min_amount": null},
                    {"title": "DevOps 3", "company": "Globex", "is_remote": true}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let factory = JobSpyApiFactory {
            base_url: mock_server.uri(),
            api_key: Some("secret".into()),
            timeout: Duration::from_secs(5),
        };
        let source = factory.create().unwrap();

        let batch = source.fetch(&query("devops")).await.unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.columns(),
            ["title", "company", "min_amount", "is_remote"]
        );
        assert_eq!(batch.records()[2]["title"], "DevOps 3");
    }

    #[tokio::test]
    async fn fetch_http_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/search_jobs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let source = JobSpyApiSource::new(&mock_server.uri()).unwrap();
        let err = source.fetch(&query("devops")).await.unwrap_err();

        match err {
            AppError::HttpError(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("devops"));
            }
            other => panic!("Expected HttpError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_invalid_body_is_provider_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/search_jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let source = JobSpyApiSource::new(&mock_server.uri()).unwrap();
        let err = source.fetch(&query("devops")).await.unwrap_err();

        assert!(matches!(err, AppError::ProviderError(_)));
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jobs": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let source =
            JobSpyApiSource::with_timeout(&mock_server.uri(), Duration::from_millis(200)).unwrap();
        let err = source.fetch(&query("devops")).await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn fetch_connection_refused_is_network_error() {
        // Port 1 on loopback is reserved and normally closed.
        let source = JobSpyApiSource::with_timeout("http://127.0.0.1:1", Duration::from_secs(5))
            .unwrap();
        let err = source.fetch(&query("devops")).await.unwrap_err();

        assert!(err.is_provider_error());
    }
}
