use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::query::SearchQuery;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Response};
use tracing::{debug, warn};

/// Authenticated client for the Jira REST API. Cheap to clone.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    /// GETs `path` relative to the API root and returns the raw response body.
    pub async fn get_raw(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.url_for(path);
        debug!(%url, "jira request");
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|err| JiraError::request(path, err))?;
        Self::read_body(path, response).await
    }

    pub async fn search_raw(&self, query: &SearchQuery) -> Result<String> {
        self.get_raw("search", &query.params()).await
    }

    pub async fn worklogs_raw(&self, issue_key: &str) -> Result<String> {
        let path = format!("issue/{}/worklog", issue_key);
        self.get_raw(&path, &[]).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn read_body(path: &str, response: Response) -> Result<String> {
        let status = response.status();
        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|err| JiraError::request(path, err));
        }
        let body = response.text().await.unwrap_or_default();
        warn!(%status, path, "jira request failed");
        Err(JiraError::from_status(path, status, body))
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let credentials = BASE64_STANDARD.encode(format!("{}:{}", config.username, config.password));
    let mut auth_value = header_value(format!("Basic {}", credentials))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Setup(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Setup(err.to_string()))
}
