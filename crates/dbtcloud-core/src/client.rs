//! HTTP executor shared by every dbt Cloud resource
//!
//! [`DbtCloudClient`] owns the ambient configuration (base URL, account ID,
//! API token) and a pooled `reqwest::Client`. Resource handlers build paths
//! and payloads, then hand them to [`DbtCloudClient::execute`], which attaches
//! auth headers, sends the request and returns the raw body bytes. Any
//! non-2xx status is turned into [`CoreError::Api`] here so handlers only
//! decode successful bodies.

use crate::error::{CoreError, Result};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Default dbt Cloud API root (multi-tenant US region)
pub const DEFAULT_BASE_URL: &str = "https://cloud.getdbt.com/api";

const DEFAULT_USER_AGENT: &str = concat!("dbtcloud-core/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for the dbt Cloud REST API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct DbtCloudClient {
    base_url: String,
    account_id: i64,
    http: reqwest::Client,
}

impl fmt::Debug for DbtCloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbtCloudClient")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DbtCloudClient`]
#[derive(Debug, Default, Clone)]
pub struct DbtCloudClientBuilder {
    base_url: Option<String>,
    account_id: Option<i64>,
    token: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl DbtCloudClientBuilder {
    /// API root, e.g. `https://cloud.getdbt.com/api`
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Service or personal API token, sent as `Authorization: Token <token>`
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Whole-request timeout enforced by the HTTP transport
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the settings and build the client
    pub fn build(self) -> Result<DbtCloudClient> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::Config("API token must not be empty".to_string()))?;
        let account_id = self
            .account_id
            .ok_or_else(|| CoreError::Config("account ID is required".to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| CoreError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let mut auth = HeaderValue::from_str(&format!("Token {}", token))
            .map_err(|_| CoreError::Config("API token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(DbtCloudClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id,
            http,
        })
    }
}

impl DbtCloudClient {
    /// Start building a client
    pub fn builder() -> DbtCloudClientBuilder {
        DbtCloudClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    /// Prefix `rest` with the account scope: `/v3/accounts/{account_id}/{rest}`
    pub fn account_path(&self, rest: &str) -> String {
        format!(
            "/v3/accounts/{}/{}",
            self.account_id,
            rest.trim_start_matches('/')
        )
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|e| CoreError::Config(format!("Invalid request URL '{}': {}", joined, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send one request and return the response body
    ///
    /// Non-2xx responses become [`CoreError::Api`] carrying the status and
    /// the body text; the body is never decoded here.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let url = self.url(path, query)?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            trace!("Request body: {} bytes", body.len());
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        trace!("Response {}: {} bytes", status, bytes.len());

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if text.is_empty() {
                status.to_string()
            } else {
                text
            };
            debug!("API returned {}: {}", status, message);
            return Err(CoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }

    /// GET `path` with optional query parameters
    pub async fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.execute(Method::GET, path, query, None).await
    }

    /// POST `body` serialized as JSON
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(body)?;
        self.execute(Method::POST, path, &[], Some(payload)).await
    }

    /// DELETE `path`
    pub async fn delete(&self, path: &str) -> Result<Vec<u8>> {
        self.execute(Method::DELETE, path, &[], None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DbtCloudClient {
        DbtCloudClient::builder()
            .base_url("https://cloud.getdbt.com/api/")
            .account_id(42)
            .token("dbtc_test")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_token() {
        let err = DbtCloudClient::builder()
            .account_id(1)
            .token("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_builder_requires_account_id() {
        let err = DbtCloudClient::builder().token("abc").build().unwrap_err();
        assert!(err.to_string().contains("account ID"));
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = DbtCloudClient::builder()
            .base_url("not a url")
            .account_id(1)
            .token("abc")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid base URL"));
    }

    #[test]
    fn test_builder_defaults() {
        let client = DbtCloudClient::builder()
            .account_id(7)
            .token("abc")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.account_id(), 7);
    }

    #[test]
    fn test_account_path() {
        let client = client();
        assert_eq!(
            client.account_path("projects/3/credentials/"),
            "/v3/accounts/42/projects/3/credentials/"
        );
        assert_eq!(
            client.account_path("/projects/3/"),
            "/v3/accounts/42/projects/3/"
        );
    }

    #[test]
    fn test_url_join_and_query() {
        let client = client();
        let url = client
            .url(
                "/v3/accounts/42/projects/3/credentials/9/",
                &[("include_related", "[adapter]")],
            )
            .unwrap();
        assert_eq!(url.path(), "/api/v3/accounts/42/projects/3/credentials/9/");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("include_related".to_string(), "[adapter]".to_string())]
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("account_id: 42"));
        assert!(!rendered.contains("dbtc_test"));
    }
}
