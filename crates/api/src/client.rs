//! Base HTTP client: request defaults, URL prefixing and the shared validators

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, ResponseValue};
use crate::validate::{self, STATUS_BAD_REQUEST, STATUS_OK};

/// Header carrying the session token
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Sent verbatim, for malformed-payload scenarios
    Raw(String),
}

/// Caller-side request options. Unset fields fall back to client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    /// Path relative to the API root
    pub url: String,
    pub fail_on_status_code: Option<bool>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Serialize `body` as the JSON payload
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn fail_on_status_code(mut self, fail: bool) -> Self {
        self.fail_on_status_code = Some(fail);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Options after merging with the client defaults
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: String,
    pub fail_on_status_code: bool,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub query: Vec<(String, String)>,
}

/// HTTP client bound to one API root
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    api_root: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder().build()?;
        let api_root = config.api_root();
        Ok(Self {
            http,
            config,
            api_root,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Path for a named endpoint
    pub fn endpoint(&self, name: &str) -> ApiResult<&str> {
        self.config.endpoints.require(name)
    }

    /// Merge caller options over the defaults. Caller headers replace
    /// default headers of the same (case-insensitive) name.
    pub fn resolve(&self, options: RequestOptions) -> ResolvedRequest {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        for (name, value) in options.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, value);
        }

        ResolvedRequest {
            method: options.method.unwrap_or(Method::GET),
            url: format!("{}{}", self.api_root, options.url),
            fail_on_status_code: options.fail_on_status_code.unwrap_or(false),
            headers,
            body: options.body,
            timeout: options.timeout.unwrap_or_else(|| self.config.default_timeout()),
            query: options.query,
        }
    }

    /// Issue a request. Error statuses come back as values unless the caller
    /// opted into `fail_on_status_code`.
    pub async fn request(&self, options: RequestOptions) -> ApiResult<ApiResponse> {
        let resolved = self.resolve(options);
        debug!("{} {}", resolved.method, resolved.url);

        let mut builder = self
            .http
            .request(resolved.method.clone(), &resolved.url)
            .timeout(resolved.timeout);

        for (name, value) in &resolved.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !resolved.query.is_empty() {
            builder = builder.query(&resolved.query);
        }
        builder = match &resolved.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Raw(body)) => builder.body(body.clone()),
            None => builder,
        };

        let transport = |source: reqwest::Error| ApiError::Transport {
            url: resolved.url.clone(),
            source,
        };
        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(transport)?;
        let response = ApiResponse::from_text(resolved.url.clone(), status, &text);

        if status >= STATUS_BAD_REQUEST && resolved.fail_on_status_code {
            warn!("API request failed with status: {}", status);
            return Err(ApiError::RequestFailed {
                url: resolved.url,
                status,
            });
        }

        Ok(response)
    }

    /// Auth header map for a session token
    pub fn get_auth_headers(&self, token: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(AUTH_HEADER.to_string(), token.to_string());
        headers
    }

    /// Resolve either response representation to the direct form
    pub fn normalize_response(&self, response: impl Into<ResponseValue>) -> ApiResponse {
        response.into().normalize()
    }

    pub fn validate_response_status_code(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.normalize_response(response);
        validate::expect_status(&response, expected_status)
    }

    pub fn validate_standard_response(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.normalize_response(response);
        validate::validate_standard_response(&response, expected_status)
    }

    /// Best-effort readiness probe. A non-200 answer is logged, not raised.
    pub async fn wait_for_api_ready(&self) -> ApiResult<ApiResponse> {
        let path = self.endpoint("health_check_url")?.to_string();
        let response = self
            .request(RequestOptions::get(path).fail_on_status_code(false))
            .await?;

        if response.status != STATUS_OK {
            warn!("API health check failed ({}), but continuing...", response.status);
        }
        Ok(response)
    }
}
