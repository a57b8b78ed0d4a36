//! Per-service HTTP client
//!
//! Every request goes through one pipeline: attach the bearer token, apply
//! the timeout, retry transient transport failures with linear backoff, and
//! on a 401 refresh the token once before re-issuing the request.

use reach_common::{ApiResponse, Service};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::ClientError;
use crate::events::AuthEvent;
use crate::tokens::TokenManager;

const JSON: &str = "application/json";

/// Method, body, query and extra headers of one call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// Send without the bearer token; a 401 then never triggers a refresh
    pub anonymous: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            query: Vec::new(),
            headers: HeaderMap::new(),
            anonymous: false,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// How a send attempt failed before any HTTP status was received
#[derive(Debug)]
enum SendFailure {
    /// Connection never established; nothing reached the server
    Connect(String),
    /// Connection dropped mid-request
    Transport(String),
    Timeout,
    Other(String),
}

impl SendFailure {
    fn classify(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return SendFailure::Timeout;
        }
        if e.is_connect() {
            return SendFailure::Connect(e.to_string());
        }

        let message = e.to_string();
        let lowered = message.to_ascii_lowercase();
        let looks_transient = e.is_request()
            || ["connection refused", "connection reset", "network", "broken pipe"]
                .iter()
                .any(|pattern| lowered.contains(pattern));

        if looks_transient {
            SendFailure::Transport(message)
        } else {
            SendFailure::Other(message)
        }
    }

    fn is_retryable(&self, method: &Method) -> bool {
        match self {
            SendFailure::Connect(_) => true,
            SendFailure::Transport(_) => method.is_idempotent(),
            SendFailure::Timeout | SendFailure::Other(_) => false,
        }
    }

    fn into_error(self, client: &ApiClient) -> ClientError {
        match self {
            SendFailure::Timeout => ClientError::Timeout(client.tokens.config().timeout),
            SendFailure::Connect(message)
            | SendFailure::Transport(message)
            | SendFailure::Other(message) => ClientError::Network(message),
        }
    }
}

/// Authenticated client for one backend service
#[derive(Debug, Clone)]
pub struct ApiClient {
    service: Service,
    base_url: String,
    tokens: TokenManager,
}

impl ApiClient {
    pub fn new(service: Service, tokens: TokenManager) -> Self {
        let base_url = tokens.config().endpoints.base_url(service).to_string();
        Self {
            service,
            base_url,
            tokens,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Issue a request with the full retry/refresh policy
    pub async fn request<T>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let policy = self.tokens.config().retry;
        let mut retries = 0u32;
        let mut refreshed = false;

        loop {
            let token = if options.anonymous {
                None
            } else {
                self.tokens.get_token()
            };

            tracing::debug!(
                service = %self.service,
                method = %options.method,
                endpoint = %endpoint,
                retries,
                "Sending request"
            );

            match self.send_once(&url, &options, token.as_deref()).await {
                Ok(response) => {
                    if response.status() == StatusCode::UNAUTHORIZED && token.is_some() && !refreshed
                    {
                        refreshed = true;
                        match self.tokens.refresh_token().await {
                            Ok(_) => {
                                tracing::debug!(endpoint = %endpoint, "Retrying after token refresh");
                                continue;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, service = %self.service, "Session expired");
                                self.tokens.clear_token();
                                self.tokens.events().emit(AuthEvent::Expired);
                                return Err(ClientError::Authentication(
                                    "Session expired, please log in again".to_string(),
                                ));
                            }
                        }
                    }

                    return parse_response(response, self.tokens.config().timeout).await;
                }
                Err(failure) if failure.is_retryable(&options.method) && policy.should_retry(retries) => {
                    let delay = policy.delay_for(retries);
                    tracing::warn!(
                        service = %self.service,
                        endpoint = %endpoint,
                        attempt = retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        failure = ?failure,
                        "Transient network failure, retrying"
                    );
                    backoff(delay).await;
                    retries += 1;
                }
                Err(failure) => return Err(failure.into_error(self)),
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<reqwest::Response, SendFailure> {
        let mut builder = self
            .tokens
            .http()
            .request(options.method.clone(), url)
            .timeout(self.tokens.config().timeout)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .headers(options.headers.clone());

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(SendFailure::classify)
    }

    pub async fn get<T>(&self, endpoint: &str) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn get_with_params<T>(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let mut options = RequestOptions::new(Method::GET);
        options.query = params;
        self.request(endpoint, options).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, with_json(Method::POST, body)?).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, with_json(Method::PUT, body)?).await
    }

    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, with_json(Method::PATCH, body)?).await
    }

    pub async fn delete<T>(&self, endpoint: &str) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    /// Multipart upload. Sent once: no retry, no refresh, and no JSON
    /// content type so the multipart boundary header survives.
    pub async fn upload<T>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let mut builder = self
            .tokens
            .http()
            .post(self.url(endpoint))
            .timeout(self.tokens.config().timeout)
            .header(ACCEPT, JSON)
            .multipart(form);

        if let Some(token) = self.tokens.get_token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(service = %self.service, endpoint = %endpoint, "Uploading multipart body");

        let response = builder
            .send()
            .await
            .map_err(|e| SendFailure::classify(e).into_error(self))?;

        parse_response(response, self.tokens.config().timeout).await
    }
}

fn with_json<B>(method: Method, body: &B) -> Result<RequestOptions, ClientError>
where
    B: Serialize + ?Sized,
{
    Ok(RequestOptions::new(method).with_body(serde_json::to_value(body)?))
}

#[mutants::skip] // Pure timing; retry counts are asserted on the listener side
async fn backoff(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// The request timeout also bounds the body read, so a stalled body is a
/// `Timeout` rather than a network failure.
async fn parse_response<T>(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<ApiResponse<T>, ClientError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        if e.is_timeout() {
            ClientError::Timeout(timeout)
        } else {
            ClientError::Network(format!("Failed to read response body: {}", e))
        }
    })?;

    let body: Option<Value> = if text.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone())))
    };

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        tracing::debug!(status = status.as_u16(), message = %message, "Request failed");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
            body,
        });
    }

    let (data, message) = unwrap_envelope(body.unwrap_or(Value::Null));
    let data: T = serde_json::from_value(data)?;

    Ok(ApiResponse::ok(data, message))
}

/// Split a success body into payload and message, unwrapping `{data: ...}`
fn unwrap_envelope(body: Value) -> (Value, Option<String>) {
    match body {
        Value::Object(mut map) => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            match map.remove("data") {
                Some(data) => (data, message),
                None => (Value::Object(map), message),
            }
        }
        other => (other, None),
    }
}

fn error_message(body: &Value) -> Option<String> {
    if let Value::String(text) = body {
        return Some(text.clone());
    }
    ["message", "error", "detail"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}
