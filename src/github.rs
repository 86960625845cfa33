use crate::config::AppConfig;
use crate::error::{Result, StatsError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Body of a GraphQL POST.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: &'static str, variables: Value) -> Self {
        Self { query, variables }
    }
}

/// Sends one GraphQL request and returns the raw JSON envelope.
///
/// Implementations must not retry: a failed call is reported once and the
/// caller decides what to substitute.
#[allow(async_fn_in_trait)]
pub trait GraphqlTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

/// Decode the `data` member of a GraphQL envelope into `T`.
///
/// A non-empty `errors` array is treated as a failure even when partial
/// `data` is present.
pub fn decode_data<T: DeserializeOwned>(json: Value, what: &'static str) -> Result<T> {
    match decode_partial(json, what)? {
        (data, None) => Ok(data),
        (_, Some(errors)) => Err(StatsError::GraphQl(errors)),
    }
}

/// Decode `data` and keep it even when the API also reported `errors`.
///
/// The joined error messages are returned alongside the data. Fails only
/// when `data` itself is absent or malformed.
pub fn decode_partial<T: DeserializeOwned>(
    json: Value,
    what: &'static str,
) -> Result<(T, Option<String>)> {
    let envelope: Envelope<T> =
        serde_json::from_value(json).map_err(|source| StatsError::Decode { what, source })?;

    let errors = envelope
        .errors
        .filter(|e| !e.is_empty())
        .map(|errors| {
            errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ")
        });

    match (envelope.data, errors) {
        (Some(data), errors) => Ok((data, errors)),
        (None, Some(errors)) => Err(StatsError::GraphQl(errors)),
        (None, None) => Err(StatsError::MissingField("data")),
    }
}

/// reqwest-backed transport against the GitHub GraphQL endpoint.
#[derive(Clone)]
pub struct GithubClient {
    token: String,
    endpoint: String,
    http: Client,
}

impl GithubClient {
    /// Build a client with the configured timeout and bearer token.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("profile-stats/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            token: config.token.clone(),
            endpoint: config.api_url.clone(),
            http,
        })
    }
}

impl GraphqlTransport for GithubClient {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value> {
        debug!(endpoint = %self.endpoint, variables = %request.variables, "POST graphql");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StatsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await?;
        Ok(json)
    }
}
