//! Overpass QL rendering and the HTTP client that runs it.
//!
//! Queries use `out geom`, so every way and relation member comes back
//! with its coordinates inline and no node lookups are needed.

use std::{fmt::Write as _, time::Duration};

use fishing_zones_source_models::{FetcherConfig, QueryDefinition, SeedEntry, SeedList, Selector};
use fishing_zones_zone_models::BoundingBox;
use serde_json::Value;

use crate::{SourceError, throttle::Throttle};

/// Public Overpass endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Extra seconds the HTTP client waits beyond the server-side timeout.
const CLIENT_TIMEOUT_SLACK_SECS: u64 = 5;

/// Maximum length of the response body included in status errors.
const BODY_PREVIEW_LEN: usize = 300;

/// Escapes a value for use inside a double-quoted QL string.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Renders a union query over `bbox`.
///
/// With `name`, every statement additionally requires an exact `name`
/// tag match.
#[must_use]
pub fn build_query(
    selectors: &[Selector],
    bbox: &BoundingBox,
    name: Option<&str>,
    timeout_secs: u64,
) -> String {
    let bbox = format!(
        "({},{},{},{})",
        bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng
    );

    let mut ql = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for selector in selectors {
        ql.push_str("  ");
        ql.push_str(selector.element.as_ref());
        if let Some(name) = name {
            let _ = write!(ql, "[\"name\"=\"{}\"]", escape(name));
        }
        for (key, value) in &selector.tags {
            if value == "*" {
                let _ = write!(ql, "[\"{}\"]", escape(key));
            } else {
                let _ = write!(ql, "[\"{}\"=\"{}\"]", escape(key), escape(value));
            }
        }
        ql.push_str(&bbox);
        ql.push_str(";\n");
    }
    ql.push_str(");\nout geom;");
    ql
}

/// One HTTP request a query definition expands into.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRequest {
    /// Label for logs and progress output.
    pub label: String,
    /// The seed entry this request looks up (`by_name` queries only).
    pub seed: Option<SeedEntry>,
    /// Rendered Overpass QL.
    pub ql: String,
    /// Server-side timeout in seconds.
    pub timeout_secs: u64,
}

/// Expands a query definition into its requests.
///
/// `category` queries yield one request; `by_name` queries yield one per
/// seed entry, searching for the entry's [`SeedEntry::lookup_name`].
///
/// # Errors
///
/// * [`SourceError::UnknownSeeds`] if a `by_name` query is given no seed
///   list or one with a different id
pub fn plan_requests(
    query: &QueryDefinition,
    seeds: Option<&SeedList>,
    bbox: &BoundingBox,
) -> Result<Vec<PlannedRequest>, SourceError> {
    match &query.fetcher {
        FetcherConfig::Category { selectors } => Ok(vec![PlannedRequest {
            label: query.name.clone(),
            seed: None,
            ql: build_query(selectors, bbox, None, query.timeout_secs),
            timeout_secs: query.timeout_secs,
        }]),
        FetcherConfig::ByName {
            seeds: seeds_id,
            selectors,
        } => {
            let list = seeds
                .filter(|list| list.id == *seeds_id)
                .ok_or_else(|| SourceError::UnknownSeeds {
                    id: seeds_id.clone(),
                })?;

            Ok(list
                .seeds
                .iter()
                .map(|entry| PlannedRequest {
                    label: entry.name.clone(),
                    seed: Some(entry.clone()),
                    ql: build_query(
                        selectors,
                        bbox,
                        Some(entry.lookup_name()),
                        query.timeout_secs,
                    ),
                    timeout_secs: query.timeout_secs,
                })
                .collect())
        }
    }
}

/// Pulls the `elements` array out of an Overpass JSON response.
///
/// # Errors
///
/// * [`SourceError::MissingElements`] if there is no `elements` array
pub fn parse_elements(mut body: Value) -> Result<Vec<Value>, SourceError> {
    match body.get_mut("elements").map(Value::take) {
        Some(Value::Array(elements)) => Ok(elements),
        _ => Err(SourceError::MissingElements),
    }
}

/// Sends Overpass queries, one at a time, through a shared throttle.
pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
    throttle: Throttle,
}

impl OverpassClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, throttle: Throttle) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            throttle,
        }
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs one query and returns its raw elements.
    ///
    /// Waits for the throttle first. There is no retry: a failed request
    /// is reported to the caller as-is.
    ///
    /// # Errors
    ///
    /// * [`SourceError::Http`] if the request fails or times out
    /// * [`SourceError::Status`] if Overpass answers with an error status
    /// * [`SourceError::Json`] / [`SourceError::MissingElements`] if the
    ///   body isn't an Overpass JSON response
    pub async fn fetch(&self, ql: &str, timeout_secs: u64) -> Result<Vec<Value>, SourceError> {
        self.throttle.wait().await;

        log::debug!("POST {} ({} bytes of QL)", self.endpoint, ql.len());

        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(timeout_secs + CLIENT_TIMEOUT_SLACK_SECS))
            .form(&[("data", ql)])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: text.chars().take(BODY_PREVIEW_LEN).collect(),
            });
        }

        let body: Value = serde_json::from_str(&text)?;
        parse_elements(body)
    }

    /// Runs a planned request.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`].
    pub async fn fetch_planned(&self, request: &PlannedRequest) -> Result<Vec<Value>, SourceError> {
        self.fetch(&request.ql, request.timeout_secs).await
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, Throttle::default())
    }
}
