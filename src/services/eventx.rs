use crate::models::{Industry, RawExhibitor};
use crate::services::catalog::{ExhibitorCatalog, IndustryTaxonomy};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the EventX API
#[derive(Debug, Error)]
pub enum EventxError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: missing or expired token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// EventX API client
///
/// Read-only access to the two collaborators the matching engine needs:
/// - the exhibitor catalog of one event
/// - the industry taxonomy
pub struct EventxClient {
    base_url: String,
    event_id: u32,
    token: Option<String>,
    client: Client,
}

impl EventxClient {
    /// Create a new EventX client
    pub fn new(
        base_url: String,
        event_id: u32,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, EventxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            event_id,
            token,
            client,
        })
    }

    pub fn event_id(&self) -> u32 {
        self.event_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> Result<Value, EventxError> {
        tracing::debug!("Fetching from EventX: {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(EventxError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::warn!("EventX request to {} failed: {} - {}", url, status, body);
            return Err(EventxError::ApiError(format!("{} returned {}", url, status)));
        }

        Ok(response.json().await?)
    }
}

/// Pull the record list out of `{data: [...]}`, `{<key>: [...]}` or a bare array
fn records<'a>(json: &'a Value, key: &str) -> Result<&'a Vec<Value>, EventxError> {
    json.get("data")
        .and_then(Value::as_array)
        .or_else(|| json.get(key).and_then(Value::as_array))
        .or_else(|| json.as_array())
        .ok_or_else(|| EventxError::InvalidResponse(format!("Missing {} array", key)))
}

/// Build an [`Industry`] from a taxonomy record, if it has an id and a name
fn parse_industry(record: &Value) -> Option<Industry> {
    let id = match record.get("id")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return None,
    };
    let text = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let name = text("name").or_else(|| text("en_name"))?;
    let localized_name = text("localizedName").or_else(|| text("ar_name"));

    Some(Industry {
        id,
        name,
        localized_name,
    })
}

#[async_trait]
impl ExhibitorCatalog for EventxClient {
    async fn get_exhibitors(&self) -> Result<Vec<RawExhibitor>, EventxError> {
        let url = format!(
            "{}?event_id={}",
            self.url("/get-exhibitor"),
            urlencoding::encode(&self.event_id.to_string())
        );
        let json = self.get_json(&url).await?;
        let documents = records(&json, "exhibitors")?;

        let exhibitors: Vec<RawExhibitor> = documents
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!(
            "Fetched {} exhibitors ({} records) for event {}",
            exhibitors.len(),
            documents.len(),
            self.event_id
        );

        Ok(exhibitors)
    }
}

#[async_trait]
impl IndustryTaxonomy for EventxClient {
    async fn get_industries(&self) -> Result<Vec<Industry>, EventxError> {
        let json = self.get_json(&self.url("/get-industry")).await?;
        let industries: Vec<Industry> = records(&json, "industries")?
            .iter()
            .filter_map(parse_industry)
            .collect();

        tracing::debug!("Fetched {} industries", industries.len());
        Ok(industries)
    }
}
