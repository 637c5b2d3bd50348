use serde::{Deserialize, Serialize};

use crate::models::domain::{ExhibitorId, Industry, MatchResult, SavedMatch};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "activeSessions")]
    pub active_sessions: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Session state plus the current ranked list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub state: String,
    pub generation: u64,
    pub matches: Vec<MatchResult>,
    #[serde(rename = "savedExhibitorIds")]
    pub saved_exhibitor_ids: Vec<ExhibitorId>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Save endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub persisted: bool,
    #[serde(rename = "savedMatch")]
    pub saved_match: Option<SavedMatch>,
}

/// Durable saved matches of one visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "savedMatches")]
    pub saved_matches: Vec<SavedMatch>,
    pub count: usize,
}

/// Industry taxonomy response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustriesResponse {
    pub industries: Vec<Industry>,
}
