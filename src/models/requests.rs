use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::LookingFor;

/// Request to store a visitor's matching criteria
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetPreferencesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// Taxonomy ids, translated to names before scoring
    #[serde(default)]
    #[serde(alias = "industry_ids", rename = "industryIds")]
    pub industry_ids: Vec<String>,
    /// Industry names used as-is
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    #[serde(alias = "looking_for", rename = "lookingFor")]
    pub looking_for: LookingFor,
    #[validate(length(max = 128))]
    pub country: Option<String>,
    #[serde(alias = "profile_sector", rename = "profileSector")]
    pub profile_sector: Option<String>,
}

/// Request naming only the visitor (generate, refresh, reopen)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request acting on one exhibitor in the ranked list (dismiss, save)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExhibitorActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "exhibitor_id", rename = "exhibitorId")]
    pub exhibitor_id: String,
}

/// Query string of `GET /matches/saved`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavedMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_request_defaults() {
        let req: SetPreferencesRequest =
            serde_json::from_str(r#"{"userId":"v1","industryIds":["4"]}"#).unwrap();
        assert_eq!(req.industry_ids, vec!["4"]);
        assert_eq!(req.looking_for, LookingFor::All);
        assert!(req.validate().is_ok());

        let req: SetPreferencesRequest =
            serde_json::from_str(r#"{"user_id":"","lookingFor":"SPONSORS"}"#).unwrap();
        assert_eq!(req.looking_for, LookingFor::Sponsors);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_exhibitor_action_validation() {
        let req: ExhibitorActionRequest =
            serde_json::from_str(r#"{"userId":"v1","exhibitorId":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
