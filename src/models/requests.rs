use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::MatchingCriteria;

/// Request for a ranked discovery feed
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindFeedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// Falls back to the configured default and is capped at the configured max
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    #[serde(alias = "is_pro", rename = "isPro")]
    pub is_pro: bool,
}

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
    pub direction: String,
    #[serde(default)]
    #[serde(alias = "is_pro", rename = "isPro")]
    pub is_pro: bool,
}

/// Request to create or replace a user's matching criteria
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveCriteriaRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(nested)]
    pub criteria: MatchingCriteria,
}
