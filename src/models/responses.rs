use serde::{Deserialize, Serialize};
use crate::models::domain::{CandidateProfile, MatchingCriteria, MutualMatch, ScoredCandidate};

/// Response for the discovery feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub matches: Vec<ScoredCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// `None` for Pro users, who have no daily limit
    #[serde(rename = "swipesRemaining")]
    pub swipes_remaining: Option<u32>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record swipe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSwipeResponse {
    pub success: bool,
    #[serde(rename = "swipeId")]
    pub swipe_id: uuid::Uuid,
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "swipesRemaining")]
    pub swipes_remaining: Option<u32>,
}

/// Current swipe quota for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "dailyLimit")]
    pub daily_limit: u32,
    #[serde(rename = "swipesRemaining")]
    pub swipes_remaining: u32,
    #[serde(rename = "resetsOn")]
    pub resets_on: chrono::NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub criteria: MatchingCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<MutualMatch>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: CandidateProfile,
}
