// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateProfile, Entitlement, Ethnicity, Gender, GenderPreference, MatchingCriteria, MutualMatch,
    Religion, RelationshipGoal, ScoredCandidate, ScoringWeights, SwipeDirection, SwipeEvent, SwipeQuota,
    DEFAULT_CANDIDATE_AGE,
};
pub use requests::{FindFeedRequest, RecordSwipeRequest, SaveCriteriaRequest};
pub use responses::{
    CriteriaResponse, ErrorResponse, FeedResponse, HealthResponse, MutualMatchesResponse, ProfileResponse,
    QuotaResponse, RecordSwipeResponse,
};
