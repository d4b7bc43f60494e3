// Core algorithm exports
pub mod discovery;
pub mod filters;
pub mod jitter;
pub mod matcher;
pub mod quota;
pub mod scoring;

pub use discovery::{build_feed, process_swipe, CandidateSource, DiscoveryError, SwipeLedger, SwipeOutcome};
pub use filters::{interest_overlap_ratio, shared_interests};
pub use jitter::{FixedJitter, JitterRange, JitterSource, RandomJitter, ZeroJitter};
pub use matcher::{MatchResult, Matcher};
pub use quota::{
    current_quota, Clock, FixedClock, GateState, LocalClock, MemoryQuotaStore, QuotaError, QuotaStore,
    SwipeLimitGate, FREE_DAILY_SWIPE_LIMIT,
};
pub use scoring::{
    calculate_match_score, score_breakdown, validate_weights, ScoreBreakdown, ScoringError, MAX_MATCH_SCORE,
    MIN_MATCH_SCORE,
};
