//! Deep Love Algo - matching and swipe-quota service for the Deep Love dating app
//!
//! This library scores candidate profiles against a user's matching criteria,
//! ranks them into a discovery feed, and enforces the free tier's daily
//! swipe limit.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, SwipeLimitGate, calculate_match_score, FREE_DAILY_SWIPE_LIMIT};
pub use models::{CandidateProfile, MatchingCriteria, ScoredCandidate, ScoringWeights, SwipeQuota};
