use crate::core::jitter::JitterSource;
use crate::core::matcher::{MatchResult, Matcher};
use crate::core::quota::{Clock, QuotaStore, SwipeLimitGate};
use crate::models::{CandidateProfile, MatchingCriteria, SwipeEvent};
use async_trait::async_trait;
use thiserror::Error;

/// Candidates fetched per requested feed slot, so ranking has a wider pool
const CANDIDATE_POOL_FACTOR: usize = 5;

/// Errors from the discovery flow
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The user has not entered matching criteria yet
    #[error("Criteria required for user {0}")]
    CriteriaRequired(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Where candidate profiles and stored criteria come from
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Up to `limit` profiles, never including `requester_id`
    async fn fetch_candidates(
        &self,
        requester_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, DiscoveryError>;

    async fn fetch_criteria(&self, user_id: &str) -> Result<Option<MatchingCriteria>, DiscoveryError>;
}

/// Persisted swipe history
#[async_trait]
pub trait SwipeLedger: Send + Sync {
    /// Store the swipe and report whether it completed a mutual match
    async fn record_swipe(&self, event: &SwipeEvent) -> Result<bool, DiscoveryError>;
}

/// Outcome of a swipe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Recorded {
        is_match: bool,
        /// `None` when no gate applies (Pro users)
        swipes_remaining: Option<u32>,
    },
    /// Free quota is used up; the client should show the paywall
    UpgradeRequired,
}

/// Fetch criteria and candidates, then rank them.
///
/// Missing criteria is a precondition failure surfaced as
/// [`DiscoveryError::CriteriaRequired`].
pub async fn build_feed<S, J>(
    source: &S,
    matcher: &Matcher,
    user_id: &str,
    limit: usize,
    jitter: &mut J,
) -> Result<MatchResult, DiscoveryError>
where
    S: CandidateSource + ?Sized,
    J: JitterSource + ?Sized,
{
    let criteria = source
        .fetch_criteria(user_id)
        .await?
        .ok_or_else(|| DiscoveryError::CriteriaRequired(user_id.to_string()))?;

    let pool_size = limit.saturating_mul(CANDIDATE_POOL_FACTOR);
    let candidates = source.fetch_candidates(user_id, pool_size).await?;
    tracing::debug!("Scoring {} candidates for {}", candidates.len(), user_id);

    Ok(matcher.find_matches(user_id, &criteria, candidates, limit, jitter))
}

/// Apply the swipe gate (if any), then record the swipe.
///
/// With a gate, one swipe is reserved from the stored quota first. If
/// nothing could be reserved (quota used up, or the store failed) the swipe
/// is denied and nothing is recorded. If recording fails the reservation is
/// handed back.
pub async fn process_swipe<L, S, C>(
    ledger: &L,
    gate: Option<&mut SwipeLimitGate<S, C>>,
    event: &SwipeEvent,
) -> Result<SwipeOutcome, DiscoveryError>
where
    L: SwipeLedger + ?Sized,
    S: QuotaStore,
    C: Clock,
{
    match gate {
        Some(gate) => {
            let remaining = match gate.try_reserve_swipe().await {
                Some(remaining) => remaining,
                None => {
                    tracing::info!("User {} is out of swipes for today", event.user_id);
                    return Ok(SwipeOutcome::UpgradeRequired);
                }
            };

            match ledger.record_swipe(event).await {
                Ok(is_match) => Ok(SwipeOutcome::Recorded {
                    is_match,
                    swipes_remaining: Some(remaining),
                }),
                Err(e) => {
                    gate.release_swipe().await;
                    Err(e)
                }
            }
        }
        None => {
            let is_match = ledger.record_swipe(event).await?;
            Ok(SwipeOutcome::Recorded {
                is_match,
                swipes_remaining: None,
            })
        }
    }
}
