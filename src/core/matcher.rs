use crate::core::{
    filters::shared_interests,
    jitter::{JitterRange, JitterSource, RandomJitter},
    scoring::{calculate_match_score, MIN_MATCH_SCORE},
};
use crate::models::{CandidateProfile, MatchingCriteria, ScoredCandidate, ScoringWeights};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Scores and ranks candidate pools against a user's criteria
///
/// # Pipeline Stages
/// 1. Drop the requester's own profile
/// 2. Score every remaining candidate
/// 3. Sort by score descending, then by candidate id ascending
/// 4. Truncate to the requested limit
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    jitter_range: JitterRange,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, jitter_range: JitterRange) -> Self {
        Self {
            weights,
            jitter_range,
        }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
            jitter_range: JitterRange::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Fresh entropy-seeded jitter source over this matcher's range
    pub fn jitter_source(&self) -> RandomJitter {
        RandomJitter::from_entropy(self.jitter_range)
    }

    /// Score one candidate, never failing.
    ///
    /// A scoring defect (bad weights, inverted age range) is logged and the
    /// candidate gets the floor score.
    pub fn score<J>(&self, profile: &CandidateProfile, criteria: &MatchingCriteria, jitter: &mut J) -> u8
    where
        J: JitterSource + ?Sized,
    {
        match calculate_match_score(profile, criteria, &self.weights, jitter) {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Scoring defect for candidate {}: {}", profile.id, e);
                MIN_MATCH_SCORE
            }
        }
    }

    /// Score every candidate and order them best first.
    ///
    /// Equal scores are ordered by candidate id so the output is reproducible
    /// for a given jitter sequence. Empty input gives empty output.
    pub fn rank<J>(
        &self,
        candidates: Vec<CandidateProfile>,
        criteria: &MatchingCriteria,
        jitter: &mut J,
    ) -> Vec<ScoredCandidate>
    where
        J: JitterSource + ?Sized,
    {
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|profile| {
                let match_percentage = self.score(&profile, criteria, &mut *jitter);
                let shared_interests = shared_interests(&profile, criteria);
                ScoredCandidate {
                    profile,
                    match_percentage,
                    shared_interests,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.match_percentage
                .cmp(&a.match_percentage)
                .then_with(|| a.profile.id.cmp(&b.profile.id))
        });

        scored
    }

    /// Build a discovery feed for `requester_id`
    ///
    /// # Arguments
    /// * `requester_id` - The user asking for the feed; their own profile is skipped
    /// * `criteria` - The requester's matching criteria
    /// * `candidates` - Candidate pool from the candidate source
    /// * `limit` - Maximum number of matches to return
    pub fn find_matches<J>(
        &self,
        requester_id: &str,
        criteria: &MatchingCriteria,
        candidates: Vec<CandidateProfile>,
        limit: usize,
        jitter: &mut J,
    ) -> MatchResult
    where
        J: JitterSource + ?Sized,
    {
        let candidates: Vec<CandidateProfile> = candidates
            .into_iter()
            .filter(|profile| profile.id != requester_id)
            .collect();
        let total_candidates = candidates.len();

        let mut matches = self.rank(candidates, criteria, jitter);
        matches.truncate(limit);

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
