use crate::core::filters::{
    ethnicity_matches, gender_matches, interest_overlap_ratio, relationship_goal_matches,
    religion_matches, years_outside_age_range,
};
use crate::core::jitter::JitterSource;
use crate::models::{CandidateProfile, MatchingCriteria, ScoringWeights};
use thiserror::Error;

/// Lowest match percentage ever reported
pub const MIN_MATCH_SCORE: u8 = 50;

/// Highest match percentage ever reported
pub const MAX_MATCH_SCORE: u8 = 99;

/// Points the age term loses per year outside the criteria range
pub const AGE_DECAY_PER_YEAR: f64 = 5.0;

/// Defects that make a score meaningless. Callers log these and fall back
/// to [`MIN_MATCH_SCORE`]; they never reach the user.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid criteria: min age {min_age} is above max age {max_age}")]
    InvertedAgeRange { min_age: u8, max_age: u8 },
}

/// Per-term contributions before jitter and clamping
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub age: f64,
    pub interests: f64,
    pub relationship_goal: f64,
    pub gender: f64,
    pub religion: f64,
    pub ethnicity: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.age + self.interests + self.relationship_goal + self.gender + self.religion + self.ethnicity
    }
}

/// Check that weights are finite, non-negative and sum to something positive
pub fn validate_weights(weights: &ScoringWeights) -> Result<(), ScoringError> {
    let all = [
        ("age", weights.age),
        ("interests", weights.interests),
        ("relationship_goal", weights.relationship_goal),
        ("gender", weights.gender),
        ("religion", weights.religion),
        ("ethnicity", weights.ethnicity),
    ];

    for (name, value) in all {
        if !value.is_finite() || value < 0.0 {
            return Err(ScoringError::InvalidWeights(format!(
                "{} weight must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    if weights.total() <= 0.0 {
        return Err(ScoringError::InvalidWeights("weights sum to zero".to_string()));
    }

    Ok(())
}

/// Compute the deterministic part of a match score.
///
/// Terms:
/// - age: full weight inside `[min_age, max_age]`, minus 5 points per year
///   outside, floored at 0
/// - interests: `shared / max(|hobbies|, 1) * weight`
/// - relationship goal: full weight on equality, otherwise 0
/// - gender: full weight when the preference is `any` or matches
/// - religion / ethnicity: full weight when the preference is `none` or matches
pub fn score_breakdown(
    profile: &CandidateProfile,
    criteria: &MatchingCriteria,
    weights: &ScoringWeights,
) -> Result<ScoreBreakdown, ScoringError> {
    validate_weights(weights)?;

    if !criteria.has_ascending_age_range() {
        return Err(ScoringError::InvertedAgeRange {
            min_age: criteria.min_age,
            max_age: criteria.max_age,
        });
    }

    let age = calculate_age_score(
        profile.effective_age(),
        criteria.min_age,
        criteria.max_age,
        weights.age,
    );

    let interests = interest_overlap_ratio(profile, criteria) * weights.interests;

    Ok(ScoreBreakdown {
        age,
        interests,
        relationship_goal: all_or_nothing(relationship_goal_matches(profile, criteria), weights.relationship_goal),
        gender: all_or_nothing(gender_matches(profile, criteria), weights.gender),
        religion: all_or_nothing(religion_matches(profile, criteria), weights.religion),
        ethnicity: all_or_nothing(ethnicity_matches(profile, criteria), weights.ethnicity),
    })
}

/// Calculate a match percentage in `[50, 99]`.
///
/// The weighted sum gets one jitter draw added, is clamped to the
/// reported range, then rounded.
pub fn calculate_match_score<J>(
    profile: &CandidateProfile,
    criteria: &MatchingCriteria,
    weights: &ScoringWeights,
    jitter: &mut J,
) -> Result<u8, ScoringError>
where
    J: JitterSource + ?Sized,
{
    let base = score_breakdown(profile, criteria, weights)?.total();
    Ok(finalize_score(base, jitter.next_jitter()))
}

/// Apply jitter, clamp and round a base score
#[inline]
pub fn finalize_score(base: f64, jitter: i32) -> u8 {
    let jittered = base + jitter as f64;
    if jittered.is_nan() {
        return MIN_MATCH_SCORE;
    }

    jittered
        .clamp(MIN_MATCH_SCORE as f64, MAX_MATCH_SCORE as f64)
        .round() as u8
}

/// Age score: full weight inside the range, linear decay outside it
#[inline]
fn calculate_age_score(age: u8, min_age: u8, max_age: u8, weight: f64) -> f64 {
    let outside = years_outside_age_range(age, min_age, max_age) as f64;
    (weight - outside * AGE_DECAY_PER_YEAR).max(0.0)
}

#[inline]
fn all_or_nothing(matched: bool, weight: f64) -> f64 {
    if matched {
        weight
    } else {
        0.0
    }
}
