use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

/// Age assumed for candidates whose profile never stated one
pub const DEFAULT_CANDIDATE_AGE: u8 = 25;

/// Youngest age a criteria range may start at
pub const MIN_CRITERIA_AGE: u8 = 18;

/// What a user is looking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipGoal {
    #[default]
    Casual,
    LongTerm,
    Marriage,
    Friendship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Other,
}

/// Gender a user wants to see; `Any` disables the gender term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenderPreference {
    Male,
    Female,
    NonBinary,
    Other,
    #[default]
    Any,
}

impl GenderPreference {
    /// Whether a candidate of the given gender satisfies this preference.
    /// Candidates without a stated gender only satisfy `Any`.
    pub fn accepts(&self, gender: Option<Gender>) -> bool {
        match (self, gender) {
            (GenderPreference::Any, _) => true,
            (GenderPreference::Male, Some(Gender::Male)) => true,
            (GenderPreference::Female, Some(Gender::Female)) => true,
            (GenderPreference::NonBinary, Some(Gender::NonBinary)) => true,
            (GenderPreference::Other, Some(Gender::Other)) => true,
            _ => false,
        }
    }
}

/// Religion of a profile, or religion preference of a criteria record.
///
/// `None` is a real value: "not stated" on a profile and "no preference"
/// on criteria, where it acts as a wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Religion {
    Christianity,
    Islam,
    Judaism,
    Hinduism,
    Buddhism,
    Spiritual,
    Other,
    #[default]
    None,
}

/// Ethnicity of a profile, or ethnicity preference of a criteria record.
/// `None` carries the same wildcard meaning as [`Religion::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ethnicity {
    White,
    Black,
    Hispanic,
    Asian,
    Mixed,
    Other,
    #[default]
    None,
}

/// Candidate profile as supplied by the candidate source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CandidateProfile {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 18, max = 120))]
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default = "default_occupation")]
    pub occupation: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "relationshipGoal", default)]
    pub relationship_goal: RelationshipGoal,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub religion: Religion,
    #[serde(default)]
    pub ethnicity: Ethnicity,
    #[validate(range(min = 50, max = 300))]
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
}

impl CandidateProfile {
    /// Age used for scoring, defaulting when the profile never stated one
    pub fn effective_age(&self) -> u8 {
        self.age.unwrap_or(DEFAULT_CANDIDATE_AGE)
    }
}

fn default_occupation() -> String {
    "Unknown".to_string()
}

/// Matching criteria entered by the requesting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_age_order"))]
pub struct MatchingCriteria {
    #[validate(range(min = 18))]
    #[serde(rename = "minAge")]
    pub min_age: u8,
    #[validate(range(min = 18))]
    #[serde(rename = "maxAge")]
    pub max_age: u8,
    #[serde(default)]
    pub gender: GenderPreference,
    #[serde(rename = "relationshipGoal", default)]
    pub relationship_goal: RelationshipGoal,
    #[serde(default)]
    pub hobbies: BTreeSet<String>,
    #[serde(default)]
    pub religion: Religion,
    #[serde(default)]
    pub ethnicity: Ethnicity,
    #[serde(rename = "distanceKm", default = "default_distance_km")]
    pub distance_km: u16,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[validate(range(min = 50, max = 300))]
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
}

impl MatchingCriteria {
    pub fn has_ascending_age_range(&self) -> bool {
        self.min_age <= self.max_age
    }
}

fn default_distance_km() -> u16 {
    50
}

fn validate_age_order(criteria: &MatchingCriteria) -> Result<(), ValidationError> {
    if criteria.has_ascending_age_range() {
        Ok(())
    } else {
        Err(ValidationError::new("min_age_above_max_age"))
    }
}

/// Candidate with its derived match percentage. Recomputed per feed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: u8,
    #[serde(rename = "sharedInterests")]
    pub shared_interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

/// A single swipe action on the discovery feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeEvent {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub target_user_id: String,
    pub direction: SwipeDirection,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Reciprocal right swipe between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualMatch {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "matchedUserId")]
    pub matched_user_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

/// Paid tier of the requesting user, owned by the billing collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Entitlement {
    #[default]
    Free,
    Pro,
}

impl Entitlement {
    pub fn from_is_pro(is_pro: bool) -> Self {
        if is_pro {
            Entitlement::Pro
        } else {
            Entitlement::Free
        }
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, Entitlement::Pro)
    }
}

/// Persisted swipe counter for one user and one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeQuota {
    #[serde(rename = "lastResetDate")]
    pub last_reset_date: NaiveDate,
    #[serde(rename = "usedCount")]
    pub used_count: u32,
}

impl SwipeQuota {
    /// Untouched quota for the given day
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            last_reset_date: today,
            used_count: 0,
        }
    }

    /// One more swipe, clamped so the stored count never passes the limit
    pub fn advanced(&self, daily_limit: u32) -> Self {
        Self {
            last_reset_date: self.last_reset_date,
            used_count: self.used_count.saturating_add(1).min(daily_limit),
        }
    }

    pub fn remaining(&self, daily_limit: u32) -> u32 {
        daily_limit.saturating_sub(self.used_count)
    }
}

/// Scoring weights. With the defaults a perfect match sums to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub age: f64,
    pub interests: f64,
    pub relationship_goal: f64,
    pub gender: f64,
    pub religion: f64,
    pub ethnicity: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.age + self.interests + self.relationship_goal + self.gender + self.religion + self.ethnicity
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            age: 20.0,
            interests: 30.0,
            relationship_goal: 15.0,
            gender: 15.0,
            religion: 10.0,
            ethnicity: 10.0,
        }
    }
}
