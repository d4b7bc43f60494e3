use crate::models::{CandidateProfile, Ethnicity, MatchingCriteria, Religion};

/// Years a candidate's age lies outside the criteria range (0 when inside)
#[inline]
pub fn years_outside_age_range(age: u8, min_age: u8, max_age: u8) -> u8 {
    if age < min_age {
        min_age - age
    } else if age > max_age {
        age - max_age
    } else {
        0
    }
}

/// Interests the candidate shares with the criteria hobbies, in sorted order
#[inline]
pub fn shared_interests(profile: &CandidateProfile, criteria: &MatchingCriteria) -> Vec<String> {
    profile
        .interests
        .intersection(&criteria.hobbies)
        .cloned()
        .collect()
}

/// Overlap ratio for the interest term.
///
/// The denominator is the number of hobbies the *requester* asked for, not
/// the candidate's interest count, so a candidate can reach 1.0 only by
/// covering every requested hobby. An empty hobby set yields 0.0.
#[inline]
pub fn interest_overlap_ratio(profile: &CandidateProfile, criteria: &MatchingCriteria) -> f64 {
    let shared = profile.interests.intersection(&criteria.hobbies).count();
    shared as f64 / criteria.hobbies.len().max(1) as f64
}

#[inline]
pub fn relationship_goal_matches(profile: &CandidateProfile, criteria: &MatchingCriteria) -> bool {
    profile.relationship_goal == criteria.relationship_goal
}

#[inline]
pub fn gender_matches(profile: &CandidateProfile, criteria: &MatchingCriteria) -> bool {
    criteria.gender.accepts(profile.gender)
}

/// `Religion::None` on the criteria side means "no preference"
#[inline]
pub fn religion_matches(profile: &CandidateProfile, criteria: &MatchingCriteria) -> bool {
    criteria.religion == Religion::None || criteria.religion == profile.religion
}

/// `Ethnicity::None` on the criteria side means "no preference"
#[inline]
pub fn ethnicity_matches(profile: &CandidateProfile, criteria: &MatchingCriteria) -> bool {
    criteria.ethnicity == Ethnicity::None || criteria.ethnicity == profile.ethnicity
}
