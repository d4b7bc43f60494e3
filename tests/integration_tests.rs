// Integration tests for Deep Love Algo

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use deeplove_algo::core::{
    build_feed, process_swipe, CandidateSource, DiscoveryError, FixedClock, JitterRange, Matcher,
    MemoryQuotaStore, RandomJitter, SwipeLedger, SwipeLimitGate, SwipeOutcome, ZeroJitter,
    FREE_DAILY_SWIPE_LIMIT,
};
use deeplove_algo::models::{
    CandidateProfile, Ethnicity, Gender, GenderPreference, MatchingCriteria, RelationshipGoal, Religion,
    SwipeDirection, SwipeEvent,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

fn create_test_profile(id: &str, age: u8, gender: Gender, interests: &[&str]) -> CandidateProfile {
    CandidateProfile {
        id: id.to_string(),
        name: format!("User {}", id),
        age: Some(age),
        occupation: "Unknown".to_string(),
        bio: String::new(),
        photo: None,
        interests: interests.iter().map(|s| s.to_string()).collect(),
        relationship_goal: RelationshipGoal::LongTerm,
        gender: Some(gender),
        religion: Religion::None,
        ethnicity: Ethnicity::None,
        height_cm: Some(170),
    }
}

fn create_test_criteria() -> MatchingCriteria {
    MatchingCriteria {
        min_age: 21,
        max_age: 35,
        gender: GenderPreference::Female,
        relationship_goal: RelationshipGoal::LongTerm,
        hobbies: ["Travel", "Music"].iter().map(|s| s.to_string()).collect(),
        religion: Religion::None,
        ethnicity: Ethnicity::None,
        distance_km: 50,
        education: None,
        occupation: None,
        height_cm: None,
    }
}

/// Candidate pool and criteria held in memory
struct InMemorySource {
    profiles: Vec<CandidateProfile>,
    criteria: HashMap<String, MatchingCriteria>,
}

#[async_trait]
impl CandidateSource for InMemorySource {
    async fn fetch_candidates(
        &self,
        requester_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, DiscoveryError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.id != requester_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_criteria(&self, user_id: &str) -> Result<Option<MatchingCriteria>, DiscoveryError> {
        Ok(self.criteria.get(user_id).cloned())
    }
}

/// Swipe ledger that detects reciprocal right swipes
#[derive(Default)]
struct InMemoryLedger {
    swipes: Mutex<Vec<SwipeEvent>>,
}

#[async_trait]
impl SwipeLedger for InMemoryLedger {
    async fn record_swipe(&self, event: &SwipeEvent) -> Result<bool, DiscoveryError> {
        let mut swipes = self.swipes.lock().await;
        let is_match = event.direction == SwipeDirection::Right
            && swipes.iter().any(|s| {
                s.user_id == event.target_user_id
                    && s.target_user_id == event.user_id
                    && s.direction == SwipeDirection::Right
            });
        swipes.push(event.clone());
        Ok(is_match)
    }
}

fn swipe(from: &str, to: &str, direction: SwipeDirection) -> SwipeEvent {
    SwipeEvent {
        id: uuid::Uuid::new_v4(),
        user_id: from.to_string(),
        target_user_id: to.to_string(),
        direction,
        created_at: Utc::now(),
    }
}

fn may_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
}

#[tokio::test]
async fn test_integration_end_to_end_feed() {
    let source = InMemorySource {
        profiles: vec![
            create_test_profile("me", 30, Gender::Male, &["Travel"]),
            create_test_profile("1", 25, Gender::Female, &["Travel", "Music"]),
            create_test_profile("2", 28, Gender::Female, &["Music"]),
            create_test_profile("3", 45, Gender::Female, &[]),
            create_test_profile("4", 25, Gender::Male, &["Travel", "Music"]),
        ],
        criteria: HashMap::from([("me".to_string(), create_test_criteria())]),
    };

    let result = build_feed(&source, &Matcher::default(), "me", 10, &mut ZeroJitter)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 4);
    assert!(result.matches.iter().all(|m| m.profile.id != "me"));

    let ids: Vec<&str> = result.matches.iter().map(|m| m.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "4", "3"]);

    // Sorted best first
    for pair in result.matches.windows(2) {
        assert!(pair[0].match_percentage >= pair[1].match_percentage);
    }
    assert_eq!(result.matches[0].match_percentage, 99);
}

#[tokio::test]
async fn test_feed_without_criteria_is_rejected() {
    let source = InMemorySource {
        profiles: vec![create_test_profile("1", 25, Gender::Female, &[])],
        criteria: HashMap::new(),
    };

    let result = build_feed(&source, &Matcher::default(), "me", 10, &mut ZeroJitter).await;
    assert!(matches!(result, Err(DiscoveryError::CriteriaRequired(_))));
}

#[tokio::test]
async fn test_feed_respects_limit() {
    let profiles: Vec<CandidateProfile> = (0..60)
        .map(|i| create_test_profile(&format!("{:02}", i), 21 + (i % 15) as u8, Gender::Female, &["Music"]))
        .collect();
    let source = InMemorySource {
        profiles,
        criteria: HashMap::from([("me".to_string(), create_test_criteria())]),
    };

    let result = build_feed(&source, &Matcher::default(), "me", 10, &mut ZeroJitter)
        .await
        .unwrap();

    assert_eq!(result.matches.len(), 10);
}

#[test]
fn test_seeded_rank_is_reproducible() {
    let matcher = Matcher::with_default_weights();
    let criteria = create_test_criteria();
    let candidates: Vec<CandidateProfile> = (0..50)
        .map(|i| create_test_profile(&format!("{:02}", i), 20 + (i % 20) as u8, Gender::Female, &["Travel"]))
        .collect();

    let run = |seed: u64| {
        let mut jitter = RandomJitter::with_rng(ChaCha8Rng::seed_from_u64(seed), JitterRange::default());
        matcher.rank(candidates.clone(), &criteria, &mut jitter)
    };

    let first = run(2023);
    assert_eq!(first, run(2023));
    assert!(first.iter().all(|m| (50..=99).contains(&m.match_percentage)));
}

#[tokio::test]
async fn test_twenty_swipes_then_upgrade_required() {
    let ledger = InMemoryLedger::default();
    let mut gate = SwipeLimitGate::open(MemoryQuotaStore::new(), FixedClock::new(may_first()), "me", FREE_DAILY_SWIPE_LIMIT).await;

    for i in 0..20 {
        let outcome = process_swipe(&ledger, Some(&mut gate), &swipe("me", &i.to_string(), SwipeDirection::Left))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SwipeOutcome::Recorded {
                is_match: false,
                swipes_remaining: Some(19 - i),
            }
        );
    }

    let outcome = process_swipe(&ledger, Some(&mut gate), &swipe("me", "21", SwipeDirection::Left))
        .await
        .unwrap();
    assert_eq!(outcome, SwipeOutcome::UpgradeRequired);
    assert_eq!(gate.swipes_remaining(), 0);
    assert_eq!(ledger.swipes.lock().await.len(), 20);

    // A stray registration while exhausted never goes negative
    assert_eq!(gate.register_swipe().await, 0);
    assert_eq!(gate.quota().used_count, 20);
}

#[tokio::test]
async fn test_quota_resets_on_new_day() {
    let store = Arc::new(MemoryQuotaStore::new());
    let mut gate = SwipeLimitGate::open(store.clone(), FixedClock::new(may_first()), "me", 20).await;
    for _ in 0..20 {
        gate.register_swipe().await;
    }
    assert!(gate.is_exhausted());

    gate.clock().set(NaiveDate::from_ymd_opt(2023, 5, 2).unwrap());
    assert!(gate.check_and_reset_if_new_day().await);
    assert_eq!(gate.swipes_remaining(), 20);

    // A second session opened on the new day sees the reset
    let reopened = SwipeLimitGate::open(store, FixedClock::new(NaiveDate::from_ymd_opt(2023, 5, 2).unwrap()), "me", 20).await;
    assert_eq!(reopened.swipes_remaining(), 20);
}

#[tokio::test]
async fn test_stale_stored_quota_resets_on_open() {
    let store = Arc::new(MemoryQuotaStore::new());
    let mut yesterday = SwipeLimitGate::open(store.clone(), FixedClock::new(may_first()), "me", 20).await;
    for _ in 0..7 {
        yesterday.register_swipe().await;
    }

    let today = SwipeLimitGate::open(store, FixedClock::new(NaiveDate::from_ymd_opt(2023, 5, 2).unwrap()), "me", 20).await;
    assert_eq!(today.swipes_remaining(), 20);
    assert_eq!(today.quota().last_reset_date, NaiveDate::from_ymd_opt(2023, 5, 2).unwrap());
}

#[tokio::test]
async fn test_sessions_share_one_counter() {
    let store = Arc::new(MemoryQuotaStore::new());
    let mut phone = SwipeLimitGate::open(store.clone(), FixedClock::new(may_first()), "me", 20).await;
    let mut tablet = SwipeLimitGate::open(store.clone(), FixedClock::new(may_first()), "me", 20).await;

    for _ in 0..10 {
        phone.register_swipe().await;
        tablet.register_swipe().await;
    }

    assert_eq!(tablet.swipes_remaining(), 0);
    let reopened = SwipeLimitGate::open(store, FixedClock::new(may_first()), "me", 20).await;
    assert!(reopened.is_exhausted());
}

#[tokio::test]
async fn test_pro_users_are_never_gated() {
    let ledger = InMemoryLedger::default();

    for i in 0..50 {
        let outcome = process_swipe::<_, MemoryQuotaStore, FixedClock>(
            &ledger,
            None,
            &swipe("pro", &i.to_string(), SwipeDirection::Right),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, SwipeOutcome::Recorded { swipes_remaining: None, .. }));
    }
}

#[tokio::test]
async fn test_reciprocal_right_swipe_is_a_match() {
    let ledger = InMemoryLedger::default();

    let first = process_swipe::<_, MemoryQuotaStore, FixedClock>(&ledger, None, &swipe("a", "b", SwipeDirection::Right))
        .await
        .unwrap();
    let second = process_swipe::<_, MemoryQuotaStore, FixedClock>(&ledger, None, &swipe("b", "a", SwipeDirection::Right))
        .await
        .unwrap();

    assert_eq!(first, SwipeOutcome::Recorded { is_match: false, swipes_remaining: None });
    assert_eq!(second, SwipeOutcome::Recorded { is_match: true, swipes_remaining: None });
}
