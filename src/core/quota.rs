//! Freemium daily swipe limit.
//!
//! The gate tracks `(last_reset_date, used_count)` for one user. Free users
//! get [`FREE_DAILY_SWIPE_LIMIT`] swipes per local calendar day; Pro users
//! never construct a gate. Persistence and "today" are injected through
//! [`QuotaStore`] and [`Clock`].

use crate::models::SwipeQuota;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Swipes per day for users without a Pro entitlement
pub const FREE_DAILY_SWIPE_LIMIT: u32 = 20;

/// Errors from quota persistence. Logged by the gate, never surfaced.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Quota storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored quota is invalid: {0}")]
    InvalidState(String),
}

/// Durable per-user quota storage
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<SwipeQuota>, QuotaError>;

    async fn save(&self, user_id: &str, quota: &SwipeQuota) -> Result<(), QuotaError>;

    /// Count one swipe for `today` as a single atomic step.
    ///
    /// A stored record from an earlier day restarts at 1. The stored count
    /// never exceeds `daily_limit`. Returns the record as written.
    async fn increment(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<SwipeQuota, QuotaError>;

    /// Consume one swipe for `today` only while one is left, as a single
    /// atomic step.
    ///
    /// A stored record from an earlier day counts as unused. Returns the
    /// record as written, or `None` when today's quota is already full.
    async fn try_consume(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<Option<SwipeQuota>, QuotaError>;

    /// Hand back one swipe consumed on `today`. Never goes below zero and
    /// never touches a record from another day.
    async fn release(&self, user_id: &str, today: NaiveDate) -> Result<(), QuotaError>;

    /// Reset a record whose day is not `today`, leaving a current record
    /// alone. Returns the record as stored afterwards.
    async fn roll_over(&self, user_id: &str, today: NaiveDate) -> Result<SwipeQuota, QuotaError>;
}

#[async_trait]
impl<T: QuotaStore + ?Sized> QuotaStore for Arc<T> {
    async fn load(&self, user_id: &str) -> Result<Option<SwipeQuota>, QuotaError> {
        (**self).load(user_id).await
    }

    async fn save(&self, user_id: &str, quota: &SwipeQuota) -> Result<(), QuotaError> {
        (**self).save(user_id, quota).await
    }

    async fn increment(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<SwipeQuota, QuotaError> {
        (**self).increment(user_id, today, daily_limit).await
    }

    async fn try_consume(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<Option<SwipeQuota>, QuotaError> {
        (**self).try_consume(user_id, today, daily_limit).await
    }

    async fn release(&self, user_id: &str, today: NaiveDate) -> Result<(), QuotaError> {
        (**self).release(user_id, today).await
    }

    async fn roll_over(&self, user_id: &str, today: NaiveDate) -> Result<SwipeQuota, QuotaError> {
        (**self).roll_over(user_id, today).await
    }
}

/// Source of the current local calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    today: std::sync::Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: std::sync::Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        match self.today.lock() {
            Ok(mut guard) => *guard = today,
            Err(poisoned) => *poisoned.into_inner() = today,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Process-local quota storage
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    entries: Mutex<HashMap<String, SwipeQuota>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self, user_id: &str) -> Result<Option<SwipeQuota>, QuotaError> {
        Ok(self.entries.lock().await.get(user_id).copied())
    }

    async fn save(&self, user_id: &str, quota: &SwipeQuota) -> Result<(), QuotaError> {
        self.entries.lock().await.insert(user_id.to_string(), *quota);
        Ok(())
    }

    async fn increment(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<SwipeQuota, QuotaError> {
        let mut entries = self.entries.lock().await;
        let current = match entries.get(user_id) {
            Some(quota) if quota.last_reset_date == today => *quota,
            _ => SwipeQuota::fresh(today),
        };
        let next = current.advanced(daily_limit);
        entries.insert(user_id.to_string(), next);
        Ok(next)
    }

    async fn try_consume(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<Option<SwipeQuota>, QuotaError> {
        let mut entries = self.entries.lock().await;
        let current = match entries.get(user_id) {
            Some(quota) if quota.last_reset_date == today => *quota,
            _ => SwipeQuota::fresh(today),
        };
        if current.used_count >= daily_limit {
            return Ok(None);
        }
        let next = current.advanced(daily_limit);
        entries.insert(user_id.to_string(), next);
        Ok(Some(next))
    }

    async fn release(&self, user_id: &str, today: NaiveDate) -> Result<(), QuotaError> {
        let mut entries = self.entries.lock().await;
        if let Some(quota) = entries.get_mut(user_id) {
            if quota.last_reset_date == today {
                quota.used_count = quota.used_count.saturating_sub(1);
            }
        }
        Ok(())
    }

    async fn roll_over(&self, user_id: &str, today: NaiveDate) -> Result<SwipeQuota, QuotaError> {
        let mut entries = self.entries.lock().await;
        let quota = entries
            .entry(user_id.to_string())
            .or_insert_with(|| SwipeQuota::fresh(today));
        if quota.last_reset_date != today {
            *quota = SwipeQuota::fresh(today);
        }
        Ok(*quota)
    }
}

/// Today's quota for a user without writing anything.
///
/// A missing or stale record reads as a full quota, as does a failed read.
pub async fn current_quota<S, C>(store: &S, clock: &C, user_id: &str) -> SwipeQuota
where
    S: QuotaStore + ?Sized,
    C: Clock + ?Sized,
{
    let today = clock.today();
    match store.load(user_id).await {
        Ok(Some(quota)) if quota.last_reset_date == today => quota,
        Ok(_) => SwipeQuota::fresh(today),
        Err(e) => {
            tracing::warn!("Failed to load swipe quota for {}, reporting full quota: {}", user_id, e);
            SwipeQuota::fresh(today)
        }
    }
}

/// Whether the user may keep swiping today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Available,
    Exhausted,
}

/// Daily swipe gate for one free-tier user.
///
/// Construct once per session (or per request on the server) with
/// [`SwipeLimitGate::open`], which loads stored state and applies the
/// day-rollover check before anything else can run.
pub struct SwipeLimitGate<S, C = LocalClock> {
    store: S,
    clock: C,
    user_id: String,
    daily_limit: u32,
    state: SwipeQuota,
}

impl<S, C> SwipeLimitGate<S, C>
where
    S: QuotaStore,
    C: Clock,
{
    /// Load the user's quota and roll it over if the stored day is stale.
    ///
    /// If the stored state cannot be read the gate starts with a full quota.
    pub async fn open(store: S, clock: C, user_id: impl Into<String>, daily_limit: u32) -> Self {
        let user_id = user_id.into();
        let today = clock.today();

        let state = match store.load(&user_id).await {
            Ok(Some(quota)) => quota,
            Ok(None) => SwipeQuota::fresh(today),
            Err(e) => {
                tracing::warn!("Failed to load swipe quota for {}, starting with full quota: {}", user_id, e);
                SwipeQuota::fresh(today)
            }
        };

        let mut gate = Self {
            store,
            clock,
            user_id,
            daily_limit,
            state,
        };
        gate.check_and_reset_if_new_day().await;
        gate
    }

    /// Reset the counter when the stored date is not today.
    ///
    /// Date and count are replaced together. Returns whether a reset happened.
    /// Safe to call on every screen load.
    pub async fn check_and_reset_if_new_day(&mut self) -> bool {
        let today = self.clock.today();
        if self.state.last_reset_date == today {
            return false;
        }

        tracing::debug!(
            "New day for {}: resetting swipe quota ({} -> {})",
            self.user_id,
            self.state.last_reset_date,
            today
        );
        self.state = match self.store.roll_over(&self.user_id, today).await {
            // Another session may already have swiped today
            Ok(stored) if stored.last_reset_date == today => stored,
            Ok(_) => SwipeQuota::fresh(today),
            Err(e) => {
                tracing::warn!("Failed to persist swipe quota reset for {}: {}", self.user_id, e);
                SwipeQuota::fresh(today)
            }
        };

        true
    }

    /// Count one swipe and return the swipes left today.
    ///
    /// Runs the day-rollover check first. The stored count is clamped at the
    /// daily limit, so calling this while exhausted changes nothing. If the
    /// write fails the swipe still counts in memory.
    pub async fn register_swipe(&mut self) -> u32 {
        self.check_and_reset_if_new_day().await;

        let local = self.state.advanced(self.daily_limit);
        let today = self.state.last_reset_date;

        self.state = match self.store.increment(&self.user_id, today, self.daily_limit).await {
            // Another request may have counted swipes since we loaded
            Ok(stored) if stored.last_reset_date == local.last_reset_date => SwipeQuota {
                last_reset_date: local.last_reset_date,
                used_count: stored.used_count.max(local.used_count),
            },
            Ok(stored) => {
                tracing::warn!(
                    "Quota store returned {} for {} but gate is on {}; keeping local count",
                    stored.last_reset_date,
                    self.user_id,
                    local.last_reset_date
                );
                local
            }
            Err(e) => {
                tracing::warn!("Failed to persist swipe for {}, keeping in-memory count: {}", self.user_id, e);
                local
            }
        };

        self.swipes_remaining()
    }

    /// Take one swipe from the stored quota before the swipe happens.
    ///
    /// Returns the swipes left afterwards, or `None` when the swipe must be
    /// denied: the quota is used up, or the store could not confirm the
    /// reservation. Concurrent sessions on one store can never reserve more
    /// than `daily_limit` swipes per day between them.
    pub async fn try_reserve_swipe(&mut self) -> Option<u32> {
        self.check_and_reset_if_new_day().await;
        let today = self.state.last_reset_date;

        match self.store.try_consume(&self.user_id, today, self.daily_limit).await {
            Ok(Some(stored)) => {
                self.state = stored;
                Some(self.swipes_remaining())
            }
            Ok(None) => {
                self.state = SwipeQuota {
                    last_reset_date: today,
                    used_count: self.state.used_count.max(self.daily_limit),
                };
                None
            }
            Err(e) => {
                tracing::warn!("Failed to reserve a swipe for {}, denying it: {}", self.user_id, e);
                None
            }
        }
    }

    /// Return a reserved swipe whose action did not complete
    pub async fn release_swipe(&mut self) {
        let today = self.state.last_reset_date;
        match self.store.release(&self.user_id, today).await {
            Ok(()) => {
                self.state.used_count = self.state.used_count.saturating_sub(1);
            }
            Err(e) => {
                tracing::warn!("Failed to release a reserved swipe for {}: {}", self.user_id, e);
            }
        }
    }

    /// `max(0, daily_limit - used_count)`
    pub fn swipes_remaining(&self) -> u32 {
        self.state.remaining(self.daily_limit)
    }

    pub fn gate_state(&self) -> GateState {
        if self.state.used_count >= self.daily_limit {
            GateState::Exhausted
        } else {
            GateState::Available
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.gate_state() == GateState::Exhausted
    }

    pub fn quota(&self) -> SwipeQuota {
        self.state
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
    }

    /// Store whose reads and writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryQuotaStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl QuotaStore for FlakyStore {
        async fn load(&self, user_id: &str) -> Result<Option<SwipeQuota>, QuotaError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("read failed".to_string()));
            }
            self.inner.load(user_id).await
        }

        async fn save(&self, user_id: &str, quota: &SwipeQuota) -> Result<(), QuotaError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("write failed".to_string()));
            }
            self.inner.save(user_id, quota).await
        }

        async fn increment(
            &self,
            user_id: &str,
            today: NaiveDate,
            daily_limit: u32,
        ) -> Result<SwipeQuota, QuotaError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("write failed".to_string()));
            }
            self.inner.increment(user_id, today, daily_limit).await
        }

        async fn try_consume(
            &self,
            user_id: &str,
            today: NaiveDate,
            daily_limit: u32,
        ) -> Result<Option<SwipeQuota>, QuotaError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("write failed".to_string()));
            }
            self.inner.try_consume(user_id, today, daily_limit).await
        }

        async fn release(&self, user_id: &str, today: NaiveDate) -> Result<(), QuotaError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("write failed".to_string()));
            }
            self.inner.release(user_id, today).await
        }

        async fn roll_over(&self, user_id: &str, today: NaiveDate) -> Result<SwipeQuota, QuotaError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(QuotaError::Unavailable("write failed".to_string()));
            }
            self.inner.roll_over(user_id, today).await
        }
    }

    #[test]
    fn test_fresh_gate_has_full_quota() {
        tokio_test::block_on(async {
            let gate = SwipeLimitGate::open(MemoryQuotaStore::new(), FixedClock::new(day(1)), "u1", 20).await;

            assert_eq!(gate.swipes_remaining(), 20);
            assert_eq!(gate.gate_state(), GateState::Available);
        });
    }

    #[test]
    fn test_twenty_swipes_exhaust_and_clamp() {
        tokio_test::block_on(async {
            let mut gate =
                SwipeLimitGate::open(MemoryQuotaStore::new(), FixedClock::new(day(1)), "u1", FREE_DAILY_SWIPE_LIMIT).await;

            for i in 1..=FREE_DAILY_SWIPE_LIMIT {
                assert_eq!(gate.register_swipe().await, FREE_DAILY_SWIPE_LIMIT - i);
            }
            assert!(gate.is_exhausted());

            assert_eq!(gate.register_swipe().await, 0);
            assert_eq!(gate.swipes_remaining(), 0);
            assert_eq!(gate.quota().used_count, FREE_DAILY_SWIPE_LIMIT);
        });
    }

    #[test]
    fn test_day_rollover_restores_quota() {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryQuotaStore::new());
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 20 })
                .await
                .unwrap();

            let clock = FixedClock::new(day(1));
            let mut gate = SwipeLimitGate::open(store.clone(), clock, "u1", 20).await;
            assert_eq!(gate.swipes_remaining(), 0);

            gate.clock().set(day(2));
            assert!(gate.check_and_reset_if_new_day().await);
            assert_eq!(gate.swipes_remaining(), 20);

            // Idempotent
            assert!(!gate.check_and_reset_if_new_day().await);

            let stored = store.load("u1").await.unwrap().unwrap();
            assert_eq!(stored, SwipeQuota::fresh(day(2)));
        });
    }

    #[test]
    fn test_open_applies_rollover() {
        tokio_test::block_on(async {
            let store = MemoryQuotaStore::new();
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 20 })
                .await
                .unwrap();

            let gate = SwipeLimitGate::open(store, FixedClock::new(day(2)), "u1", 20).await;
            assert_eq!(gate.swipes_remaining(), 20);
            assert_eq!(gate.quota().last_reset_date, day(2));
        });
    }

    #[test]
    fn test_register_swipe_rolls_over_first() {
        tokio_test::block_on(async {
            let mut gate = SwipeLimitGate::open(MemoryQuotaStore::new(), FixedClock::new(day(1)), "u1", 20).await;
            for _ in 0..20 {
                gate.register_swipe().await;
            }
            assert!(gate.is_exhausted());

            gate.clock().set(day(2));
            assert_eq!(gate.register_swipe().await, 19);
        });
    }

    #[test]
    fn test_read_failure_starts_with_full_quota() {
        tokio_test::block_on(async {
            let store = FlakyStore::default();
            store.fail_reads.store(true, Ordering::SeqCst);

            let gate = SwipeLimitGate::open(store, FixedClock::new(day(1)), "u1", 20).await;
            assert_eq!(gate.swipes_remaining(), 20);
        });
    }

    #[test]
    fn test_write_failure_never_grants_extra_swipes() {
        tokio_test::block_on(async {
            let store = Arc::new(FlakyStore::default());
            let mut gate = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;

            assert_eq!(gate.register_swipe().await, 19);

            store.fail_writes.store(true, Ordering::SeqCst);
            assert_eq!(gate.register_swipe().await, 18);
            assert_eq!(gate.register_swipe().await, 17);
        });
    }

    #[test]
    fn test_shared_store_counts_concurrent_sessions() {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryQuotaStore::new());
            let mut phone = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;
            let mut tablet = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;

            phone.register_swipe().await;
            phone.register_swipe().await;

            // The tablet loaded before the phone swiped, but adopts the stored count
            assert_eq!(tablet.register_swipe().await, 17);
        });
    }

    #[test]
    fn test_memory_store_increment_clamps_and_resets() {
        tokio_test::block_on(async {
            let store = MemoryQuotaStore::new();
            for _ in 0..25 {
                store.increment("u1", day(1), 20).await.unwrap();
            }
            assert_eq!(store.load("u1").await.unwrap().unwrap().used_count, 20);

            let next = store.increment("u1", day(2), 20).await.unwrap();
            assert_eq!(next, SwipeQuota { last_reset_date: day(2), used_count: 1 });
        });
    }

    #[test]
    fn test_gates_opened_at_nineteen_reserve_only_one_swipe() {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryQuotaStore::new());
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 19 })
                .await
                .unwrap();

            let mut first = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;
            let mut second = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;
            assert!(!first.is_exhausted());
            assert!(!second.is_exhausted());

            assert_eq!(first.try_reserve_swipe().await, Some(0));
            assert_eq!(second.try_reserve_swipe().await, None);
            assert!(second.is_exhausted());
            assert_eq!(store.load("u1").await.unwrap().unwrap().used_count, 20);
        });
    }

    #[test]
    fn test_failed_reservation_denies_every_request() {
        tokio_test::block_on(async {
            let store = Arc::new(FlakyStore::default());
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 19 })
                .await
                .unwrap();
            store.fail_writes.store(true, Ordering::SeqCst);

            for _ in 0..10 {
                let mut gate = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 20).await;
                assert_eq!(gate.try_reserve_swipe().await, None);
            }

            store.fail_writes.store(false, Ordering::SeqCst);
            assert_eq!(store.load("u1").await.unwrap().unwrap().used_count, 19);
        });
    }

    #[test]
    fn test_released_swipe_can_be_reserved_again() {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryQuotaStore::new());
            let mut gate = SwipeLimitGate::open(store.clone(), FixedClock::new(day(1)), "u1", 1).await;

            assert_eq!(gate.try_reserve_swipe().await, Some(0));
            gate.release_swipe().await;
            assert_eq!(gate.swipes_remaining(), 1);
            assert_eq!(gate.try_reserve_swipe().await, Some(0));
            assert_eq!(gate.try_reserve_swipe().await, None);
        });
    }

    #[test]
    fn test_release_ignores_other_days() {
        tokio_test::block_on(async {
            let store = MemoryQuotaStore::new();
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 5 })
                .await
                .unwrap();

            store.release("u1", day(2)).await.unwrap();
            assert_eq!(store.load("u1").await.unwrap().unwrap().used_count, 5);

            store.release("missing", day(1)).await.unwrap();
            assert_eq!(store.load("missing").await.unwrap(), None);
        });
    }

    #[test]
    fn test_try_consume_treats_stale_day_as_unused() {
        tokio_test::block_on(async {
            let store = MemoryQuotaStore::new();
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 20 })
                .await
                .unwrap();

            assert_eq!(store.try_consume("u1", day(1), 20).await.unwrap(), None);
            let next = store.try_consume("u1", day(2), 20).await.unwrap();
            assert_eq!(next, Some(SwipeQuota { last_reset_date: day(2), used_count: 1 }));
        });
    }

    #[test]
    fn test_rollover_keeps_swipes_already_taken_today() {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryQuotaStore::new());
            let clock = FixedClock::new(day(1));
            let mut phone = SwipeLimitGate::open(store.clone(), clock, "u1", 20).await;
            phone.register_swipe().await;

            let mut tablet = SwipeLimitGate::open(store.clone(), FixedClock::new(day(2)), "u1", 20).await;
            for _ in 0..3 {
                tablet.try_reserve_swipe().await;
            }

            phone.clock().set(day(2));
            assert!(phone.check_and_reset_if_new_day().await);
            assert_eq!(phone.swipes_remaining(), 17);
        });
    }

    #[test]
    fn test_current_quota_reads_without_writing() {
        tokio_test::block_on(async {
            let store = MemoryQuotaStore::new();
            store
                .save("u1", &SwipeQuota { last_reset_date: day(1), used_count: 20 })
                .await
                .unwrap();

            let quota = current_quota(&store, &FixedClock::new(day(2)), "u1").await;
            assert_eq!(quota, SwipeQuota::fresh(day(2)));
            // The stale record is still stored as-is
            assert_eq!(store.load("u1").await.unwrap().unwrap().last_reset_date, day(1));

            let today = current_quota(&store, &FixedClock::new(day(1)), "u1").await;
            assert_eq!(today.remaining(20), 0);
        });
    }

    #[test]
    fn test_current_quota_read_failure_reports_full_quota() {
        tokio_test::block_on(async {
            let store = FlakyStore::default();
            store.fail_reads.store(true, Ordering::SeqCst);

            let quota = current_quota(&store, &FixedClock::new(day(1)), "u1").await;
            assert_eq!(quota.remaining(20), 20);
        });
    }
}
