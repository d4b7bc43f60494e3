use crate::core::discovery::{CandidateSource, DiscoveryError, SwipeLedger};
use crate::core::quota::{QuotaError, QuotaStore};
use crate::models::{
    CandidateProfile, MatchingCriteria, MutualMatch, SwipeDirection, SwipeEvent, SwipeQuota,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Sample profiles inserted into an empty database
const SEED_PROFILES: &str = include_str!("../../data/seed_profiles.json");

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<PostgresError> for DiscoveryError {
    fn from(value: PostgresError) -> Self {
        DiscoveryError::Storage(value.to_string())
    }
}

/// PostgreSQL client backing profiles, criteria, swipes and swipe quotas
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert or replace a profile
    pub async fn upsert_profile(&self, profile: &CandidateProfile) -> Result<(), PostgresError> {
        upsert_profile_with(&self.pool, profile).await
    }

    /// Fetch one profile by id
    pub async fn get_profile(&self, id: &str) -> Result<Option<CandidateProfile>, PostgresError> {
        let query = r#"
            SELECT id, display_name, avatar_url, bio, age, occupation, interests,
                   relationship_goal, gender, religion, ethnicity, height_cm
            FROM profiles
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Fetch up to `limit` profiles other than the requester's own
    pub async fn get_candidates(
        &self,
        requester_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, PostgresError> {
        let query = r#"
            SELECT id, display_name, avatar_url, bio, age, occupation, interests,
                   relationship_goal, gender, religion, ethnicity, height_cm
            FROM profiles
            WHERE id <> $1
            ORDER BY id
            LIMIT $2
        "#;

        let limit = i64::try_from(limit)
            .map_err(|_| PostgresError::InvalidInput(format!("limit {} is too large", limit)))?;

        let rows = sqlx::query(query)
            .bind(requester_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} candidates for {}", profiles.len(), requester_id);

        Ok(profiles)
    }

    /// Get a user's matching criteria, if they have entered any
    pub async fn get_criteria(&self, user_id: &str) -> Result<Option<MatchingCriteria>, PostgresError> {
        let query = r#"
            SELECT min_age, max_age, gender, relationship_goal, hobbies, religion,
                   ethnicity, distance_km, education, occupation, height_cm
            FROM criteria
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(criteria_from_row).transpose()
    }

    /// Create or replace a user's matching criteria
    pub async fn upsert_criteria(
        &self,
        user_id: &str,
        criteria: &MatchingCriteria,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO criteria (
                user_id, min_age, max_age, gender, relationship_goal, hobbies,
                religion, ethnicity, distance_km, education, occupation, height_cm
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id)
            DO UPDATE SET
                min_age = EXCLUDED.min_age,
                max_age = EXCLUDED.max_age,
                gender = EXCLUDED.gender,
                relationship_goal = EXCLUDED.relationship_goal,
                hobbies = EXCLUDED.hobbies,
                religion = EXCLUDED.religion,
                ethnicity = EXCLUDED.ethnicity,
                distance_km = EXCLUDED.distance_km,
                education = EXCLUDED.education,
                occupation = EXCLUDED.occupation,
                height_cm = EXCLUDED.height_cm,
                updated_at = NOW()
        "#;

        let hobbies: Vec<String> = criteria.hobbies.iter().cloned().collect();

        sqlx::query(query)
            .bind(user_id)
            .bind(i16::from(criteria.min_age))
            .bind(i16::from(criteria.max_age))
            .bind(enum_to_text(&criteria.gender)?)
            .bind(enum_to_text(&criteria.relationship_goal)?)
            .bind(hobbies)
            .bind(enum_to_text(&criteria.religion)?)
            .bind(enum_to_text(&criteria.ethnicity)?)
            .bind(i32::from(criteria.distance_km))
            .bind(&criteria.education)
            .bind(&criteria.occupation)
            .bind(criteria.height_cm.map(height_to_db).transpose()?)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Saved criteria for {}", user_id);

        Ok(())
    }

    /// Record a swipe; a right swipe reports whether it completed a match
    pub async fn record_swipe(
        &self,
        swipe_id: Uuid,
        from_id: &str,
        to_id: &str,
        direction: SwipeDirection,
    ) -> Result<bool, PostgresError> {
        let insert = r#"
            INSERT INTO swipes (id, from_id, to_id, direction, created_at)
            VALUES ($1, $2, $3, $4, NOW())
        "#;

        sqlx::query(insert)
            .bind(swipe_id)
            .bind(from_id)
            .bind(to_id)
            .bind(enum_to_text(&direction)?)
            .execute(&self.pool)
            .await?;

        if direction == SwipeDirection::Left {
            return Ok(false);
        }

        let reciprocal = r#"
            SELECT EXISTS(
                SELECT 1 FROM swipes
                WHERE from_id = $1 AND to_id = $2 AND direction = 'right'
            ) AS is_match
        "#;

        let is_match: bool = sqlx::query(reciprocal)
            .bind(to_id)
            .bind(from_id)
            .fetch_one(&self.pool)
            .await?
            .try_get("is_match")?;

        tracing::debug!(
            "Recorded swipe: {} -> {} ({:?}, match: {})",
            from_id,
            to_id,
            direction,
            is_match
        );

        Ok(is_match)
    }

    /// Users who swiped right on `user_id` and were swiped right by them
    pub async fn get_mutual_matches(&self, user_id: &str) -> Result<Vec<MutualMatch>, PostgresError> {
        let query = r#"
            SELECT a.to_id AS matched_user_id,
                   MAX(GREATEST(a.created_at, b.created_at)) AS matched_at
            FROM swipes a
            JOIN swipes b
              ON a.from_id = b.to_id
             AND a.to_id = b.from_id
            WHERE a.from_id = $1
              AND a.direction = 'right'
              AND b.direction = 'right'
            GROUP BY a.to_id
            ORDER BY matched_at DESC
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(MutualMatch {
                    user_id: user_id.to_string(),
                    matched_user_id: row.try_get("matched_user_id")?,
                    matched_at: row.try_get("matched_at")?,
                })
            })
            .collect()
    }

    /// Insert the bundled sample profiles when the profiles table is empty.
    /// Returns how many were inserted.
    pub async fn seed_profiles_if_empty(&self) -> Result<usize, PostgresError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM profiles")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        if count > 0 {
            tracing::info!("Database already has {} profiles, skipping seed", count);
            return Ok(0);
        }

        let profiles: Vec<CandidateProfile> = serde_json::from_str(SEED_PROFILES)?;

        let mut tx = self.pool.begin().await?;
        for profile in &profiles {
            upsert_profile_with(&mut *tx, profile).await?;
        }
        tx.commit().await?;

        tracing::info!("Seeded {} sample profiles", profiles.len());
        Ok(profiles.len())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl CandidateSource for PostgresClient {
    async fn fetch_candidates(
        &self,
        requester_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, DiscoveryError> {
        Ok(self.get_candidates(requester_id, limit).await?)
    }

    async fn fetch_criteria(&self, user_id: &str) -> Result<Option<MatchingCriteria>, DiscoveryError> {
        Ok(self.get_criteria(user_id).await?)
    }
}

#[async_trait]
impl SwipeLedger for PostgresClient {
    async fn record_swipe(&self, event: &SwipeEvent) -> Result<bool, DiscoveryError> {
        Ok(PostgresClient::record_swipe(self, event.id, &event.user_id, &event.target_user_id, event.direction).await?)
    }
}

#[async_trait]
impl QuotaStore for PostgresClient {
    async fn load(&self, user_id: &str) -> Result<Option<SwipeQuota>, QuotaError> {
        let row = sqlx::query("SELECT quota_date, used_count FROM swipe_quota WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(quota_from_row).transpose()
    }

    async fn save(&self, user_id: &str, quota: &SwipeQuota) -> Result<(), QuotaError> {
        let query = r#"
            INSERT INTO swipe_quota (user_id, quota_date, used_count, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                quota_date = EXCLUDED.quota_date,
                used_count = EXCLUDED.used_count,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(quota.last_reset_date)
            .bind(count_to_db(quota.used_count)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Rollover and clamped increment happen in one statement, so two
    /// concurrent swipes from the same user cannot lose an update.
    async fn increment(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<SwipeQuota, QuotaError> {
        let query = r#"
            INSERT INTO swipe_quota (user_id, quota_date, used_count, updated_at)
            VALUES ($1, $2, LEAST(1, $3), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                used_count = CASE
                    WHEN swipe_quota.quota_date = EXCLUDED.quota_date
                        THEN LEAST(swipe_quota.used_count + 1, $3)
                    ELSE LEAST(1, $3)
                END,
                quota_date = EXCLUDED.quota_date,
                updated_at = EXCLUDED.updated_at
            RETURNING quota_date, used_count
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(today)
            .bind(count_to_db(daily_limit)?)
            .fetch_one(&self.pool)
            .await?;

        quota_from_row(&row)
    }

    /// The `WHERE` on the conflict branch runs against the locked row, so
    /// concurrent reservations can never push the count past the limit.
    async fn try_consume(
        &self,
        user_id: &str,
        today: NaiveDate,
        daily_limit: u32,
    ) -> Result<Option<SwipeQuota>, QuotaError> {
        if daily_limit == 0 {
            return Ok(None);
        }

        let query = r#"
            INSERT INTO swipe_quota (user_id, quota_date, used_count, updated_at)
            VALUES ($1, $2, 1, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                used_count = CASE
                    WHEN swipe_quota.quota_date = EXCLUDED.quota_date
                        THEN swipe_quota.used_count + 1
                    ELSE 1
                END,
                quota_date = EXCLUDED.quota_date,
                updated_at = EXCLUDED.updated_at
            WHERE swipe_quota.quota_date <> EXCLUDED.quota_date
               OR swipe_quota.used_count < $3
            RETURNING quota_date, used_count
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(today)
            .bind(count_to_db(daily_limit)?)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(quota_from_row).transpose()
    }

    async fn release(&self, user_id: &str, today: NaiveDate) -> Result<(), QuotaError> {
        let query = r#"
            UPDATE swipe_quota
            SET used_count = used_count - 1,
                updated_at = NOW()
            WHERE user_id = $1
              AND quota_date = $2
              AND used_count > 0
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(today)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn roll_over(&self, user_id: &str, today: NaiveDate) -> Result<SwipeQuota, QuotaError> {
        let query = r#"
            INSERT INTO swipe_quota (user_id, quota_date, used_count, updated_at)
            VALUES ($1, $2, 0, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                quota_date = EXCLUDED.quota_date,
                used_count = 0,
                updated_at = EXCLUDED.updated_at
            WHERE swipe_quota.quota_date <> EXCLUDED.quota_date
            RETURNING quota_date, used_count
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(today)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => quota_from_row(&row),
            // Already on today: keep whatever has been counted
            None => Ok(self.load(user_id).await?.unwrap_or_else(|| SwipeQuota::fresh(today))),
        }
    }
}

async fn upsert_profile_with<'e, E>(executor: E, profile: &CandidateProfile) -> Result<(), PostgresError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let query = r#"
        INSERT INTO profiles (
            id, display_name, avatar_url, bio, age, occupation, interests,
            relationship_goal, gender, religion, ethnicity, height_cm
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id)
        DO UPDATE SET
            display_name = EXCLUDED.display_name,
            avatar_url = EXCLUDED.avatar_url,
            bio = EXCLUDED.bio,
            age = EXCLUDED.age,
            occupation = EXCLUDED.occupation,
            interests = EXCLUDED.interests,
            relationship_goal = EXCLUDED.relationship_goal,
            gender = EXCLUDED.gender,
            religion = EXCLUDED.religion,
            ethnicity = EXCLUDED.ethnicity,
            height_cm = EXCLUDED.height_cm,
            updated_at = NOW()
    "#;

    let interests: Vec<String> = profile.interests.iter().cloned().collect();
    let gender = profile.gender.as_ref().map(enum_to_text).transpose()?;

    sqlx::query(query)
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.photo)
        .bind(&profile.bio)
        .bind(profile.age.map(i16::from))
        .bind(&profile.occupation)
        .bind(interests)
        .bind(enum_to_text(&profile.relationship_goal)?)
        .bind(gender)
        .bind(enum_to_text(&profile.religion)?)
        .bind(enum_to_text(&profile.ethnicity)?)
        .bind(profile.height_cm.map(height_to_db).transpose()?)
        .execute(executor)
        .await?;

    Ok(())
}

fn profile_from_row(row: &PgRow) -> Result<CandidateProfile, PostgresError> {
    let age: Option<i16> = row.try_get("age")?;
    let height_cm: Option<i16> = row.try_get("height_cm")?;
    let interests: Option<Vec<String>> = row.try_get("interests")?;
    let gender: Option<String> = row.try_get("gender")?;

    Ok(CandidateProfile {
        id: row.try_get("id")?,
        name: row.try_get::<Option<String>, _>("display_name")?.unwrap_or_default(),
        age: age.and_then(|a| u8::try_from(a).ok()),
        occupation: row
            .try_get::<Option<String>, _>("occupation")?
            .unwrap_or_else(|| "Unknown".to_string()),
        bio: row.try_get::<Option<String>, _>("bio")?.unwrap_or_default(),
        photo: row.try_get("avatar_url")?,
        interests: interests.unwrap_or_default().into_iter().collect(),
        relationship_goal: text_to_enum_or_default(row.try_get("relationship_goal")?),
        gender: gender.as_deref().and_then(text_to_enum),
        religion: text_to_enum_or_default(row.try_get("religion")?),
        ethnicity: text_to_enum_or_default(row.try_get("ethnicity")?),
        height_cm: height_cm.and_then(|h| u16::try_from(h).ok()),
    })
}

fn criteria_from_row(row: &PgRow) -> Result<MatchingCriteria, PostgresError> {
    let min_age: i16 = row.try_get("min_age")?;
    let max_age: i16 = row.try_get("max_age")?;
    let hobbies: Option<Vec<String>> = row.try_get("hobbies")?;
    let distance_km: Option<i32> = row.try_get("distance_km")?;
    let height_cm: Option<i16> = row.try_get("height_cm")?;

    Ok(MatchingCriteria {
        min_age: u8::try_from(min_age)
            .map_err(|_| PostgresError::InvalidInput(format!("stored min_age {} out of range", min_age)))?,
        max_age: u8::try_from(max_age)
            .map_err(|_| PostgresError::InvalidInput(format!("stored max_age {} out of range", max_age)))?,
        gender: text_to_enum_or_default(row.try_get("gender")?),
        relationship_goal: text_to_enum_or_default(row.try_get("relationship_goal")?),
        hobbies: hobbies.unwrap_or_default().into_iter().collect(),
        religion: text_to_enum_or_default(row.try_get("religion")?),
        ethnicity: text_to_enum_or_default(row.try_get("ethnicity")?),
        distance_km: distance_km.and_then(|d| u16::try_from(d).ok()).unwrap_or(50),
        education: row.try_get("education")?,
        occupation: row.try_get("occupation")?,
        height_cm: height_cm.and_then(|h| u16::try_from(h).ok()),
    })
}

fn quota_from_row(row: &PgRow) -> Result<SwipeQuota, QuotaError> {
    let used_count: i32 = row.try_get("used_count")?;

    Ok(SwipeQuota {
        last_reset_date: row.try_get("quota_date")?,
        used_count: u32::try_from(used_count)
            .map_err(|_| QuotaError::InvalidState(format!("negative used_count {}", used_count)))?,
    })
}

fn count_to_db(count: u32) -> Result<i32, QuotaError> {
    i32::try_from(count).map_err(|_| QuotaError::InvalidState(format!("count {} does not fit the column", count)))
}

fn height_to_db(height_cm: u16) -> Result<i16, PostgresError> {
    i16::try_from(height_cm)
        .map_err(|_| PostgresError::InvalidInput(format!("height {} cm does not fit the column", height_cm)))
}

/// Wire name of a unit enum, as used in the text columns
fn enum_to_text<T: Serialize>(value: &T) -> Result<String, PostgresError> {
    match serde_json::to_value(value)? {
        Value::String(s) => Ok(s),
        other => Err(PostgresError::InvalidInput(format!("expected a unit enum, got {}", other))),
    }
}

fn text_to_enum<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(Value::String(raw.to_string())).ok()
}

/// Unknown or missing values fall back to the enum default ("none", "casual", "any")
fn text_to_enum_or_default<T: DeserializeOwned + Default>(raw: Option<String>) -> T {
    match raw.as_deref() {
        Some(text) => text_to_enum(text).unwrap_or_else(|| {
            tracing::debug!("Unrecognized stored value {:?}, using default", text);
            T::default()
        }),
        None => T::default(),
    }
}
