use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{build_feed, current_quota, LocalClock};
use crate::models::{Entitlement, FeedResponse, FindFeedRequest, HealthResponse, MutualMatchesResponse};
use crate::routes::{discovery_failed, internal_error, validation_failed, AppState, UserQuery};

/// Configure feed and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/feed", web::post().to(find_feed))
        .route("/matches", web::get().to(get_mutual_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked discovery feed
///
/// POST /api/v1/feed
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 50,
///   "isPro": false
/// }
/// ```
async fn find_feed(
    state: web::Data<AppState>,
    req: web::Json<FindFeedRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for feed request: {:?}", errors);
        return validation_failed(errors);
    }

    let user_id = &req.user_id;
    let limit = state.matching.effective_limit(req.limit);
    let entitlement = Entitlement::from_is_pro(req.is_pro);

    tracing::info!("Building feed for user: {}, limit: {}", user_id, limit);

    let mut jitter = state.matcher.jitter_source();
    let result = match build_feed(state.postgres.as_ref(), &state.matcher, user_id, limit, &mut jitter).await {
        Ok(result) => result,
        Err(e) => return discovery_failed(user_id, e),
    };

    let swipes_remaining = if entitlement.is_pro() {
        None
    } else {
        let quota = current_quota(state.postgres.as_ref(), &LocalClock, user_id).await;
        Some(quota.remaining(state.daily_limit))
    };

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        result.matches.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(FeedResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        swipes_remaining,
    })
}

/// Mutual matches for a user
///
/// GET /api/v1/matches?userId={userId}
async fn get_mutual_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    let user_id = &query.user_id;

    match state.postgres.get_mutual_matches(user_id).await {
        Ok(matches) => HttpResponse::Ok().json(MutualMatchesResponse {
            user_id: user_id.clone(),
            count: matches.len(),
            matches,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch mutual matches for {}: {}", user_id, e);
            internal_error("match_lookup_failed", e)
        }
    }
}
