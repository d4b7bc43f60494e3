use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{current_quota, process_swipe, LocalClock, SwipeLimitGate, SwipeOutcome};
use crate::models::{
    Entitlement, ErrorResponse, QuotaResponse, RecordSwipeRequest, RecordSwipeResponse, SwipeDirection, SwipeEvent,
};
use crate::routes::{discovery_failed, validation_failed, AppState, UserQuery};
use crate::services::PostgresClient;
use std::sync::Arc;

type ServerGate = SwipeLimitGate<Arc<PostgresClient>, LocalClock>;

/// Configure swipe and quota routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/swipes", web::post().to(record_swipe))
        .route("/quota", web::get().to(get_quota));
}

fn parse_direction(raw: &str) -> Option<SwipeDirection> {
    match raw.to_lowercase().as_str() {
        "left" => Some(SwipeDirection::Left),
        "right" => Some(SwipeDirection::Right),
        _ => None,
    }
}

async fn open_gate(state: &AppState, user_id: &str) -> ServerGate {
    SwipeLimitGate::open(state.postgres.clone(), LocalClock, user_id, state.daily_limit).await
}

/// Record a swipe
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "direction": "left|right",
///   "isPro": false
/// }
/// ```
///
/// Free users past their daily limit get `402 upgrade_required` and the
/// swipe is not stored.
async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<RecordSwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let direction = match parse_direction(&req.direction) {
        Some(direction) => direction,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_direction".to_string(),
                message: "Direction must be one of: left, right".to_string(),
                status_code: 400,
            });
        }
    };

    let event = SwipeEvent {
        id: uuid::Uuid::new_v4(),
        user_id: req.user_id.clone(),
        target_user_id: req.target_user_id.clone(),
        direction,
        created_at: chrono::Utc::now(),
    };

    let outcome = match Entitlement::from_is_pro(req.is_pro) {
        Entitlement::Pro => process_swipe::<_, Arc<PostgresClient>, LocalClock>(state.postgres.as_ref(), None, &event).await,
        Entitlement::Free => {
            let mut gate = open_gate(&state, &req.user_id).await;
            process_swipe(state.postgres.as_ref(), Some(&mut gate), &event).await
        }
    };

    match outcome {
        Ok(SwipeOutcome::Recorded {
            is_match,
            swipes_remaining,
        }) => {
            tracing::debug!(
                "Recorded swipe: {} -> {} ({:?}, match: {})",
                event.user_id,
                event.target_user_id,
                event.direction,
                is_match
            );
            HttpResponse::Ok().json(RecordSwipeResponse {
                success: true,
                swipe_id: event.id,
                is_match,
                swipes_remaining,
            })
        }
        Ok(SwipeOutcome::UpgradeRequired) => HttpResponse::build(StatusCode::PAYMENT_REQUIRED).json(ErrorResponse {
            error: "upgrade_required".to_string(),
            message: format!("Daily limit of {} swipes reached", state.daily_limit),
            status_code: StatusCode::PAYMENT_REQUIRED.as_u16(),
        }),
        Err(e) => discovery_failed(&req.user_id, e),
    }
}

/// Current free-tier quota. Read-only: a stale day is reported as a full
/// quota without being written back.
///
/// GET /api/v1/quota?userId={userId}
async fn get_quota(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    let quota = current_quota(state.postgres.as_ref(), &LocalClock, &query.user_id).await;

    HttpResponse::Ok().json(QuotaResponse {
        user_id: query.user_id.clone(),
        daily_limit: state.daily_limit,
        swipes_remaining: quota.remaining(state.daily_limit),
        resets_on: quota.last_reset_date.succ_opt().unwrap_or(quota.last_reset_date),
    })
}
