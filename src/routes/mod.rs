// Route exports
pub mod criteria;
pub mod matches;
pub mod profiles;
pub mod swipes;

use crate::config::MatchingSettings;
use crate::core::{DiscoveryError, Matcher};
use crate::models::ErrorResponse;
use crate::services::PostgresClient;
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::ValidationErrors;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
    /// Swipes per day for free-tier users
    pub daily_limit: u32,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(swipes::configure)
            .configure(criteria::configure)
            .configure(profiles::configure),
    );
}

/// Query string carrying only a user id
#[derive(Debug, serde::Deserialize)]
pub struct UserQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "validation_failed",
        errors.to_string(),
    )
}

pub(crate) fn discovery_failed(user_id: &str, err: DiscoveryError) -> HttpResponse {
    match err {
        DiscoveryError::CriteriaRequired(_) => error_response(
            actix_web::http::StatusCode::CONFLICT,
            "criteria_required",
            format!("User {} must save matching criteria first", user_id),
        ),
        DiscoveryError::Storage(message) => {
            tracing::error!("Storage failure for {}: {}", user_id, message);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                message,
            )
        }
    }
}

pub(crate) fn internal_error(error: &str, err: impl std::fmt::Display) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        error,
        err.to_string(),
    )
}
