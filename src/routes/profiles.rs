use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{CandidateProfile, ErrorResponse, ProfileResponse};
use crate::routes::{internal_error, validation_failed, AppState};

/// Configure profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/profiles/{id}")
            .route(web::get().to(get_profile))
            .route(web::put().to(save_profile)),
    );
}

/// GET /api/v1/profiles/{id}
async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match state.postgres.get_profile(&id).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(ProfileResponse { profile }),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "profile_not_found".to_string(),
            message: format!("No profile with id {}", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch profile {}: {}", id, e);
            internal_error("profile_lookup_failed", e)
        }
    }
}

/// Create or replace a profile
///
/// PUT /api/v1/profiles/{id}
///
/// Request body:
/// ```json
/// {
///   "id": "string",
///   "name": "Sophia",
///   "age": 28,
///   "interests": ["Travel", "Photography"],
///   "relationshipGoal": "longTerm",
///   "gender": "female",
///   "heightCm": 168
/// }
/// ```
///
/// The body id must match the path id.
async fn save_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CandidateProfile>,
) -> impl Responder {
    let id = path.into_inner();
    let profile = req.into_inner();

    if let Some(response) = reject_profile(&id, &profile) {
        return response;
    }

    match state.postgres.upsert_profile(&profile).await {
        Ok(()) => {
            tracing::info!("Saved profile {}", id);
            HttpResponse::Ok().json(ProfileResponse { profile })
        }
        Err(e) => {
            tracing::error!("Failed to save profile {}: {}", id, e);
            internal_error("profile_save_failed", e)
        }
    }
}

/// Error response for a profile body that may not be stored under `id`
fn reject_profile(id: &str, profile: &CandidateProfile) -> Option<HttpResponse> {
    if profile.id != id {
        return Some(HttpResponse::BadRequest().json(ErrorResponse {
            error: "id_mismatch".to_string(),
            message: format!("Body id {} does not match path id {}", profile.id, id),
            status_code: 400,
        }));
    }

    if let Err(errors) = profile.validate() {
        tracing::info!("Rejected profile {}: {}", id, errors);
        return Some(validation_failed(errors));
    }

    None
}
