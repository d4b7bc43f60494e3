use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{CriteriaResponse, ErrorResponse, SaveCriteriaRequest};
use crate::routes::{internal_error, validation_failed, AppState, UserQuery};

/// Configure criteria routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/criteria")
            .route(web::get().to(get_criteria))
            .route(web::put().to(save_criteria)),
    );
}

/// GET /api/v1/criteria?userId={userId}
async fn get_criteria(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    let user_id = &query.user_id;

    match state.postgres.get_criteria(user_id).await {
        Ok(Some(criteria)) => HttpResponse::Ok().json(CriteriaResponse {
            user_id: user_id.clone(),
            criteria,
        }),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "criteria_not_found".to_string(),
            message: format!("No criteria saved for user {}", user_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch criteria for {}: {}", user_id, e);
            internal_error("criteria_lookup_failed", e)
        }
    }
}

/// Create or replace matching criteria
///
/// PUT /api/v1/criteria
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "criteria": {
///     "minAge": 25,
///     "maxAge": 35,
///     "gender": "female",
///     "relationshipGoal": "longTerm",
///     "hobbies": ["Travel"],
///     "religion": "none",
///     "ethnicity": "none"
///   }
/// }
/// ```
async fn save_criteria(
    state: web::Data<AppState>,
    req: web::Json<SaveCriteriaRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Rejected criteria for {}: {}", req.user_id, errors);
        return validation_failed(errors);
    }

    let SaveCriteriaRequest { user_id, criteria } = req.into_inner();

    match state.postgres.upsert_criteria(&user_id, &criteria).await {
        Ok(()) => {
            tracing::info!("Saved criteria for {}", user_id);
            HttpResponse::Ok().json(CriteriaResponse { user_id, criteria })
        }
        Err(e) => {
            tracing::error!("Failed to save criteria for {}: {}", user_id, e);
            internal_error("criteria_save_failed", e)
        }
    }
}
