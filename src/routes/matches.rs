use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::SessionError;
use crate::models::{
    ErrorResponse, ExhibitorActionRequest, HealthResponse, IndustriesResponse, MatchesResponse,
    SaveResponse, SavedMatchesQuery, SavedMatchesResponse, SessionRequest, SetPreferencesRequest,
};
use crate::services::{MatchmakingService, PreferenceSelection, ServiceError, SessionSnapshot};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MatchmakingService>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/industries", web::get().to(list_industries))
        .route("/matches/preferences", web::post().to(set_preferences))
        .route("/matches/generate", web::post().to(generate_matches))
        .route("/matches/refresh", web::post().to(refresh_matches))
        .route("/matches/reopen", web::post().to(reopen_preferences))
        .route("/matches/dismiss", web::post().to(dismiss_match))
        .route("/matches/save", web::post().to(save_match))
        .route("/matches/saved", web::get().to(list_saved));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

fn service_error(err: ServiceError) -> HttpResponse {
    let (status, error) = match &err {
        ServiceError::Session(SessionError::InvalidTransition { .. }) => {
            (StatusCode::CONFLICT, "Invalid session transition")
        }
        ServiceError::Session(SessionError::EmptySelection) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "No industries selected")
        }
        ServiceError::Session(SessionError::UnknownExhibitor(_)) => {
            (StatusCode::NOT_FOUND, "Unknown exhibitor")
        }
        ServiceError::Repository(_) => {
            tracing::error!("Saved match store error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read saved matches")
        }
    };
    error_response(status, error, err.to_string())
}

fn matches_response(snapshot: SessionSnapshot) -> HttpResponse {
    HttpResponse::Ok().json(MatchesResponse {
        user_id: snapshot.user_id,
        state: snapshot.state.to_string(),
        generation: snapshot.generation,
        total_results: snapshot.matches.len(),
        matches: snapshot.matches,
        saved_exhibitor_ids: snapshot.saved_exhibitor_ids,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state
        .service
        .repository()
        .health_check()
        .await
        .unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        active_sessions: state.service.active_sessions(),
    })
}

/// GET /api/v1/industries
async fn list_industries(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(IndustriesResponse {
        industries: state.service.industries().await,
    })
}

/// Set preferences endpoint
///
/// POST /api/v1/matches/preferences
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "industryIds": ["string"],
///   "industries": ["string"],
///   "interests": ["string"],
///   "lookingFor": "ALL|SPONSORS|PARTNERS",
///   "country": "string",
///   "profileSector": "string"
/// }
/// ```
async fn set_preferences(
    state: web::Data<AppState>,
    req: web::Json<SetPreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for set_preferences request: {:?}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();
    let selection = PreferenceSelection {
        industry_ids: req.industry_ids,
        industries: req.industries,
        interests: req.interests,
        looking_for: req.looking_for,
        country: req.country,
        profile_sector: req.profile_sector,
    };

    match state.service.set_preferences(&req.user_id, selection).await {
        Ok(snapshot) => matches_response(snapshot),
        Err(e) => service_error(e),
    }
}

/// POST /api/v1/matches/generate
async fn generate_matches(
    state: web::Data<AppState>,
    req: web::Json<SessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.service.generate(&req.user_id).await {
        Ok(snapshot) => matches_response(snapshot),
        Err(e) => service_error(e),
    }
}

/// POST /api/v1/matches/refresh
async fn refresh_matches(
    state: web::Data<AppState>,
    req: web::Json<SessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.service.refresh(&req.user_id).await {
        Ok(snapshot) => matches_response(snapshot),
        Err(e) => service_error(e),
    }
}

/// POST /api/v1/matches/reopen
async fn reopen_preferences(
    state: web::Data<AppState>,
    req: web::Json<SessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.service.reopen(&req.user_id).await {
        Ok(snapshot) => matches_response(snapshot),
        Err(e) => service_error(e),
    }
}

/// Dismiss endpoint. Session-only; the exhibitor comes back on refresh.
///
/// POST /api/v1/matches/dismiss
async fn dismiss_match(
    state: web::Data<AppState>,
    req: web::Json<ExhibitorActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.service.dismiss(&req.user_id, &req.exhibitor_id).await {
        Ok(snapshot) => matches_response(snapshot),
        Err(e) => service_error(e),
    }
}

/// Save endpoint
///
/// POST /api/v1/matches/save
///
/// Responds 200 even when the store rejected the write; `persisted` tells
/// the client whether the save is durable yet.
async fn save_match(
    state: web::Data<AppState>,
    req: web::Json<ExhibitorActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.service.save(&req.user_id, &req.exhibitor_id).await {
        Ok(outcome) => HttpResponse::Ok().json(SaveResponse {
            success: true,
            persisted: outcome.persisted,
            saved_match: outcome.saved_match,
        }),
        Err(e) => service_error(e),
    }
}

/// Get saved matches for a user
///
/// GET /api/v1/matches/saved?userId={userId}
async fn list_saved(
    state: web::Data<AppState>,
    query: web::Query<SavedMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    match state.service.list_saved(&query.user_id).await {
        Ok(saved) => HttpResponse::Ok().json(SavedMatchesResponse {
            user_id: query.user_id.clone(),
            count: saved.len(),
            saved_matches: saved,
        }),
        Err(e) => service_error(e),
    }
}
