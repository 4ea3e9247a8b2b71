use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{Assistant, Category, RecommendError, RecommendationOrchestrator};
use crate::models::{
    ChatRequest, ErrorResponse, HealthResponse, IntentListResponse, IntentRequest, IntentResponse, ModelStatus,
    ModerateRequest, RecommendationsQuery,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: RecommendationOrchestrator,
    pub assistant: Assistant,
    /// Used when a request carries no `limit`
    pub default_limit: u16,
    pub max_limit: u16,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations/{user_id}", web::get().to(get_recommendations))
        .route("/compatibility/{user_a}/{user_b}", web::get().to(get_compatibility))
        .route("/moderate", web::post().to(moderate))
        .route("/assistant/chat", web::post().to(chat))
        .route("/assistant/intent", web::post().to(classify_intent))
        .route("/assistant/intents", web::get().to(list_intents));
}

fn error_body(status: u16, error: &str, message: String) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    }
}

fn recommend_error_response(err: RecommendError) -> HttpResponse {
    match &err {
        RecommendError::ProfileNotFound(_) => {
            HttpResponse::NotFound().json(error_body(404, "Profile not found", err.to_string()))
        }
        RecommendError::InvalidCategory(_) => {
            HttpResponse::BadRequest().json(error_body(400, "Invalid category", err.to_string()))
        }
        RecommendError::Store(e) => {
            tracing::error!("Profile store failure: {}", e);
            HttpResponse::InternalServerError().json(error_body(500, "Failed to load profiles", err.to_string()))
        }
        RecommendError::Timeout(_) => {
            tracing::warn!("{}", err);
            HttpResponse::GatewayTimeout().json(error_body(504, "Request timed out", err.to_string()))
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.orchestrator.store().health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        models: ModelStatus {
            embedding: state.orchestrator.encoder().is_available(),
            toxicity: state.orchestrator.moderator().is_available(),
        },
    })
}

/// Recommendations endpoint
///
/// GET /api/v1/recommendations/{user_id}?category=all&limit=10
///
/// `category` is one of study_buddies, mentors, collaborators, semantic,
/// groups, skill_swap or all.
async fn get_recommendations(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<RecommendationsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let user_id = path.into_inner();
    let category = match query.category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return recommend_error_response(e),
    };
    let limit = query.limit_or(state.default_limit).clamp(1, state.max_limit.max(1)) as usize;

    tracing::info!("Recommendations requested: user={}, category={}, limit={}", user_id, category, limit);

    match state.orchestrator.get_recommendations(user_id, category, limit).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => recommend_error_response(e),
    }
}

/// Compatibility endpoint
///
/// GET /api/v1/compatibility/{user_a}/{user_b}
async fn get_compatibility(state: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (user_a, user_b) = path.into_inner();

    match state.orchestrator.score_compatibility(user_a, user_b).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => recommend_error_response(e),
    }
}

/// Moderation endpoint
///
/// POST /api/v1/moderate
///
/// Request body:
/// ```json
/// { "text": "string" }
/// ```
async fn moderate(state: web::Data<AppState>, req: web::Json<ModerateRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    HttpResponse::Ok().json(state.orchestrator.moderate(&req.text).await)
}

/// Assistant chat endpoint
///
/// POST /api/v1/assistant/chat
///
/// Request body:
/// ```json
/// { "user_id": 1, "message": "Je cherche un parrain" }
/// ```
async fn chat(state: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    match state.assistant.process_message(req.user_id, &req.text).await {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(e) => recommend_error_response(e),
    }
}

/// Assistant intent endpoint
///
/// POST /api/v1/assistant/intent
async fn classify_intent(state: web::Data<AppState>, req: web::Json<IntentRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let found = state.assistant.classifier().classify(&req.text).await;
    tracing::debug!("Intent {} ({:.3})", found.intent, found.confidence);

    HttpResponse::Ok().json(IntentResponse {
        intent: found.intent,
        confidence: found.confidence,
    })
}

async fn list_intents(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(IntentListResponse {
        intents: state.assistant.classifier().definitions().to_vec(),
    })
}
