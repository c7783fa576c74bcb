use actix_web::{web, HttpRequest, HttpResponse};
use campaign_indexer_logic::{ingest::Ingester, payload::Payload, signature};
use serde_json::json;
use std::sync::Arc;

pub const SIGNATURE_HEADER: &str = "x-chainhook-signature";

pub struct AppState {
    pub ingester: Arc<Ingester>,
    pub webhook_secret: String,
}

pub fn configure(config: &mut web::ServiceConfig, state: web::Data<AppState>) {
    config
        .app_data(state)
        .route("/health", web::get().to(health))
        .route("/api/chainhooks/webhook", web::get().to(webhook_ready))
        .route("/api/chainhooks/webhook", web::post().to(webhook));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn webhook_ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "chainhook webhook endpoint is ready",
    }))
}

/// The body is taken as raw bytes: the signature covers the exact bytes the
/// indexer sent, not a re-encoding.
async fn webhook(
    state: web::Data<AppState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if !signature::verify(&body, signature, &state.webhook_secret) {
        tracing::warn!("rejected webhook delivery with invalid signature");
        return HttpResponse::Unauthorized().json(json!({ "error": "invalid signature" }));
    }

    let payload: Payload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "failed to decode webhook payload");
            return HttpResponse::InternalServerError()
                .json(json!({ "error": format!("malformed payload: {err}") }));
        }
    };

    match state.ingester.process(&payload).await {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "success": true,
            "applied": outcome.applied,
            "duplicates": outcome.duplicates,
            "failed": outcome.failed,
            "ignored": outcome.ignored,
            "rolled_back": outcome.rolled_back,
        })),
        Err(err) => {
            tracing::error!(error = %err, "failed to process webhook batch");
            HttpResponse::InternalServerError()
                .json(json!({ "error": "failed to process webhook" }))
        }
    }
}
