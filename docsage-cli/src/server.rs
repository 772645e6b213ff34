//! HTTP front end: `POST /ask` and `GET /health`.
//!
//! `/ask` always answers 200 with either `{"answer": ...}` or
//! `{"error": ...}`, including for bodies that are not valid JSON.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use docsage_lib::service::{AskRequest, AskResponse, AskService};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub documents: usize,
}

pub fn router(service: AskService) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .with_state(service)
}

async fn ask(
    State(service): State<AskService>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Json<AskResponse> {
    match payload {
        Ok(Json(request)) => Json(service.ask(&request.question).await),
        Err(rejection) => Json(AskResponse::Error {
            error: rejection.body_text(),
        }),
    }
}

async fn health(State(service): State<AskService>) -> Json<HealthResponse> {
    let documents = service.retrieval().knowledge().len();
    Json(HealthResponse {
        status: if documents == 0 { "empty" } else { "ok" },
        documents,
    })
}

/// Serve until Ctrl-C.
pub async fn serve(service: AskService, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
