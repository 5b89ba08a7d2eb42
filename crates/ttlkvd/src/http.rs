//! HTTP front end: `/set`, `/get`, `/delete`
//!
//! ```text
//! curl -X POST -H "Content-Type: application/json" -d '{"key":"foo","value":"bar","ttl":60}' http://localhost:6060/set
//! curl -X GET "http://localhost:6060/get?key=foo"
//! curl -X DELETE "http://localhost:6060/delete?key=foo"
//! ```

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};
use ttlkv::protocol::{Reply, Request};

use crate::handler::CommandHandler;

/// Query string for the read and delete endpoints
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    /// Missing `key` means the empty key
    #[serde(default)]
    pub key: String,
}

pub fn router(handler: CommandHandler) -> Router {
    Router::new()
        .route("/set", post(set_handler))
        .route("/get", get(get_handler))
        .route("/delete", delete(delete_handler))
        .with_state(handler)
}

/// Serve the router until `shutdown` fires, then drain in-flight requests
pub async fn serve(
    listener: TcpListener,
    handler: CommandHandler,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            info!("HTTP server shutting down");
        })
        .await
}

/// The body is decoded as JSON whatever its `Content-Type` says
async fn set_handler(State(handler): State<CommandHandler>, body: Bytes) -> Response {
    match serde_json::from_slice::<Request>(&body) {
        Ok(req) => Json(handler.handle_set(req)).into_response(),
        Err(e) => {
            warn!("Invalid /set request: {}", e);
            (StatusCode::BAD_REQUEST, format!("invalid request body: {}", e)).into_response()
        }
    }
}

async fn get_handler(
    State(handler): State<CommandHandler>,
    Query(query): Query<KeyQuery>,
) -> Json<Reply> {
    Json(handler.handle_get(&query.key))
}

async fn delete_handler(
    State(handler): State<CommandHandler>,
    Query(query): Query<KeyQuery>,
) -> Json<Reply> {
    Json(handler.handle_delete(&query.key))
}
