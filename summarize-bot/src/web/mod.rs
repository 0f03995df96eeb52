//! Web server module for the Slack slash command.
//!
//! Routes:
//! - `GET /` health check
//! - `POST /summarize` signed slash-command webhook

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, summarize, AppState, HEALTH_MESSAGE};
pub use signature::{
    compute_slack_signature, is_timestamp_fresh, verify_slack_signature, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/summarize", post(summarize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
