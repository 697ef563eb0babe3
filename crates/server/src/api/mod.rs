//! HTTP routes of the contest server.

pub mod contest;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

pub use contest::create_contest_router;
pub use state::AppState;

/// Full application router with state and CORS applied.
pub fn build_app(state: AppState) -> Router {
    create_contest_router()
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
