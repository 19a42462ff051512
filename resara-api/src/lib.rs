pub mod analyze;
pub mod error;
pub mod state;

use axum::{routing::post, Router};
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
