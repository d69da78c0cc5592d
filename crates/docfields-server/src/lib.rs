//! docfields-server - REST API server for docfields.
//!
//! # Example
//!
//! ```ignore
//! use docfields_server::{create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(service, 10 * 1024 * 1024);
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8001").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Create the server with all routes and middleware.
///
/// Layers apply outside-in: request logging, CORS, then per-request spans.
pub fn create_server(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    routes::create_router(state)
        .layer(trace)
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
