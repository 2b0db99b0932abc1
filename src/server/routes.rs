//! Router configuration for the API server.

use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use super::handlers;
use super::middleware;
use super::AppState;

/// CORS for the configured origins, or any origin when none are set.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if parsed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/diag", get(handlers::diag))
        .route("/api/diag/addr", get(handlers::diag_addr))
        .route("/api/diag/sources", get(handlers::diag_sources))
        .route("/api/whoami", get(handlers::whoami))
        .route("/api/search", get(handlers::search))
        .route("/api/events/recent", get(handlers::recent_events))
        .route("/api/events/emit", post(handlers::emit_event))
        .route("/metrics", get(handlers::metrics));

    // Saved searches need a reachable database.
    if state.saved.is_some() {
        router = router
            .route(
                "/api/saved",
                get(handlers::list_saved).post(handlers::create_saved),
            )
            .route("/api/saved/:id", delete(handlers::delete_saved));
    }

    let mut router = router
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(cors_layer(&state.settings.allowed_origins));

    if state.settings.security_headers {
        router = router.layer(from_fn(middleware::security_headers));
    }
    if state.settings.max_body_bytes > 0 {
        router = router.layer(from_fn_with_state(state.clone(), middleware::limit_body));
    }

    router
        .layer(from_fn_with_state(state.clone(), middleware::track_responses))
        .with_state(state)
}
