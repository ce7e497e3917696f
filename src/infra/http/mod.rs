pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

use axum::{Router, middleware as axum_middleware};
use tower_http::cors::CorsLayer;

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Allow any origin, method and header.
    pub cors: bool,
}

/// Assemble the public router: API routes, JSON 404 fallback, logging, request ids and optional CORS.
pub fn build_router(state: ApiState, options: RouterOptions) -> Router {
    let router = build_api_router(state)
        .fallback(api::handlers::not_found)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context));

    if options.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
