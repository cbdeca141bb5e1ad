//! API routes

use crate::handlers;
use crate::state::AppState;
use axum::{http::HeaderName, routing::get, Router};
use ferrea_core::CORRELATION_HEADER;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Origins allowed when `FERREA_CORS_ORIGINS` is unset
const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Build the CORS layer from a comma-separated origin list, or `*` for any
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let allow_origin = match origins.map(str::trim) {
        Some("*") => AllowOrigin::any(),
        Some(origins) => AllowOrigin::list(
            origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect::<Vec<_>>(),
        ),
        None => AllowOrigin::list(DEV_ORIGINS.iter().filter_map(|s| s.parse().ok())),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(CORRELATION_HEADER)])
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(std::env::var("FERREA_CORS_ORIGINS").ok().as_deref());
    let correlation = HeaderName::from_static(CORRELATION_HEADER);

    let book_routes = Router::new()
        .route("/book/:isbn", get(handlers::get_book))
        .route("/book/:provider/:isbn", get(handlers::get_book_from));

    Router::new()
        .nest("/api/v1", book_routes.clone())
        .merge(book_routes)
        .route("/_/ready", get(handlers::ready))
        .route("/_/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(correlation.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(correlation)),
        )
        .layer(cors)
        .with_state(state)
}
