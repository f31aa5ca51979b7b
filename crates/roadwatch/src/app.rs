use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        health::health,
        reports::{
            bulk_status, create_report, delete_report, get_report, list_reports, update_report,
        },
        roles::list_roles,
        users::{create_user, delete_user, get_user, list_users, rank_list, update_user},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/health", get(health))
        // Report routes
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/bulk-status", post(bulk_status))
        .route(
            "/reports/{id}",
            get(get_report).put(update_report).delete(delete_report),
        )
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route("/users/ranklist", get(rank_list))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Role routes
        .route("/roles", get(list_roles))
        .layer(cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
