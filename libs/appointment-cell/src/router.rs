use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{id}", get(handlers::get_appointment))
        .route("/{id}/status", patch(handlers::update_status))
        .route("/{id}/cancel", post(handlers::cancel_appointment))
        .route("/{id}/prescription", patch(handlers::amend_prescription))
        .route(
            "/patients/{patient_id}",
            get(handlers::list_patient_appointments),
        )
        .route(
            "/doctors/{doctor_id}",
            get(handlers::list_doctor_appointments),
        )
        .route(
            "/doctors/{doctor_id}/notifications",
            get(handlers::doctor_notifications),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
