use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::pagination::PageParams;

use crate::models::{
    AmendPrescriptionRequest, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    CancelAppointmentRequest, DoctorListingFilters, PatientListingFilters, UpdateStatusRequest,
};
use crate::services::BookingService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::PatientNotFound => {
            AppError::NotFound("Patient profile not found".to_string())
        }
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::DoctorNotAvailable => {
            AppError::Conflict("Doctor is not available at this time".to_string())
        }
        AppointmentError::OutsideAvailability => {
            AppError::Conflict("Requested time is outside the doctor's availability".to_string())
        }
        AppointmentError::NotOwner => {
            AppError::Forbidden("Not authorized to access this appointment".to_string())
        }
        AppointmentError::Validation(details) => AppError::validation("Validation failed", details),
        AppointmentError::InvalidStatus(msg) => AppError::BadRequest(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn parse_user_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid identity in token".to_string()))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_patient() {
        return Err(AppError::Forbidden(
            "Only patient accounts can book appointments".to_string(),
        ));
    }

    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let detail = service
        .book(user_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked",
        "data": detail
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let detail = service
        .get_for_party(appointment_id, user_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": detail
    })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let appointment = service
        .update_status(appointment_id, user_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment status updated",
        "data": appointment
    })))
}

/// Convenience path for cancellation; same semantics as a status update to
/// `cancelled`.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let update = UpdateStatusRequest {
        status: AppointmentStatus::Cancelled,
        notes: None,
        cancellation_reason: request.reason,
    };

    let appointment = service
        .update_status(appointment_id, user_id, update, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn amend_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AmendPrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let appointment = service
        .amend_prescription(appointment_id, user_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Prescription updated",
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn list_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Query(filters): Query<PatientListingFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let page = service
        .list_for_patient(patient_id, user_id, filters, params, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": page.appointments,
        "pagination": page.pagination
    })))
}

#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Query(filters): Query<DoctorListingFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let page = service
        .list_for_doctor(doctor_id, user_id, filters, params, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": page.appointments,
        "pagination": page.pagination
    })))
}

#[axum::debug_handler]
pub async fn doctor_notifications(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = BookingService::new(&config);

    let appointments = service
        .doctor_notifications(doctor_id, user_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": appointments
    })))
}
