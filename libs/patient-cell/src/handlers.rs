use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AddMedicalHistoryRequest, CreatePatientRequest, PatientError, UpdatePatientRequest,
};
use crate::services::PatientService;

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::AlreadyExists => {
            AppError::Conflict("Patient profile already exists for this account".to_string())
        }
        PatientError::Forbidden => {
            AppError::Forbidden("Not authorized to access this patient profile".to_string())
        }
        PatientError::ValidationError(msg) => AppError::BadRequest(msg),
        PatientError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn parse_user_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid identity in token".to_string()))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_patient() {
        return Err(AppError::Forbidden(
            "Only patient accounts can create a patient profile".to_string(),
        ));
    }

    let user_id = parse_user_id(&user)?;
    let service = PatientService::new(&config);

    let patient = service
        .create_patient(user_id, request, auth.token())
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Patient profile created",
        "data": patient
    })))
}

#[axum::debug_handler]
pub async fn get_own_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;
    let service = PatientService::new(&config);

    let patient = service
        .find_by_user(user_id, auth.token())
        .await
        .map_err(map_patient_error)?
        .ok_or_else(|| AppError::NotFound("Patient profile not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": patient
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .get_patient(patient_id, auth.token())
        .await
        .map_err(map_patient_error)?;

    // Only the owning identity may read the profile
    if patient.user_id.to_string() != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to view this patient profile".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": patient
    })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let existing = service
        .get_patient(patient_id, auth.token())
        .await
        .map_err(map_patient_error)?;

    if existing.user_id.to_string() != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to update this patient profile".to_string(),
        ));
    }

    let patient = service
        .update_patient(patient_id, request, auth.token())
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Patient profile updated",
        "data": patient
    })))
}

#[axum::debug_handler]
pub async fn add_medical_history(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<AddMedicalHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    if request.condition.trim().is_empty() {
        return Err(AppError::BadRequest("condition is required".to_string()));
    }

    let service = PatientService::new(&config);

    let existing = service
        .get_patient(patient_id, auth.token())
        .await
        .map_err(map_patient_error)?;

    if existing.user_id.to_string() != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to update this patient profile".to_string(),
        ));
    }

    let patient = service
        .add_medical_history(patient_id, request, auth.token())
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Medical history entry added",
        "data": patient
    })))
}
