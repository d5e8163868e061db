use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::sequence::{next_display_id, SequenceKind};
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorSearchQuery, ReplaceAvailabilityRequest,
    UpdateDoctorRequest,
};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_doctor(
        &self,
        user_id: Uuid,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for identity {}", user_id);

        if self.find_by_user(user_id, auth_token).await?.is_some() {
            return Err(DoctorError::AlreadyExists);
        }

        let availability = request.availability.unwrap_or_default();
        if let Some(bad) = availability.iter().find(|w| !w.is_valid()) {
            return Err(DoctorError::ValidationError(format!(
                "Invalid availability window on day {}: start must precede end and day must be 0-6",
                bad.day_of_week
            )));
        }

        let doctor_number = next_display_id(&self.supabase, SequenceKind::Doctor, auth_token)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        let doctor_data = json!({
            "user_id": user_id,
            "doctor_number": doctor_number,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "specialization": request.specialization,
            "qualification": request.qualification,
            "years_experience": request.years_experience,
            "consultation_fee": request.consultation_fee,
            "availability": availability,
            "is_verified": false,
            "created_at": now,
            "updated_at": now,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(headers),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::DatabaseError("Empty insert response".to_string()))?;

        let doctor: Doctor = serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))?;

        debug!("Doctor profile {} created", doctor.doctor_number);
        Ok(doctor)
    }

    pub async fn get_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e))),
            None => Ok(None),
        }
    }

    pub async fn search_doctors(
        &self,
        query: DoctorSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let mut query_parts = vec![];

        if let Some(specialization) = query.specialization {
            query_parts.push(format!(
                "specialization=ilike.%{}%",
                urlencoding::encode(&specialization)
            ));
        }
        if query.verified_only.unwrap_or(false) {
            query_parts.push("is_verified=eq.true".to_string());
        }

        let limit = query.limit.unwrap_or(50).clamp(1, 100);
        let offset = query.offset.unwrap_or(0).max(0);
        query_parts.push(format!("limit={}", limit));
        query_parts.push(format!("offset={}", offset));
        query_parts.push("order=last_name.asc".to_string());

        let path = format!("/rest/v1/doctors?{}", query_parts.join("&"));

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile {}", doctor_id);

        let mut update_data = serde_json::Map::new();

        if let Some(first_name) = request.first_name {
            update_data.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = request.last_name {
            update_data.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(specialization) = request.specialization {
            update_data.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(qualification) = request.qualification {
            update_data.insert("qualification".to_string(), json!(qualification));
        }
        if let Some(years_experience) = request.years_experience {
            update_data.insert("years_experience".to_string(), json!(years_experience));
        }
        if let Some(consultation_fee) = request.consultation_fee {
            update_data.insert("consultation_fee".to_string(), json!(consultation_fee));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch_doctor(doctor_id, Value::Object(update_data), auth_token)
            .await
    }

    /// Replace the declared weekly windows wholesale.
    pub async fn replace_availability(
        &self,
        doctor_id: Uuid,
        request: ReplaceAvailabilityRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        if let Some(bad) = request.availability.iter().find(|w| !w.is_valid()) {
            return Err(DoctorError::ValidationError(format!(
                "Invalid availability window on day {}: start must precede end and day must be 0-6",
                bad.day_of_week
            )));
        }

        let update = json!({
            "availability": request.availability,
            "updated_at": Utc::now().to_rfc3339(),
        });

        self.patch_doctor(doctor_id, update, auth_token).await
    }

    async fn patch_doctor(
        &self,
        doctor_id: Uuid,
        body: Value,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }
}
