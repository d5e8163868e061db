use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::sequence::{next_display_id, SequenceKind};
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AddMedicalHistoryRequest, CreatePatientRequest, Patient, PatientError, UpdatePatientRequest,
};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create the patient profile for an identity. The PAT number is minted
    /// exactly once here; the row never receives a new one.
    pub async fn create_patient(
        &self,
        user_id: Uuid,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient profile for identity {}", user_id);

        if self.find_by_user(user_id, auth_token).await?.is_some() {
            return Err(PatientError::AlreadyExists);
        }

        let patient_number = next_display_id(&self.supabase, SequenceKind::Patient, auth_token)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        let patient_data = json!({
            "user_id": user_id,
            "patient_number": patient_number,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "date_of_birth": request.date_of_birth.format("%Y-%m-%d").to_string(),
            "gender": request.gender,
            "address": request.address,
            "emergency_contact": request.emergency_contact,
            "medical_history": [],
            "allergies": request.allergies.unwrap_or_default(),
            "blood_group": request.blood_group,
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
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(headers),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::DatabaseError("Empty insert response".to_string()))?;

        let patient: Patient = serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;

        debug!("Patient profile {} created", patient.patient_number);
        Ok(patient)
    }

    pub async fn get_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    /// Resolve the patient profile belonging to an identity, if any.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?user_id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e))),
            None => Ok(None),
        }
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile {}", patient_id);

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
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(emergency_contact) = request.emergency_contact {
            update_data.insert("emergency_contact".to_string(), json!(emergency_contact));
        }
        if let Some(allergies) = request.allergies {
            update_data.insert("allergies".to_string(), json!(allergies));
        }
        if let Some(blood_group) = request.blood_group {
            update_data.insert("blood_group".to_string(), json!(blood_group));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch_patient(patient_id, Value::Object(update_data), auth_token)
            .await
    }

    /// Append one entry to the medical-history log. Existing entries are
    /// never rewritten.
    pub async fn add_medical_history(
        &self,
        patient_id: Uuid,
        request: AddMedicalHistoryRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Appending medical history for patient {}", patient_id);

        let patient = self.get_patient(patient_id, auth_token).await?;

        let mut history = patient.medical_history;
        history.push(crate::models::MedicalHistoryEntry {
            condition: request.condition,
            diagnosed_date: request.diagnosed_date,
            status: request.status.unwrap_or_else(|| "active".to_string()),
            notes: request.notes,
        });

        let update = json!({
            "medical_history": history,
            "updated_at": Utc::now().to_rfc3339(),
        });

        self.patch_patient(patient_id, update, auth_token).await
    }

    async fn patch_patient(
        &self,
        patient_id: Uuid,
        body: Value,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }
}
