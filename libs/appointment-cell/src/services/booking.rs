use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use doctor_cell::services::DoctorService;
use patient_cell::models::Patient;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::sequence::{next_display_id, SequenceKind};
use shared_database::supabase::{ApiError, SupabaseClient};
use shared_models::error::FieldError;
use shared_models::pagination::{Page, PageParams};

use crate::models::{
    AmendPrescriptionRequest, Appointment, AppointmentDetail, AppointmentError, AppointmentPage,
    AppointmentStatus, BookAppointmentRequest, CancellationInfo, CancelledBy, DoctorListingFilters,
    FeeBreakdown, PartySummary, PatientListingFilters, SchedulingPolicy, UpdateStatusRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::pricing::PricingService;

/// Which side of the appointment the acting identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActingParty {
    Patient,
    Doctor,
}

/// A booking request after validation: parsed instant plus the resolved
/// optional fields.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub appointment_time: DateTime<Utc>,
    pub reason_for_visit: String,
    pub symptoms: Vec<String>,
    pub appointment_type: crate::models::AppointmentType,
    pub duration_minutes: i32,
}

/// The scheduling engine. Owns the booking pipeline (validate, resolve
/// parties, conflict check, mint number, persist) and the read/update paths
/// that hang off an existing appointment.
pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    conflict: ConflictDetectionService,
    lifecycle: AppointmentLifecycleService,
    pricing: PricingService,
    patients: PatientService,
    doctors: DoctorService,
    policy: SchedulingPolicy,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let policy = SchedulingPolicy {
            enforce_availability_windows: config.enforce_availability_windows,
            ..SchedulingPolicy::default()
        };
        Self::with_policy(config, policy)
    }

    pub fn with_policy(config: &AppConfig, policy: SchedulingPolicy) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            conflict: ConflictDetectionService::new(supabase.clone(), policy.slot_buffer_minutes),
            lifecycle: AppointmentLifecycleService::new(),
            pricing: PricingService::new(),
            patients: PatientService::new(config),
            doctors: DoctorService::new(config),
            policy,
            supabase,
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    // ==========================================================================
    // VALIDATION
    // ==========================================================================

    /// Field-level validation of the raw booking request. Collects every
    /// failure instead of stopping at the first one.
    pub fn validate_booking_request(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<ValidatedBooking, Vec<FieldError>> {
        let mut errors = Vec::new();

        let date = match request.date.as_deref() {
            None | Some("") => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new("date", "Date must be in YYYY-MM-DD format"));
                    None
                }
            },
        };

        let time_re = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
        let time = match request.time.as_deref() {
            None | Some("") => {
                errors.push(FieldError::new("time", "Time is required"));
                None
            }
            Some(raw) if !time_re.is_match(raw) => {
                errors.push(FieldError::new("time", "Time must be in 24-hour HH:MM format"));
                None
            }
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").ok(),
        };

        let appointment_time = match (date, time) {
            (Some(date), Some(time)) => {
                let instant = date.and_time(time).and_utc();
                if instant <= Utc::now() {
                    errors.push(FieldError::new("time", "Appointment must be in the future"));
                    None
                } else {
                    Some(instant)
                }
            }
            _ => None,
        };

        let reason = request
            .reason_for_visit
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        // Length bounds are in characters, not bytes
        let reason_chars = reason.chars().count();
        if reason_chars < self.policy.min_reason_length {
            errors.push(FieldError::new(
                "reason_for_visit",
                format!(
                    "Reason for visit must be at least {} characters",
                    self.policy.min_reason_length
                ),
            ));
        } else if reason_chars > self.policy.max_reason_length {
            errors.push(FieldError::new(
                "reason_for_visit",
                format!(
                    "Reason for visit must be at most {} characters",
                    self.policy.max_reason_length
                ),
            ));
        }

        let duration = request
            .duration_minutes
            .unwrap_or(self.policy.default_duration_minutes);
        if duration < self.policy.min_duration_minutes || duration > self.policy.max_duration_minutes
        {
            errors.push(FieldError::new(
                "duration_minutes",
                format!(
                    "Duration must be between {} and {} minutes",
                    self.policy.min_duration_minutes, self.policy.max_duration_minutes
                ),
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedBooking {
            // Both parts validated above when errors is empty.
            appointment_time: appointment_time.ok_or_else(Vec::new)?,
            reason_for_visit: reason.to_string(),
            symptoms: request.symptoms.clone().unwrap_or_default(),
            appointment_type: request.appointment_type.unwrap_or_default(),
            duration_minutes: duration,
        })
    }

    // ==========================================================================
    // BOOKING
    // ==========================================================================

    /// Book an appointment for the acting patient identity.
    pub async fn book(
        &self,
        user_id: Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<AppointmentDetail, AppointmentError> {
        let validated = self
            .validate_booking_request(&request)
            .map_err(AppointmentError::Validation)?;

        let patient = self
            .patients
            .find_by_user(user_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::PatientNotFound)?;

        let doctor = self
            .doctors
            .get_doctor(request.doctor_id, auth_token)
            .await
            .map_err(|e| match e {
                doctor_cell::models::DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        if self.policy.enforce_availability_windows
            && !doctor.availability.is_empty()
            && !doctor.is_within_availability(validated.appointment_time)
        {
            warn!(
                "Booking for doctor {} at {} is outside declared availability",
                doctor.doctor_number, validated.appointment_time
            );
            return Err(AppointmentError::OutsideAvailability);
        }

        if self
            .conflict
            .find_conflict(doctor.id, validated.appointment_time, auth_token)
            .await?
            .is_some()
        {
            return Err(AppointmentError::DoctorNotAvailable);
        }

        let appointment_number =
            next_display_id(self.supabase.as_ref(), SequenceKind::Appointment, auth_token)
                .await
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let fee = self.pricing.fee_for_booking(&doctor, &self.policy);
        let slot_key = self
            .conflict
            .slot_key(doctor.id, validated.appointment_time);

        let now = Utc::now().to_rfc3339();
        let appointment_data = json!({
            "appointment_number": appointment_number,
            "patient_id": patient.id,
            "doctor_id": doctor.id,
            "appointment_time": validated.appointment_time.to_rfc3339(),
            "duration_minutes": validated.duration_minutes,
            "slot_key": slot_key,
            "status": AppointmentStatus::Scheduled,
            "appointment_type": validated.appointment_type,
            "reason_for_visit": validated.reason_for_visit,
            "symptoms": validated.symptoms,
            "prescription": null,
            "notes": null,
            "consultation_fee": fee.consultation_fee,
            "additional_charges": fee.additional_charges,
            "total_amount": fee.total_amount,
            "cancellation": null,
            "rescheduled_from": null,
            "created_at": now,
            "updated_at": now,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        // The slot_key uniqueness constraint closes the window between the
        // conflict check above and this insert.
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.is_conflict() => {
                    warn!(
                        "Slot for doctor {} at {} was taken by a concurrent booking",
                        doctor.doctor_number, validated.appointment_time
                    );
                    AppointmentError::DoctorNotAvailable
                }
                _ => AppointmentError::DatabaseError(e.to_string()),
            })?;

        let appointment = parse_row(result)?;

        info!(
            "Booked appointment {} for patient {} with doctor {} at {}",
            appointment.appointment_number,
            patient.patient_number,
            doctor.doctor_number,
            appointment.appointment_time
        );

        Ok(detail(appointment, &patient, &doctor))
    }

    // ==========================================================================
    // READ PATHS
    // ==========================================================================

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => serde_json::from_value(row).map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
            }),
            None => Err(AppointmentError::NotFound),
        }
    }

    /// Fetch an appointment for the acting identity, denormalized with both
    /// party summaries. Only the appointment's own patient or doctor may
    /// read it.
    pub async fn get_for_party(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<AppointmentDetail, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.resolve_party(&appointment, user_id, auth_token).await?;

        let patient = self
            .patients
            .get_patient(appointment.patient_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        let doctor = self
            .doctors
            .get_doctor(appointment.doctor_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(detail(appointment, &patient, &doctor))
    }

    /// Identify which side of the appointment the identity is on, or reject.
    /// There is no administrative override on this path.
    async fn resolve_party(
        &self,
        appointment: &Appointment,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<ActingParty, AppointmentError> {
        if let Some(patient) = self
            .patients
            .find_by_user(user_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
        {
            if patient.id == appointment.patient_id {
                return Ok(ActingParty::Patient);
            }
        }

        if let Some(doctor) = self
            .doctors
            .find_by_user(user_id, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
        {
            if doctor.id == appointment.doctor_id {
                return Ok(ActingParty::Doctor);
            }
        }

        warn!(
            "Identity {} is not a party to appointment {}",
            user_id, appointment.appointment_number
        );
        Err(AppointmentError::NotOwner)
    }

    // ==========================================================================
    // STATUS AND AMENDMENTS
    // ==========================================================================

    /// Move an appointment to a new status. Either party may do this; the
    /// only rejected target is `scheduled`.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
        request: UpdateStatusRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        let party = self.resolve_party(&appointment, user_id, auth_token).await?;

        self.lifecycle.validate_target_status(request.status)?;

        debug!(
            "Appointment {} moving {} -> {}",
            appointment.appointment_number, appointment.status, request.status
        );

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(request.status));

        if let Some(notes) = request.notes {
            update.insert("notes".to_string(), json!(notes));
        }

        if request.status == AppointmentStatus::Cancelled {
            let cancellation = CancellationInfo {
                cancelled_by: match party {
                    ActingParty::Patient => CancelledBy::Patient,
                    ActingParty::Doctor => CancelledBy::Doctor,
                },
                reason: request.cancellation_reason,
                cancelled_at: Utc::now(),
            };
            update.insert("cancellation".to_string(), json!(cancellation));
        }

        self.persist_update(appointment_id, &appointment.fee, update, auth_token)
            .await
    }

    /// Attach or replace the prescription. Only the assigned doctor may do
    /// this.
    pub async fn amend_prescription(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
        request: AmendPrescriptionRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        let party = self.resolve_party(&appointment, user_id, auth_token).await?;

        if party != ActingParty::Doctor {
            return Err(AppointmentError::NotOwner);
        }

        let mut update = serde_json::Map::new();
        if let Some(prescription) = request.prescription {
            update.insert("prescription".to_string(), json!(prescription));
        }
        if let Some(notes) = request.notes {
            update.insert("notes".to_string(), json!(notes));
        }

        self.persist_update(appointment_id, &appointment.fee, update, auth_token)
            .await
    }

    /// PATCH the row, re-deriving the fee total on the way out so a drifted
    /// total never persists.
    async fn persist_update(
        &self,
        appointment_id: Uuid,
        fee: &FeeBreakdown,
        mut update: serde_json::Map<String, Value>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let fee = self.pricing.rederive(fee);
        update.insert("consultation_fee".to_string(), json!(fee.consultation_fee));
        update.insert(
            "additional_charges".to_string(),
            json!(fee.additional_charges),
        );
        update.insert("total_amount".to_string(), json!(fee.total_amount));
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update)),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        parse_row(result)
    }

    // ==========================================================================
    // LISTINGS
    // ==========================================================================

    /// Page through a patient's appointments, newest first. Only the patient
    /// themselves may list.
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        user_id: Uuid,
        filters: PatientListingFilters,
        params: PageParams,
        auth_token: &str,
    ) -> Result<AppointmentPage, AppointmentError> {
        let patient = self
            .patients
            .get_patient(patient_id, auth_token)
            .await
            .map_err(|e| match e {
                patient_cell::models::PatientError::NotFound => AppointmentError::PatientNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;
        if patient.user_id != user_id {
            return Err(AppointmentError::NotOwner);
        }

        let page = params.normalize();
        let mut query_parts = vec![format!("patient_id=eq.{}", patient_id)];
        if let Some(status) = filters.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = filters.from_date {
            query_parts.push(format!(
                "appointment_time=gte.{}",
                urlencoding::encode(&from.to_rfc3339())
            ));
        }
        if let Some(to) = filters.to_date {
            query_parts.push(format!(
                "appointment_time=lte.{}",
                urlencoding::encode(&to.to_rfc3339())
            ));
        }
        query_parts.push("order=appointment_time.desc".to_string());

        self.fetch_page(query_parts, page, auth_token).await
    }

    /// Page through a doctor's appointments, oldest first, optionally
    /// restricted to one UTC calendar day. Only the doctor themselves may
    /// list.
    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        user_id: Uuid,
        filters: DoctorListingFilters,
        params: PageParams,
        auth_token: &str,
    ) -> Result<AppointmentPage, AppointmentError> {
        let doctor = self.owned_doctor(doctor_id, user_id, auth_token).await?;

        let page = params.normalize();
        let mut query_parts = vec![format!("doctor_id=eq.{}", doctor.id)];
        if let Some(status) = filters.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(date) = filters.date {
            let day_start = date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
            let day_end = date
                .succ_opt()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| t.and_utc());
            if let (Some(start), Some(end)) = (day_start, day_end) {
                query_parts.push(format!(
                    "appointment_time=gte.{}",
                    urlencoding::encode(&start.to_rfc3339())
                ));
                query_parts.push(format!(
                    "appointment_time=lt.{}",
                    urlencoding::encode(&end.to_rfc3339())
                ));
            }
        }
        query_parts.push("order=appointment_time.asc".to_string());

        self.fetch_page(query_parts, page, auth_token).await
    }

    /// Upcoming scheduled appointments for a doctor's dashboard: status
    /// `scheduled`, from the start of today (UTC) onward, oldest first,
    /// capped by policy.
    pub async fn doctor_notifications(
        &self,
        doctor_id: Uuid,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let doctor = self.owned_doctor(doctor_id, user_id, auth_token).await?;

        let today = Utc::now().date_naive();
        let start_of_day = today
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or_else(Utc::now);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.scheduled&appointment_time=gte.{}&order=appointment_time.asc&limit={}",
            doctor.id,
            urlencoding::encode(&start_of_day.to_rfc3339()),
            self.policy.notification_limit,
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        parse_rows(result)
    }

    async fn owned_doctor(
        &self,
        doctor_id: Uuid,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Doctor, AppointmentError> {
        let doctor = self
            .doctors
            .get_doctor(doctor_id, auth_token)
            .await
            .map_err(|e| match e {
                doctor_cell::models::DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;
        if doctor.user_id != user_id {
            return Err(AppointmentError::NotOwner);
        }
        Ok(doctor)
    }

    async fn fetch_page(
        &self,
        mut query_parts: Vec<String>,
        page: Page,
        auth_token: &str,
    ) -> Result<AppointmentPage, AppointmentError> {
        query_parts.push(format!("limit={}", page.limit));
        query_parts.push(format!("offset={}", page.offset()));

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));

        let (result, total): (Vec<Value>, i64) = self
            .supabase
            .request_with_count(&path, Some(auth_token))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(AppointmentPage {
            appointments: parse_rows(result)?,
            pagination: page.meta(total),
        })
    }
}

fn parse_row(rows: Vec<Value>) -> Result<Appointment, AppointmentError> {
    let row = rows
        .into_iter()
        .next()
        .ok_or(AppointmentError::NotFound)?;
    serde_json::from_value(row)
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Appointment>, _>>()
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
}

fn detail(appointment: Appointment, patient: &Patient, doctor: &Doctor) -> AppointmentDetail {
    AppointmentDetail {
        appointment,
        patient: PartySummary {
            id: patient.id,
            number: patient.patient_number.clone(),
            name: patient.full_name(),
            email: patient.email.clone(),
            specialization: None,
        },
        doctor: PartySummary {
            id: doctor.id,
            number: doctor.doctor_number.clone(),
            name: doctor.full_name(),
            email: doctor.email.clone(),
            specialization: Some(doctor.specialization.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentType;
    use shared_utils::test_utils::TestConfig;

    fn service() -> BookingService {
        BookingService::new(&TestConfig::default().to_app_config())
    }

    fn request(date: &str, time: &str, reason: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: Uuid::new_v4(),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            reason_for_visit: Some(reason.to_string()),
            symptoms: None,
            appointment_type: None,
            duration_minutes: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let svc = service();
        let validated = svc
            .validate_booking_request(&request("2031-06-02", "10:30", "Persistent headaches"))
            .unwrap();
        assert_eq!(validated.duration_minutes, 30);
        assert_eq!(validated.appointment_type, AppointmentType::Consultation);
        assert_eq!(
            validated.appointment_time.to_rfc3339(),
            "2031-06-02T10:30:00+00:00"
        );
    }

    #[test]
    fn rejects_missing_date_and_time_together() {
        let svc = service();
        let mut req = request("", "", "Persistent headaches");
        req.date = None;
        req.time = None;

        let errors = svc.validate_booking_request(&req).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"time"));
    }

    #[test]
    fn rejects_malformed_date_and_time() {
        let svc = service();
        let errors = svc
            .validate_booking_request(&request("02-06-2031", "25:99", "Persistent headaches"))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_past_instants() {
        let svc = service();
        let errors = svc
            .validate_booking_request(&request("2020-01-01", "10:00", "Persistent headaches"))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "time");
    }

    #[test]
    fn rejects_short_and_long_reasons() {
        let svc = service();
        assert!(svc
            .validate_booking_request(&request("2031-06-02", "10:30", "hi"))
            .is_err());
        let long = "x".repeat(501);
        assert!(svc
            .validate_booking_request(&request("2031-06-02", "10:30", &long))
            .is_err());
    }

    #[test]
    fn reason_length_counts_characters_not_bytes() {
        let svc = service();
        // Four characters, five bytes
        assert!(svc
            .validate_booking_request(&request("2031-06-02", "10:30", "héll"))
            .is_err());
        // Five characters, six bytes
        assert!(svc
            .validate_booking_request(&request("2031-06-02", "10:30", "héllo"))
            .is_ok());
    }

    #[test]
    fn rejects_out_of_range_durations() {
        let svc = service();
        let mut req = request("2031-06-02", "10:30", "Persistent headaches");
        req.duration_minutes = Some(10);
        assert!(svc.validate_booking_request(&req).is_err());
        req.duration_minutes = Some(181);
        assert!(svc.validate_booking_request(&req).is_err());
        req.duration_minutes = Some(15);
        assert!(svc.validate_booking_request(&req).is_ok());
    }

    #[test]
    fn collects_every_failure_in_one_pass() {
        let svc = service();
        let mut req = request("not-a-date", "midnight", "no");
        req.duration_minutes = Some(5);
        let errors = svc.validate_booking_request(&req).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
