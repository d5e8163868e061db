use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError};

/// Detects slot collisions for a doctor around a requested instant.
///
/// The check is a symmetric window: any appointment for the same doctor
/// whose instant lies strictly within `buffer_minutes` of the requested
/// instant blocks the booking, unless its status has released the slot
/// (cancelled / no-show). Appointments spaced exactly one buffer apart do
/// not collide.
pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
    buffer_minutes: i64,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>, buffer_minutes: i64) -> Self {
        Self {
            supabase,
            buffer_minutes,
        }
    }

    /// The open interval around `instant` inside which another appointment
    /// would collide.
    pub fn slot_window(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let buffer = Duration::minutes(self.buffer_minutes);
        (instant - buffer, instant + buffer)
    }

    /// Bucket key persisted with each appointment; a store-level uniqueness
    /// constraint on it makes the check-then-act sequence safe under
    /// concurrency.
    pub fn slot_key(&self, doctor_id: Uuid, instant: DateTime<Utc>) -> String {
        let bucket = instant.timestamp() / (self.buffer_minutes * 60);
        format!("{}:{}", doctor_id, bucket)
    }

    /// Return the first colliding appointment, if any.
    pub async fn find_conflict(
        &self,
        doctor_id: Uuid,
        instant: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let (window_start, window_end) = self.slot_window(instant);

        debug!(
            "Checking conflicts for doctor {} between {} and {}",
            doctor_id, window_start, window_end
        );

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_time=gt.{}&appointment_time=lt.{}&status=not.in.(cancelled,no_show)&order=appointment_time.asc",
            doctor_id,
            urlencoding::encode(&window_start.to_rfc3339()),
            urlencoding::encode(&window_end.to_rfc3339()),
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })?;

        // The status filter runs in the store; re-check here in case a row
        // arrived with an unexpected shape.
        let conflict = appointments.into_iter().find(|a| a.status.blocks_slot());

        if let Some(ref existing) = conflict {
            warn!(
                "Conflict for doctor {}: appointment {} at {}",
                doctor_id, existing.appointment_number, existing.appointment_time
            );
        }

        Ok(conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_config::AppConfig;

    fn service() -> ConflictDetectionService {
        let config = AppConfig {
            supabase_url: "http://localhost".to_string(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            enforce_availability_windows: false,
        };
        ConflictDetectionService::new(Arc::new(SupabaseClient::new(&config)), 30)
    }

    #[test]
    fn window_is_symmetric_around_instant() {
        let svc = service();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let (start, end) = svc.slot_window(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn slot_keys_share_a_bucket_inside_the_buffer() {
        let svc = service();
        let doctor = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let within = Utc.with_ymd_and_hms(2025, 6, 1, 10, 20, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();

        assert_eq!(svc.slot_key(doctor, at), svc.slot_key(doctor, within));
        assert_ne!(svc.slot_key(doctor, at), svc.slot_key(doctor, later));
    }

    #[test]
    fn slot_keys_differ_per_doctor() {
        let svc = service();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert_ne!(
            svc.slot_key(Uuid::new_v4(), at),
            svc.slot_key(Uuid::new_v4(), at)
        );
    }
}
