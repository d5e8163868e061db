use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Back-reference to the owning identity.
    pub user_id: Uuid,
    /// Human-readable sequential ID (e.g. DOC000045), minted once.
    pub doctor_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub qualification: String,
    pub years_experience: Option<i32>,
    pub consultation_fee: Option<f64>,
    /// Informational weekly windows; enforced at booking only when the
    /// availability policy toggle is on.
    pub availability: Vec<AvailabilityWindow>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// True when `instant` falls inside one of the declared weekly windows.
    pub fn is_within_availability(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.weekday().num_days_from_sunday() as i32;
        let time = instant.time();

        self.availability
            .iter()
            .any(|w| w.day_of_week == day && w.start_time <= time && time < w.end_time)
    }
}

/// One weekly availability window. `day_of_week`: 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityWindow {
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityWindow {
    pub fn is_valid(&self) -> bool {
        (0..=6).contains(&self.day_of_week) && self.start_time < self.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub qualification: String,
    pub years_experience: Option<i32>,
    pub consultation_fee: Option<f64>,
    pub availability: Option<Vec<AvailabilityWindow>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
    pub years_experience: Option<i32>,
    pub consultation_fee: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceAvailabilityRequest {
    pub availability: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    pub verified_only: Option<bool>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor profile already exists for this account")]
    AlreadyExists,

    #[error("Unauthorized access to doctor data")]
    Forbidden,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doctor_with_windows(windows: Vec<AvailabilityWindow>) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            doctor_number: "DOC000001".to_string(),
            first_name: "Niamh".to_string(),
            last_name: "Kelly".to_string(),
            email: "niamh@example.com".to_string(),
            phone: "+353870000000".to_string(),
            specialization: "Cardiology".to_string(),
            qualification: "MD".to_string(),
            years_experience: Some(12),
            consultation_fee: Some(150.0),
            availability: windows,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn window_validation() {
        let ok = AvailabilityWindow {
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        };
        assert!(ok.is_valid());

        let inverted = AvailabilityWindow {
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        assert!(!inverted.is_valid());

        let bad_day = AvailabilityWindow {
            day_of_week: 7,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        };
        assert!(!bad_day.is_valid());
    }

    #[test]
    fn availability_containment() {
        let doctor = doctor_with_windows(vec![AvailabilityWindow {
            day_of_week: 1, // Monday
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }]);

        // 2025-06-02 is a Monday
        let inside = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        assert!(doctor.is_within_availability(inside));

        let at_end = Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap();
        assert!(!doctor.is_within_availability(at_end));

        let tuesday = Utc.with_ymd_and_hms(2025, 6, 3, 10, 0, 0).unwrap();
        assert!(!doctor.is_within_availability(tuesday));
    }
}
