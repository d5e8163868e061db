use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_models::error::FieldError;
use shared_models::pagination::PaginationMeta;
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Human-readable sequential ID (e.g. APT000123), minted once at booking.
    pub appointment_number: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Combined date+time instant of the appointment.
    pub appointment_time: DateTime<Utc>,
    pub duration_minutes: i32,
    /// `{doctor_id}:{bucket}`; carries a store-level uniqueness constraint
    /// so two racing bookings for the same slot cannot both commit.
    pub slot_key: String,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
    pub reason_for_visit: String,
    pub symptoms: Vec<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub fee: FeeBreakdown,
    pub cancellation: Option<CancellationInfo>,
    /// Back-reference to the appointment this one replaced, if rescheduled.
    pub rescheduled_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal states admit no further transition in the documented
    /// workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed
                | AppointmentStatus::Cancelled
                | AppointmentStatus::NoShow
        )
    }

    /// Whether an appointment in this status still occupies its slot for
    /// conflict purposes.
    pub fn blocks_slot(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Consultation,
    FollowUp,
    Emergency,
    Checkup,
}

impl Default for AppointmentType {
    fn default() -> Self {
        AppointmentType::Consultation
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::Checkup => write!(f, "checkup"),
        }
    }
}

/// Fee breakdown persisted with the appointment. `total_amount` is always
/// `consultation_fee + additional_charges` and is re-derived on every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeBreakdown {
    pub consultation_fee: f64,
    pub additional_charges: f64,
    pub total_amount: f64,
}

impl FeeBreakdown {
    pub fn new(consultation_fee: f64, additional_charges: f64) -> Self {
        Self {
            consultation_fee,
            additional_charges,
            total_amount: consultation_fee + additional_charges,
        }
    }

    /// Re-derive the total from the parts.
    pub fn recompute(&self) -> Self {
        Self::new(self.consultation_fee, self.additional_charges)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationInfo {
    pub cancelled_by: CancelledBy,
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Doctor,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Booking request as it arrives on the wire. `date` and `time` stay as
/// strings so malformed values surface as field-level validation errors
/// rather than body-parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason_for_visit: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub appointment_type: Option<AppointmentType>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmendPrescriptionRequest {
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientListingFilters {
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListingFilters {
    pub status: Option<AppointmentStatus>,
    /// Single calendar day (UTC) to restrict the listing to.
    pub date: Option<chrono::NaiveDate>,
}

/// Stored record denormalized with the party display fields for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: PartySummary,
    pub doctor: PartySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartySummary {
    pub id: Uuid,
    pub number: String,
    pub name: String,
    pub email: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentPage {
    pub appointments: Vec<Appointment>,
    pub pagination: PaginationMeta,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient profile not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor is not available at this time")]
    DoctorNotAvailable,

    #[error("Requested time is outside the doctor's availability")]
    OutsideAvailability,

    #[error("Not authorized to access this appointment")]
    NotOwner,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ==============================================================================
// SCHEDULING POLICY
// ==============================================================================

/// Named configuration for the scheduling engine; replaces scattered
/// literals for the buffer, fee default and pagination bounds.
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    /// Minimum spacing between a doctor's non-cancelled appointments.
    pub slot_buffer_minutes: i64,
    /// Fee applied when the doctor has no consultation fee set.
    pub default_consultation_fee: f64,
    pub default_duration_minutes: i32,
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub min_reason_length: usize,
    pub max_reason_length: usize,
    /// Cap on the doctor-notifications listing.
    pub notification_limit: i64,
    /// Check bookings against the doctor's declared weekly windows in
    /// addition to the buffer.
    pub enforce_availability_windows: bool,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            slot_buffer_minutes: 30,
            default_consultation_fee: 100.0,
            default_duration_minutes: 30,
            min_duration_minutes: 15,
            max_duration_minutes: 180,
            min_reason_length: 5,
            max_reason_length: 500,
            notification_limit: 10,
            enforce_availability_windows: false,
        }
    }
}
