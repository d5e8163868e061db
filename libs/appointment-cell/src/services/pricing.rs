use doctor_cell::models::Doctor;
use tracing::debug;

use crate::models::{FeeBreakdown, SchedulingPolicy};

/// Computes the fee breakdown for new bookings and keeps the total invariant
/// (`total_amount == consultation_fee + additional_charges`) on every save.
pub struct PricingService;

impl PricingService {
    pub fn new() -> Self {
        Self
    }

    /// Fee for a fresh booking: the doctor's consultation fee, or the policy
    /// default when the doctor has none set. No additional charges at
    /// booking time.
    pub fn fee_for_booking(&self, doctor: &Doctor, policy: &SchedulingPolicy) -> FeeBreakdown {
        let consultation_fee = doctor
            .consultation_fee
            .unwrap_or(policy.default_consultation_fee);

        debug!(
            "Consultation fee for doctor {}: {}",
            doctor.doctor_number, consultation_fee
        );

        FeeBreakdown::new(consultation_fee, 0.0)
    }

    /// Applied before every re-persist so a drifted total never reaches the
    /// store.
    pub fn rederive(&self, fee: &FeeBreakdown) -> FeeBreakdown {
        fee.recompute()
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}
