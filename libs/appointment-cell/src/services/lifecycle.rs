use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Guards the status-update path.
///
/// The documented workflow is scheduled -> confirmed -> in_progress ->
/// completed, with cancelled/no_show as terminal side exits, but the update
/// operation deliberately enforces only target-state membership: any owner
/// may move the record to any status except back to `scheduled`. The full
/// machine is kept here as `valid_transitions` for callers that want to
/// display or audit it.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// The only hard rule on the update path: `scheduled` is the creation
    /// state and cannot be re-entered.
    pub fn validate_target_status(
        &self,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating target status {}", new_status);

        if new_status == AppointmentStatus::Scheduled {
            warn!("Rejected attempt to reset an appointment to scheduled");
            return Err(AppointmentError::InvalidStatus(
                "Appointments cannot be reset to scheduled".to_string(),
            ));
        }

        Ok(())
    }

    /// The documented workflow, not enforced on the update path.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::InProgress => vec![AppointmentStatus::Completed],
            // Terminal states
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scheduled_is_never_a_valid_target() {
        let lifecycle = AppointmentLifecycleService::new();
        assert_matches!(
            lifecycle.validate_target_status(AppointmentStatus::Scheduled),
            Err(AppointmentError::InvalidStatus(_))
        );
    }

    #[test]
    fn every_other_status_is_accepted_as_target() {
        let lifecycle = AppointmentLifecycleService::new();
        for status in [
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(lifecycle.validate_target_status(status).is_ok());
        }
    }

    #[test]
    fn documented_machine_has_no_exit_from_terminal_states() {
        let lifecycle = AppointmentLifecycleService::new();
        for status in [
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(lifecycle.valid_transitions(status).is_empty());
        }
    }

    #[test]
    fn documented_machine_never_revisits_scheduled() {
        let lifecycle = AppointmentLifecycleService::new();
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(!lifecycle
                .valid_transitions(status)
                .contains(&AppointmentStatus::Scheduled));
        }
    }
}
