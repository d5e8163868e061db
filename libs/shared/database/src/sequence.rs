use anyhow::Result;
use serde_json::json;

use crate::supabase::SupabaseClient;

/// Human-readable sequential identifiers, one counter per record kind.
/// The increment happens inside the store (`next_sequence` RPC), so a value
/// is handed out exactly once even under concurrent requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceKind {
    Patient,
    Doctor,
    Appointment,
}

impl SequenceKind {
    pub fn counter_name(&self) -> &'static str {
        match self {
            SequenceKind::Patient => "patients",
            SequenceKind::Doctor => "doctors",
            SequenceKind::Appointment => "appointments",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Patient => "PAT",
            SequenceKind::Doctor => "DOC",
            SequenceKind::Appointment => "APT",
        }
    }

    pub fn format(&self, value: i64) -> String {
        format!("{}{:06}", self.prefix(), value)
    }
}

/// Mint the next display ID for the given kind, e.g. `APT000123`.
pub async fn next_display_id(
    supabase: &SupabaseClient,
    kind: SequenceKind,
    auth_token: &str,
) -> Result<String> {
    let value: i64 = supabase
        .rpc(
            "next_sequence",
            Some(auth_token),
            json!({ "seq_name": kind.counter_name() }),
        )
        .await?;

    Ok(kind.format(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_ids_are_zero_padded() {
        assert_eq!(SequenceKind::Patient.format(123), "PAT000123");
        assert_eq!(SequenceKind::Doctor.format(45), "DOC000045");
        assert_eq!(SequenceKind::Appointment.format(1), "APT000001");
    }

    #[test]
    fn wide_values_keep_their_digits() {
        assert_eq!(SequenceKind::Appointment.format(1_234_567), "APT1234567");
    }
}
