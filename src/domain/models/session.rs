//! Parking session entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gate state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    In,
    Out,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::In => "IN",
            SessionStatus::Out => "OUT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(SessionStatus::In),
            "OUT" => Some(SessionStatus::Out),
            _ => None,
        }
    }
}

/// Settlement state of a session's fare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Vehicle still inside, nothing owed yet
    Pending,
    Paid,
    /// Exit granted but the wallet could not cover the fare
    Unpaid,
    /// Plate not linked to any registered user
    NoUser,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::NoUser => "NO_USER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "PAID" => Some(PaymentStatus::Paid),
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "NO_USER" => Some(PaymentStatus::NoUser),
            _ => None,
        }
    }
}

/// One physical parking event.
///
/// Invariant: at most one session with status IN exists per plate number,
/// system-wide. Enforced by the storage layer, not by read-then-write.
/// Closed sessions are immutable history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSession {
    pub id: String,
    pub plate_number: String,
    pub lot_id: String,
    pub slot_number: i32,
    pub user_id: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub fare: i64,
    pub payment_status: PaymentStatus,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to open a session; the rest is derived
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: String,
    pub plate_number: String,
    pub lot_id: String,
    pub slot_number: i32,
    pub user_id: Option<String>,
    pub entry_time: DateTime<Utc>,
}

/// Canonical plate form: trimmed, uppercased, inner whitespace removed.
pub fn normalize_plate(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("  ka01 ab 1234 "), "KA01AB1234");
        assert_eq!(normalize_plate("MH12de1433"), "MH12DE1433");
        assert_eq!(normalize_plate(""), "");
    }

    #[test]
    fn test_payment_status_round_trip() {
        for s in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Unpaid,
            PaymentStatus::NoUser,
        ] {
            assert_eq!(PaymentStatus::from_str(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_session_status_round_trip() {
        assert_eq!(SessionStatus::from_str("IN"), Some(SessionStatus::In));
        assert_eq!(SessionStatus::from_str("OUT"), Some(SessionStatus::Out));
        assert_eq!(SessionStatus::from_str("in"), None);
    }
}
