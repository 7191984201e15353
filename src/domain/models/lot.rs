//! Parking lot entity and fare calculation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pricing configuration of a lot.
///
/// `rate_per_hour` is expressed in the smallest currency unit per hour;
/// fares are computed in the same unit so no decimal arithmetic is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub rate_per_hour: i64,
    pub free_minutes: i64,
}

/// Result of a fare calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FareBreakdown {
    /// Total parked time, partial minutes rounded up
    pub duration_minutes: i64,
    /// Minutes beyond the free window
    pub billable_minutes: i64,
    /// Amount owed in smallest currency unit
    pub fare: i64,
}

impl Pricing {
    /// Compute duration and fare for a stay.
    ///
    /// Billing policy: a partial minute counts as a full minute, the first
    /// `free_minutes` are not billed, and the fare itself is rounded up to
    /// the next currency unit. Pure function, safe to recompute.
    pub fn compute_fare(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> FareBreakdown {
        let elapsed_seconds = (exit - entry).num_seconds().max(0);
        let duration_minutes = (elapsed_seconds + 59) / 60;
        let billable_minutes = (duration_minutes - self.free_minutes).max(0);
        // ceil(billable / 60 * rate) in integer arithmetic
        let fare = (billable_minutes * self.rate_per_hour + 59) / 60;

        FareBreakdown {
            duration_minutes,
            billable_minutes,
            fare,
        }
    }
}

/// Parking lot configuration entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    /// Short unique code, e.g. "LOT-A"
    pub code: String,
    pub total_slots: i32,
    pub pricing: Pricing,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pricing() -> Pricing {
        Pricing {
            rate_per_hour: 60,
            free_minutes: 15,
        }
    }

    #[test]
    fn test_within_free_window_is_free() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry + Duration::minutes(10));
        assert_eq!(fare.duration_minutes, 10);
        assert_eq!(fare.billable_minutes, 0);
        assert_eq!(fare.fare, 0);
    }

    #[test]
    fn test_ninety_minutes_bills_seventy_five() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry + Duration::minutes(90));
        assert_eq!(fare.duration_minutes, 90);
        assert_eq!(fare.billable_minutes, 75);
        // ceil(75 / 60 * 60) = 75
        assert_eq!(fare.fare, 75);
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry + Duration::seconds(61));
        assert_eq!(fare.duration_minutes, 2);
    }

    #[test]
    fn test_exact_free_window_boundary() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry + Duration::minutes(15));
        assert_eq!(fare.duration_minutes, 15);
        assert_eq!(fare.fare, 0);

        let fare = pricing().compute_fare(entry, entry + Duration::minutes(16));
        assert_eq!(fare.billable_minutes, 1);
        // ceil(1 / 60 * 60) = 1
        assert_eq!(fare.fare, 1);
    }

    #[test]
    fn test_zero_duration() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry);
        assert_eq!(fare.duration_minutes, 0);
        assert_eq!(fare.fare, 0);
    }

    #[test]
    fn test_exit_before_entry_clamps_to_zero() {
        let entry = Utc::now();
        let fare = pricing().compute_fare(entry, entry - Duration::minutes(5));
        assert_eq!(fare.duration_minutes, 0);
        assert_eq!(fare.fare, 0);
    }

    #[test]
    fn test_fare_rounds_up_to_currency_unit() {
        let p = Pricing {
            rate_per_hour: 50,
            free_minutes: 0,
        };
        let entry = Utc::now();
        // 7 minutes at 50/hour = 5.83.., billed as 6
        let fare = p.compute_fare(entry, entry + Duration::minutes(7));
        assert_eq!(fare.fare, 6);
    }
}
