pub mod attendance;
pub mod lifecycle;
pub mod location;
pub mod roster;

use chrono::{DateTime, NaiveDate, Utc};

/// Calendar day an instant belongs to. Days are UTC days, the same day an ISO-8601
/// timestamp's date part names.
pub fn day_of(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}
