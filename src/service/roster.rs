use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Days the HR date picker offers, today included.
pub const PICKER_DAYS: i64 = 7;

/// Records of `date`, latest check-in first. Records without a check-in go last.
pub fn roster_for(records: Vec<AttendanceRecord>, date: NaiveDate) -> Vec<AttendanceRecord> {
    let mut day: Vec<_> = records.into_iter().filter(|r| r.date == date).collect();
    // None < Some(_), so reversing the natural order puts missing check-ins last
    day.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
    day
}

/// `today`, yesterday, ... back `PICKER_DAYS - 1` days.
pub fn picker_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..PICKER_DAYS).map(|i| today - Duration::days(i)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub status: AttendanceStatus,
    #[schema(example = "Belum Check Out")]
    pub status_label: String,
    #[schema(example = "-6.200000, 106.800000")]
    pub check_in_location: Option<String>,
    pub check_out_location: Option<String>,
}

impl From<AttendanceRecord> for RosterEntry {
    fn from(record: AttendanceRecord) -> Self {
        let status = record.status();
        RosterEntry {
            status,
            status_label: status.label().to_string(),
            check_in_location: record.check_in_location().map(|c| c.to_string()),
            check_out_location: record.check_out_location().map(|c| c.to_string()),
            record,
        }
    }
}
