use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = json!(-6.2))]
    pub latitude: f64,
    #[schema(example = json!(106.8))]
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// One check-in event for one employee on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "9b1c6c1e-2f7e-4a53-8e1d-0c6f4c8e9a10",
        "employee_id": "EMP001",
        "employee_name": "Budi Santoso",
        "date": "2024-01-01",
        "check_in_time": "2024-01-01T08:00:00Z",
        "check_out_time": null,
        "check_in_latitude": -6.2,
        "check_in_longitude": 106.8,
        "check_out_latitude": null,
        "check_out_longitude": null,
        "created_at": "2024-01-01T08:00:00Z",
        "updated_at": null
    })
)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_in_latitude: Option<f64>,
    pub check_in_longitude: Option<f64>,
    pub check_out_latitude: Option<f64>,
    pub check_out_longitude: Option<f64>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Partial,
    Complete,
}

impl AttendanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Partial => "Belum Check Out",
            AttendanceStatus::Complete => "Lengkap",
        }
    }
}

impl AttendanceRecord {
    pub fn status(&self) -> AttendanceStatus {
        if self.check_in_time.is_some() && self.check_out_time.is_some() {
            AttendanceStatus::Complete
        } else {
            AttendanceStatus::Partial
        }
    }

    pub fn check_in_location(&self) -> Option<Coordinates> {
        pair(self.check_in_latitude, self.check_in_longitude)
    }

    pub fn check_out_location(&self) -> Option<Coordinates> {
        pair(self.check_out_latitude, self.check_out_longitude)
    }

    /// Adds the check-out fields; check-in fields are left as they are.
    pub fn with_check_out(mut self, at: DateTime<Utc>, fix: Coordinates) -> Self {
        self.check_out_time = Some(at);
        self.check_out_latitude = Some(fix.latitude);
        self.check_out_longitude = Some(fix.longitude);
        self.updated_at = Some(at);
        self
    }
}

fn pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    Some(Coordinates {
        latitude: latitude?,
        longitude: longitude?,
    })
}

/// Payload of a check-in; the store assigns the record key.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub check_in: Coordinates,
}

impl NewAttendance {
    pub fn into_record(self, id: String) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            date: self.date,
            check_in_time: Some(self.check_in_time),
            check_out_time: None,
            check_in_latitude: Some(self.check_in.latitude),
            check_in_longitude: Some(self.check_in.longitude),
            check_out_latitude: None,
            check_out_longitude: None,
            created_at: self.check_in_time,
            updated_at: None,
        }
    }
}
