//! Per employee, per day: NONE -> CHECKED_IN -> CHECKED_OUT.

use crate::{error::AppError, model::attendance::AttendanceRecord};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    None,
    CheckedIn,
    CheckedOut,
}

impl LifecycleState {
    pub fn of(today: Option<&AttendanceRecord>) -> Self {
        match today {
            Some(r) if r.check_in_time.is_some() && r.check_out_time.is_some() => {
                LifecycleState::CheckedOut
            }
            Some(r) if r.check_in_time.is_some() => LifecycleState::CheckedIn,
            _ => LifecycleState::None,
        }
    }

    pub fn can_check_in(self) -> bool {
        self == LifecycleState::None
    }

    pub fn can_check_out(self) -> bool {
        self == LifecycleState::CheckedIn
    }
}

pub fn ensure_can_check_in(today: Option<&AttendanceRecord>) -> Result<(), AppError> {
    match LifecycleState::of(today) {
        LifecycleState::None => Ok(()),
        LifecycleState::CheckedIn | LifecycleState::CheckedOut => Err(AppError::AlreadyCheckedIn),
    }
}

/// Returns the record the check-out has to be written to.
pub fn ensure_can_check_out(
    today: Option<&AttendanceRecord>,
) -> Result<&AttendanceRecord, AppError> {
    match (LifecycleState::of(today), today) {
        (LifecycleState::CheckedIn, Some(record)) => Ok(record),
        (LifecycleState::CheckedOut, _) => Err(AppError::AlreadyCheckedOut),
        _ => Err(AppError::NotCheckedIn),
    }
}
