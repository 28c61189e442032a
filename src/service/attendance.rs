use super::{
    day_of,
    lifecycle::{LifecycleState, ensure_can_check_in, ensure_can_check_out},
    roster::roster_for,
};
use crate::{
    error::AppError,
    model::attendance::{AttendanceRecord, Coordinates, NewAttendance},
    store::AttendanceStore,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

/// Who is checking in: the employee id and display name of the session.
#[derive(Debug, Clone)]
pub struct Attendee {
    pub employee_id: String,
    pub name: String,
}

/// What the employee dashboard renders for one day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayView {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub state: LifecycleState,
    pub record: Option<AttendanceRecord>,
    pub can_check_in: bool,
    pub can_check_out: bool,
}

impl TodayView {
    fn new(date: NaiveDate, record: Option<AttendanceRecord>) -> Self {
        let state = LifecycleState::of(record.as_ref());
        TodayView {
            date,
            state,
            record,
            can_check_in: state.can_check_in(),
            can_check_out: state.can_check_out(),
        }
    }
}

pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    pub async fn today(&self, employee_id: &str, date: NaiveDate) -> Result<TodayView, AppError> {
        let record = self.store.find_for_day(employee_id, date).await?;
        debug!(employee_id, %date, found = record.is_some(), "Loaded attendance for day");
        Ok(TodayView::new(date, record))
    }

    /// NONE -> CHECKED_IN. Creates the day's record with the check-in fields set.
    pub async fn check_in(
        &self,
        attendee: &Attendee,
        fix: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<TodayView, AppError> {
        let date = day_of(now);
        let existing = self.store.find_for_day(&attendee.employee_id, date).await?;

        if let Err(e) = ensure_can_check_in(existing.as_ref()) {
            info!(employee_id = %attendee.employee_id, %date, "Check-in rejected: {e}");
            return Err(e);
        }

        let new = NewAttendance {
            employee_id: attendee.employee_id.clone(),
            employee_name: attendee.name.clone(),
            date,
            check_in_time: now,
            check_in: fix,
        };

        let id = match existing {
            // a record without check-in fields holds the day's slot; fill it in
            Some(blank) => {
                let record = new.into_record(blank.id);
                self.store.overwrite(&record).await?;
                record.id
            }
            None => self.store.append(new).await?,
        };

        info!(employee_id = %attendee.employee_id, record_id = %id, %date, "Checked in");
        self.today(&attendee.employee_id, date).await
    }

    /// CHECKED_IN -> CHECKED_OUT. Adds the check-out fields to the day's record.
    pub async fn check_out(
        &self,
        attendee: &Attendee,
        fix: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<TodayView, AppError> {
        let date = day_of(now);
        let existing = self.store.find_for_day(&attendee.employee_id, date).await?;

        let record = match ensure_can_check_out(existing.as_ref()) {
            Ok(record) => record.clone().with_check_out(now, fix),
            Err(e) => {
                info!(employee_id = %attendee.employee_id, %date, "Check-out rejected: {e}");
                return Err(e);
            }
        };

        self.store.complete(&record).await?;

        info!(employee_id = %attendee.employee_id, record_id = %record.id, %date, "Checked out");
        self.today(&attendee.employee_id, date).await
    }

    pub async fn roster(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = self.store.list_by_date(date).await?;
        Ok(roster_for(records, date))
    }
}
