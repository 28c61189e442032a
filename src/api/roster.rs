use crate::{
    auth::auth::AuthUser,
    error::AppError,
    service::{
        attendance::AttendanceService,
        day_of,
        roster::{RosterEntry, picker_dates},
    },
};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Calendar day, `YYYY-MM-DD`; today when omitted
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct RosterResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub entries: Vec<RosterEntry>,
    /// true renders the "no data" state
    pub empty: bool,
}

#[derive(Serialize, ToSchema)]
pub struct RosterDatesResponse {
    #[schema(value_type = Vec<String>)]
    pub dates: Vec<NaiveDate>,
}

/// Attendance roster of one day (HR only)
#[utoipa::path(
    get,
    path = "/api/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "Records of the day, latest check-in first", body = RosterResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roster"
)]
pub async fn roster(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<RosterQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hrd()?;

    let date = query.date.unwrap_or_else(|| day_of(Utc::now()));
    let entries: Vec<RosterEntry> = service
        .roster(date)
        .await?
        .into_iter()
        .map(RosterEntry::from)
        .collect();

    Ok(HttpResponse::Ok().json(RosterResponse {
        date,
        empty: entries.is_empty(),
        entries,
    }))
}

/// Days offered by the roster date picker (HR only)
#[utoipa::path(
    get,
    path = "/api/roster/dates",
    responses(
        (status = 200, description = "Last seven days, today first", body = RosterDatesResponse),
        (status = 403, description = "HR only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roster"
)]
pub async fn roster_dates(auth: AuthUser) -> Result<HttpResponse, AppError> {
    auth.require_hrd()?;

    Ok(HttpResponse::Ok().json(RosterDatesResponse {
        dates: picker_dates(day_of(Utc::now())),
    }))
}
