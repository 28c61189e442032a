use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    service::{
        attendance::{AttendanceService, TodayView},
        day_of,
        location::LocationFix,
    },
};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct AttendanceActionResponse {
    #[schema(example = "Check in berhasil dicatat")]
    pub message: String,
    pub today: TodayView,
}

/// Today's attendance for the signed-in employee
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Lifecycle state and today's record", body = TodayView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let attendee = auth.attendee()?;
    let view = service
        .today(&attendee.employee_id, day_of(Utc::now()))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = LocationFix,
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceActionResponse),
        (status = 400, description = "Location missing, invalid or stale", body = Object, example = json!({
            "error": "location_unavailable",
            "message": "Lokasi belum didapatkan. Silakan tunggu sebentar."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "already_checked_in",
            "message": "Anda sudah melakukan check in hari ini"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_in", skip_all, fields(user_id = %auth.user_id))]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    config: web::Data<Config>,
    fix: web::Json<LocationFix>,
) -> Result<HttpResponse, AppError> {
    let attendee = auth.attendee()?;
    let now = Utc::now();
    let coordinates = fix.validate(now, config.location_max_age_secs)?;

    let today = service.check_in(&attendee, coordinates, now).await?;

    Ok(HttpResponse::Ok().json(AttendanceActionResponse {
        message: "Check in berhasil dicatat".to_string(),
        today,
    }))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = LocationFix,
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceActionResponse),
        (status = 400, description = "Location missing, invalid or stale"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "No check-in found for today", body = Object, example = json!({
            "error": "not_checked_in",
            "message": "Anda belum melakukan check in hari ini"
        })),
        (status = 409, description = "Already checked out today", body = Object, example = json!({
            "error": "already_checked_out",
            "message": "Anda sudah melakukan check out hari ini"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_out", skip_all, fields(user_id = %auth.user_id))]
pub async fn check_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    config: web::Data<Config>,
    fix: web::Json<LocationFix>,
) -> Result<HttpResponse, AppError> {
    let attendee = auth.attendee()?;
    let now = Utc::now();
    let coordinates = fix.validate(now, config.location_max_age_secs)?;

    let today = service.check_out(&attendee, coordinates, now).await?;

    Ok(HttpResponse::Ok().json(AttendanceActionResponse {
        message: "Check out berhasil dicatat".to_string(),
        today,
    }))
}
