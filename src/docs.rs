use crate::api::attendance::AttendanceActionResponse;
use crate::api::roster::{RosterDatesResponse, RosterResponse};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, Coordinates};
use crate::model::role::{Home, Role};
use crate::model::user::UserProfile;
use crate::models::{LoginReqDto, LoginResponse, SessionResponse, TokenPair};
use crate::service::attendance::TodayView;
use crate::service::lifecycle::LifecycleState;
use crate::service::location::LocationFix;
use crate::service::roster::RosterEntry;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Absensi API",
        version = "1.0.0",
        description = r#"
## GPS Attendance

Backend of the attendance app: employees check in and check out with the coordinates
their device just acquired, HR staff review the attendance roster of a day.

### 🔹 Key Features
- **Session**
  - Email/password sign-in, token refresh, sign-out, role-based home screen
- **Attendance**
  - One check-in and one check-out per employee per day, each with GPS coordinates
- **Roster**
  - All records of a day, latest check-in first, with completion badge

### 🔐 Security
Every `/api` endpoint requires a **JWT Bearer** access token.
The roster is restricted to the **hrd** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::session,

        crate::api::attendance::today,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::roster::roster,
        crate::api::roster::roster_dates
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            TokenPair,
            SessionResponse,
            UserProfile,
            Role,
            Home,
            Coordinates,
            LocationFix,
            AttendanceRecord,
            AttendanceStatus,
            LifecycleState,
            TodayView,
            AttendanceActionResponse,
            RosterEntry,
            RosterResponse,
            RosterDatesResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-in and session APIs"),
        (name = "Attendance", description = "Check-in / check-out APIs"),
        (name = "Roster", description = "HR attendance roster APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
