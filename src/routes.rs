use crate::{
    api::{attendance, roster},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-route limiter config
fn limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst size")
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = limiter(config.rate_login_per_min);
    let refresh_limiter = limiter(config.rate_refresh_per_min);
    let protected_limiter = limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(web::resource("/session").route(web::get().to(handlers::session)))
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::check_in))
                            .route(web::put().to(attendance::check_out)),
                    )
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .service(
                web::scope("/roster")
                    // /roster?date=YYYY-MM-DD
                    .service(web::resource("").route(web::get().to(roster::roster)))
                    // /roster/dates
                    .service(web::resource("/dates").route(web::get().to(roster::roster_dates))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + refresh_token (old one revoked)

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{jwt::generate_access_token, password::hash_password},
        model::{role::Role, user::{NewUser, UserProfile}},
        service::attendance::AttendanceService,
        store::{MemoryStore, UserDirectory},
    };
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::{net::SocketAddr, sync::Arc};

    struct Fixture {
        config: Config,
        store: Arc<MemoryStore>,
        budi: UserProfile,
        hrd: UserProfile,
        guest: UserProfile,
    }

    async fn user(
        store: &MemoryStore,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
        employee_id: Option<&str>,
    ) -> UserProfile {
        store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                name: name.to_string(),
                role,
                employee_id: employee_id.map(String::from),
            })
            .await
            .unwrap()
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let budi = user(&store, "karyawan1@example.com", "karyawan123", "Budi Santoso", Role::Employee, Some("EMP001")).await;
        let hrd = user(&store, "hrd@example.com", "hrd123", "Admin HRD", Role::Hrd, Some("HRD001")).await;
        let guest = user(&store, "tamu@example.com", "tamu123", "Tamu", Role::Employee, None).await;
        Fixture {
            config: Config::for_tests(),
            store,
            budi,
            hrd,
            guest,
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn bearer(config: &Config, profile: &UserProfile) -> (&'static str, String) {
        let token = generate_access_token(profile, &config.jwt_secret, 900).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    fn fix_now() -> Value {
        json!({ "latitude": -6.2, "longitude": 106.8, "acquired_at": Utc::now() })
    }

    macro_rules! app {
        ($f:expr) => {{
            let users: Arc<dyn UserDirectory> = $f.store.clone();
            test::init_service(
                App::new()
                    .app_data(Data::new($f.config.clone()))
                    .app_data(Data::new(AttendanceService::new($f.store.clone())))
                    .app_data(Data::from(users))
                    .configure(|cfg| configure(cfg, &$f.config)),
            )
            .await
        }};
    }

    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.peer_addr(peer()).to_request()).await;
            let status = resp.status();
            let body = test::read_body(resp).await;
            let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }};
    }

    #[actix_web::test]
    async fn login_routes_session_by_role() {
        let f = fixture().await;
        let app = app!(f);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": "karyawan1@example.com", "password": "karyawan123" }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["home"], "dashboard");
        assert_eq!(body["profile"]["employee_id"], "EMP001");
        assert!(body["access_token"].is_string());
        assert!(body["refresh_token"].is_string());

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": "hrd@example.com", "password": "hrd123" }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["home"], "roster");

        let token = body["access_token"].as_str().unwrap().to_string();
        let (status, body) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/session")
                .insert_header(("Authorization", format!("Bearer {token}")))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["name"], "Admin HRD");
        assert_eq!(body["home"], "roster");
    }

    #[actix_web::test]
    async fn login_failures_are_told_apart() {
        let f = fixture().await;
        let app = app!(f);

        let cases = [
            ("not-an-email", "x", StatusCode::BAD_REQUEST, "invalid_email"),
            ("nobody@example.com", "x", StatusCode::UNAUTHORIZED, "unknown_user"),
            ("karyawan1@example.com", "wrong", StatusCode::UNAUTHORIZED, "wrong_password"),
        ];
        for (email, password, expected_status, code) in cases {
            let (status, body) = send!(
                app,
                test::TestRequest::post()
                    .uri("/auth/login")
                    .set_json(json!({ "email": email, "password": password }))
            );
            assert_eq!(status, expected_status, "{email}");
            assert_eq!(body["error"], code, "{email}");
            assert!(body["message"].is_string());
        }
    }

    #[actix_web::test]
    async fn protected_routes_need_an_access_token() {
        let f = fixture().await;
        let app = app!(f);

        let (status, body) = send!(app, test::TestRequest::get().uri("/api/attendance/today"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");

        let (status, _) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/attendance/today")
                .insert_header(("Authorization", "Bearer garbage"))
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn employee_day_goes_none_checked_in_checked_out() {
        let f = fixture().await;
        let app = app!(f);
        let auth = bearer(&f.config, &f.budi);

        let (status, body) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/attendance/today")
                .insert_header(auth.clone())
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "none");
        assert_eq!(body["can_check_in"], true);
        assert_eq!(body["can_check_out"], false);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Check in berhasil dicatat");
        assert_eq!(body["today"]["state"], "checked_in");
        let check_in_time = body["today"]["record"]["check_in_time"].clone();
        assert!(check_in_time.is_string());
        assert!(body["today"]["record"]["check_out_time"].is_null());

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "already_checked_in");
        assert_eq!(f.store.attendance_count(), 1);

        let (status, body) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Check out berhasil dicatat");
        assert_eq!(body["today"]["state"], "checked_out");
        assert_eq!(body["today"]["record"]["check_in_time"], check_in_time);
        assert!(body["today"]["record"]["check_out_time"].is_string());

        let (status, body) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/attendance")
                .insert_header(auth)
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "already_checked_out");
    }

    #[actix_web::test]
    async fn check_out_without_check_in_is_rejected() {
        let f = fixture().await;
        let app = app!(f);

        let (status, body) = send!(
            app,
            test::TestRequest::put()
                .uri("/api/attendance")
                .insert_header(bearer(&f.config, &f.budi))
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_checked_in");
    }

    #[actix_web::test]
    async fn check_in_needs_a_fresh_location() {
        let f = fixture().await;
        let app = app!(f);
        let auth = bearer(&f.config, &f.budi);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth.clone())
                .set_json(json!({}))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "location_unavailable");

        let stale = Utc::now() - Duration::minutes(10);
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(auth)
                .set_json(json!({ "latitude": -6.2, "longitude": 106.8, "acquired_at": stale }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "stale_location");

        assert_eq!(f.store.attendance_count(), 0);
    }

    #[actix_web::test]
    async fn attendance_needs_an_employee_id() {
        let f = fixture().await;
        let app = app!(f);

        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(bearer(&f.config, &f.guest))
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "no_employee_profile");
    }

    #[actix_web::test]
    async fn roster_is_hr_only_and_shows_badges() {
        let f = fixture().await;
        let app = app!(f);

        let (status, body) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/roster")
                .insert_header(bearer(&f.config, &f.budi))
        );
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let hr = bearer(&f.config, &f.hrd);
        let (status, body) = send!(app, test::TestRequest::get().uri("/api/roster").insert_header(hr.clone()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["empty"], true);
        assert_eq!(body["entries"], json!([]));

        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/attendance")
                .insert_header(bearer(&f.config, &f.budi))
                .set_json(fix_now())
        );
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send!(app, test::TestRequest::get().uri("/api/roster").insert_header(hr.clone()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["empty"], false);
        let entry = &body["entries"][0];
        assert_eq!(entry["employee_id"], "EMP001");
        assert_eq!(entry["employee_name"], "Budi Santoso");
        assert_eq!(entry["status"], "partial");
        assert_eq!(entry["status_label"], "Belum Check Out");
        assert_eq!(entry["check_in_location"], "-6.200000, 106.800000");
        assert!(entry["check_out_location"].is_null());

        let (status, body) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/roster?date=2000-01-01")
                .insert_header(hr.clone())
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2000-01-01");
        assert_eq!(body["empty"], true);

        let (status, body) = send!(app, test::TestRequest::get().uri("/api/roster/dates").insert_header(hr));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dates"].as_array().map(Vec::len), Some(7));
    }

    #[actix_web::test]
    async fn refresh_tokens_rotate_and_die_on_logout() {
        let f = fixture().await;
        let app = app!(f);

        let (_, login) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": "karyawan1@example.com", "password": "karyawan123" }))
        );
        let refresh = login["refresh_token"].as_str().unwrap().to_string();
        let access = login["access_token"].as_str().unwrap().to_string();

        // access tokens cannot refresh
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/refresh")
                .insert_header(("Authorization", format!("Bearer {access}")))
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, rotated) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/refresh")
                .insert_header(("Authorization", format!("Bearer {refresh}")))
        );
        assert_eq!(status, StatusCode::OK);
        let next = rotated["refresh_token"].as_str().unwrap().to_string();

        // the old one was spent by the rotation
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/refresh")
                .insert_header(("Authorization", format!("Bearer {refresh}")))
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/logout")
                .insert_header(("Authorization", format!("Bearer {next}")))
                .peer_addr(peer())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/auth/refresh")
                .insert_header(("Authorization", format!("Bearer {next}")))
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_without_token_is_a_no_op() {
        let f = fixture().await;
        let app = app!(f);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/logout")
                .peer_addr(peer())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
