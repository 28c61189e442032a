use crate::{
    auth::{
        auth::{AuthUser, bearer_token},
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::AppError,
    model::user::UserProfile,
    models::{LoginReqDto, LoginResponse, SessionResponse, TokenPair, TokenType},
    store::UserDirectory,
    utils::profile_cache,
};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{TimeZone, Utc};
use tracing::{debug, error, info, instrument};
use validator::Validate;

/// Issues an access + refresh token pair and records the refresh token.
async fn issue_tokens(
    profile: &UserProfile,
    users: &dyn UserDirectory,
    config: &Config,
) -> Result<TokenPair, AppError> {
    let access_token =
        generate_access_token(profile, &config.jwt_secret, config.access_token_ttl)?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(profile, &config.jwt_secret, config.refresh_token_ttl)?;

    debug!(user_id = %profile.id, jti = %refresh_claims.jti, "Storing refresh token");

    let expires_at = Utc
        .timestamp_opt(refresh_claims.exp as i64, 0)
        .single()
        .ok_or_else(|| AppError::internal("refresh token expiry out of range"))?;
    users
        .store_refresh_token(&profile.id, &refresh_claims.jti, expires_at)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Sign in with email + password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed email", body = Object, example = json!({
            "error": "invalid_email",
            "message": "Format email tidak valid."
        })),
        (status = 401, description = "Unknown user or wrong password", body = Object, example = json!({
            "error": "wrong_password",
            "message": "Password salah."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(users, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    users: web::Data<dyn UserDirectory>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.validate().is_err() {
        info!("Validation failed: malformed email");
        return Err(AppError::InvalidEmail);
    }
    if user.password.is_empty() {
        info!("Validation failed: empty password");
        return Err(AppError::WrongPassword);
    }

    // 2️⃣ Fetch user
    let credentials = match users.find_credentials(user.email.trim()).await? {
        Some(c) => {
            debug!(user_id = %c.profile.id, "User found");
            c
        }
        None => {
            info!("Invalid credentials: user not found");
            return Err(AppError::UnknownUser);
        }
    };

    // 3️⃣ Verify password
    if !verify_password(&user.password, &credentials.password_hash) {
        info!("Invalid credentials: password mismatch");
        return Err(AppError::WrongPassword);
    }

    // 4️⃣ Tokens
    let profile = credentials.profile;
    let tokens = issue_tokens(&profile, users.get_ref(), &config).await?;

    // 5️⃣ Session profile cache (non-fatal)
    profile_cache::store(&profile).await;

    info!(user_id = %profile.id, role = %profile.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        home: profile.role.home(),
        profile,
    }))
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token invalid, expired or already used")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_refresh", skip_all)]
pub async fn refresh_token(
    req: HttpRequest,
    users: web::Data<dyn UserDirectory>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req).ok_or(AppError::InvalidToken)?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Refresh token rejected");
        AppError::InvalidToken
    })?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::InvalidToken);
    }

    // 🔥 revoke old refresh token; a second use of the same token lands here
    if !users.consume_refresh_token(&claims.jti).await? {
        info!(user_id = %claims.user_id, jti = %claims.jti, "Refresh token reused or revoked");
        return Err(AppError::InvalidToken);
    }

    // 🔄 new pair for the same session; the role does not change mid-session
    let tokens = issue_tokens(&claims.profile(), users.get_ref(), &config).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Sign out
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Signed out (also when the token was unknown)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_logout", skip_all)]
pub async fn logout(
    req: HttpRequest,
    users: web::Data<dyn UserDirectory>,
    config: web::Data<Config>,
) -> HttpResponse {
    // 1️⃣ extract Authorization header
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    // 2️⃣ verify JWT
    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // 3️⃣ drop the cached profile whichever token was presented
    profile_cache::remove(&claims.user_id).await;

    // 4️⃣ revoke refresh token (idempotent)
    if claims.token_type == TokenType::Refresh {
        if let Err(e) = users.revoke_refresh_token(&claims.jti).await {
            error!(error = %e, "Failed to revoke refresh token");
        }
    }

    info!(user_id = %claims.user_id, "Logged out");

    // 5️⃣ success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}

/// Current session and the screen it is routed to
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Session profile", body = SessionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile record missing")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn session(
    auth: AuthUser,
    users: web::Data<dyn UserDirectory>,
) -> Result<HttpResponse, AppError> {
    let profile = match profile_cache::load(&auth.user_id).await {
        Some(p) => p,
        None => {
            let p = users
                .profile(&auth.user_id)
                .await?
                .ok_or(AppError::ProfileNotFound)?;
            profile_cache::store(&p).await;
            p
        }
    };

    Ok(HttpResponse::Ok().json(SessionResponse {
        home: profile.role.home(),
        profile,
    }))
}
