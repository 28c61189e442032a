use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => {
            debug!(path = %req.path(), "Missing or malformed Authorization header");
            let resp = AppError::InvalidToken.error_response();
            return Ok(req.into_response(resp));
        }
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Access => c,
        Ok(_) => {
            debug!(path = %req.path(), "Refresh token used as access token");
            return Ok(req.into_response(AppError::InvalidToken.error_response()));
        }
        Err(e) => {
            debug!(path = %req.path(), error = %e, "Invalid or expired token");
            return Ok(req.into_response(AppError::InvalidToken.error_response()));
        }
    };

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}
