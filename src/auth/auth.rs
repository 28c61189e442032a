use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::{
    error::AppError,
    model::role::Role,
    models::{Claims, TokenType},
    service::attendance::Attendee,
};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            name: claims.name,
            role: claims.role,
            employee_id: claims.employee_id.filter(|e| !e.is_empty()),
        }
    }
}

/// Pulls the bearer token out of the Authorization header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // the auth middleware has usually done this already
    if let Some(user) = req.extensions().get::<AuthUser>() {
        return Ok(user.clone());
    }

    let token = bearer_token(req).ok_or(AppError::InvalidToken)?;
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::internal("Config missing"))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| AppError::InvalidToken)?;
    if claims.token_type != TokenType::Access {
        return Err(AppError::InvalidToken);
    }

    Ok(AuthUser::from(claims))
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}

impl AuthUser {
    pub fn require_hrd(&self) -> Result<(), AppError> {
        if self.role == Role::Hrd {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// The identity attendance is recorded under.
    pub fn attendee(&self) -> Result<Attendee, AppError> {
        let employee_id = self
            .employee_id
            .clone()
            .ok_or(AppError::NoEmployeeProfile)?;

        Ok(Attendee {
            employee_id,
            name: self.name.clone(),
        })
    }
}
