use crate::{
    error::AppError,
    model::user::UserProfile,
    models::{Claims, TokenType},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn issue(
    profile: &UserProfile,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), AppError> {
    let claims = Claims {
        user_id: profile.id.clone(),
        sub: profile.email.clone(),
        name: profile.name.clone(),
        role: profile.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id: profile.employee_id.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::internal)?;

    Ok((token, claims))
}

pub fn generate_access_token(
    profile: &UserProfile,
    secret: &str,
    ttl: usize,
) -> Result<String, AppError> {
    issue(profile, TokenType::Access, secret, ttl).map(|(token, _)| token)
}

pub fn generate_refresh_token(
    profile: &UserProfile,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), AppError> {
    issue(profile, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
