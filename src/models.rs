use crate::model::{
    role::{Home, Role},
    user::UserProfile,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginReqDto {
    #[validate(email)]
    #[schema(example = "karyawan1@example.com", format = "email")]
    pub email: String,
    #[schema(example = "karyawan123")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: UserProfile,
    pub home: Home,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub profile: UserProfile,
    pub home: Home,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    /// email
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl Claims {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            email: self.sub.clone(),
            name: self.name.clone(),
            role: self.role,
            employee_id: self.employee_id.clone(),
        }
    }
}
