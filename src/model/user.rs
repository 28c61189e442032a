use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authenticated identity plus the profile stored next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "3f0b9a0e-6f57-4a43-9d3c-1f1f0e7c2b11",
        "email": "karyawan1@example.com",
        "name": "Budi Santoso",
        "role": "employee",
        "employee_id": "EMP001"
    })
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub employee_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub employee_id: Option<String>,
}

impl UserRow {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            name: self.name,
            role: Role::from_db(&self.role),
            // an empty string in the profile means "no employee record"
            employee_id: self.employee_id.filter(|e| !e.trim().is_empty()),
        }
    }
}

/// Profile plus the stored password hash, only ever used by login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub profile: UserProfile,
    pub password_hash: String,
}

impl From<UserRow> for Credentials {
    fn from(row: UserRow) -> Self {
        let password_hash = row.password_hash.clone();
        Credentials {
            profile: row.into_profile(),
            password_hash,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub employee_id: Option<String>,
}
