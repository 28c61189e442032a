use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Hrd,
}

/// Screen a freshly authenticated session is routed to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Home {
    Dashboard,
    Roster,
}

impl Role {
    /// Profiles without a recognised role are treated as employees.
    pub fn from_db(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Role::Employee)
    }

    pub fn home(self) -> Home {
        match self {
            Role::Employee => Home::Dashboard,
            Role::Hrd => Home::Roster,
        }
    }
}
