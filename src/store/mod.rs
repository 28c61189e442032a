//! Persistence seams: attendance records and the user directory behind it.

use crate::{
    error::AppError,
    model::{
        attendance::{AttendanceRecord, NewAttendance},
        user::{Credentials, NewUser, UserProfile},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Record for `employee_id` on `date`, if any. When duplicates exist the first one
    /// by creation time wins.
    async fn find_for_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<AttendanceRecord>>;

    /// Creates the record and returns the key the store assigned to it.
    /// Fails with `AlreadyCheckedIn` when the employee already has a record that day.
    async fn append(&self, new: NewAttendance) -> StoreResult<String>;

    /// Replaces the record stored under `record.id`.
    async fn overwrite(&self, record: &AttendanceRecord) -> StoreResult<()>;

    /// Writes the check-out fields of `record`, but only while the stored record is still
    /// open. Fails with `AlreadyCheckedOut` otherwise and `RecordNotFound` if it vanished.
    async fn complete(&self, record: &AttendanceRecord) -> StoreResult<()>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>>;

    async fn profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile>;

    async fn store_refresh_token(
        &self,
        user_id: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Revokes an active, unexpired refresh token. Returns false when there was none.
    async fn consume_refresh_token(&self, jti: &str) -> StoreResult<bool>;

    /// Idempotent.
    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<()>;
}
