use super::{AttendanceStore, StoreResult, UserDirectory};
use crate::{
    error::AppError,
    model::{
        attendance::{AttendanceRecord, NewAttendance},
        user::{Credentials, NewUser, UserProfile},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::{collections::HashMap, sync::RwLock};
use uuid::Uuid;

struct StoredToken {
    expires_at: DateTime<Utc>,
    revoked: bool,
}

#[derive(Default)]
struct Inner {
    // insertion order doubles as "first match wins" order
    attendances: Vec<AttendanceRecord>,
    users: HashMap<String, Credentials>,
    refresh_tokens: HashMap<String, StoredToken>,
}

/// Process-local store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| AppError::store("memory store poisoned"))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| AppError::store("memory store poisoned"))
    }

    #[cfg(test)]
    pub fn attendance_count(&self) -> usize {
        self.inner.read().map(|i| i.attendances.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_for_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .read()?
            .attendances
            .iter()
            .find(|r| r.employee_id == employee_id && r.date == date)
            .cloned())
    }

    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<AttendanceRecord>> {
        Ok(self
            .read()?
            .attendances
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn append(&self, new: NewAttendance) -> StoreResult<String> {
        let mut inner = self.write()?;

        let taken = inner
            .attendances
            .iter()
            .any(|r| r.employee_id == new.employee_id && r.date == new.date);
        if taken {
            return Err(AppError::AlreadyCheckedIn);
        }

        let id = Uuid::new_v4().to_string();
        inner.attendances.push(new.into_record(id.clone()));
        Ok(id)
    }

    async fn overwrite(&self, record: &AttendanceRecord) -> StoreResult<()> {
        let mut inner = self.write()?;
        let slot = inner
            .attendances
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(AppError::RecordNotFound)?;
        *slot = record.clone();
        Ok(())
    }

    async fn complete(&self, record: &AttendanceRecord) -> StoreResult<()> {
        let mut inner = self.write()?;
        let stored = inner
            .attendances
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(AppError::RecordNotFound)?;

        if stored.check_in_time.is_none() {
            return Err(AppError::NotCheckedIn);
        }
        if stored.check_out_time.is_some() {
            return Err(AppError::AlreadyCheckedOut);
        }

        stored.check_out_time = record.check_out_time;
        stored.check_out_latitude = record.check_out_latitude;
        stored.check_out_longitude = record.check_out_longitude;
        stored.updated_at = record.updated_at;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|c| c.profile.email == email)
            .cloned())
    }

    async fn profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .read()?
            .users
            .get(user_id)
            .map(|c| c.profile.clone()))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile> {
        let mut inner = self.write()?;

        if inner.users.values().any(|c| c.profile.email == user.email) {
            return Err(AppError::store(format!(
                "duplicate user email {}",
                user.email
            )));
        }

        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            name: user.name,
            role: user.role,
            employee_id: user.employee_id,
        };
        inner.users.insert(
            profile.id.clone(),
            Credentials {
                profile: profile.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(profile)
    }

    async fn store_refresh_token(
        &self,
        _user_id: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.write()?.refresh_tokens.insert(
            jti.to_string(),
            StoredToken {
                expires_at,
                revoked: false,
            },
        );
        Ok(())
    }

    async fn consume_refresh_token(&self, jti: &str) -> StoreResult<bool> {
        let mut inner = self.write()?;
        match inner.refresh_tokens.get_mut(jti) {
            Some(token) if !token.revoked && token.expires_at > Utc::now() => {
                token.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<()> {
        if let Some(token) = self.write()?.refresh_tokens.get_mut(jti) {
            token.revoked = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Coordinates;
    use chrono::TimeZone;

    fn check_in(employee_id: &str, day: u32, hour: u32) -> NewAttendance {
        NewAttendance {
            employee_id: employee_id.to_string(),
            employee_name: format!("Name of {employee_id}"),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            check_in_time: Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(),
            check_in: Coordinates {
                latitude: -6.2,
                longitude: 106.8,
            },
        }
    }

    #[actix_web::test]
    async fn append_rejects_second_record_for_same_day() {
        let store = MemoryStore::new();
        store.append(check_in("EMP001", 1, 8)).await.unwrap();

        let err = store.append(check_in("EMP001", 1, 9)).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyCheckedIn));
        assert_eq!(store.attendance_count(), 1);

        // other day, other employee are fine
        store.append(check_in("EMP001", 2, 8)).await.unwrap();
        store.append(check_in("EMP002", 1, 8)).await.unwrap();
        assert_eq!(store.attendance_count(), 3);
    }

    #[actix_web::test]
    async fn complete_only_closes_open_records() {
        let store = MemoryStore::new();
        let id = store.append(check_in("EMP001", 1, 8)).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let open = store.find_for_day("EMP001", date).await.unwrap().unwrap();
        assert_eq!(open.id, id);

        let closed = open.with_check_out(
            Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap(),
            Coordinates {
                latitude: -6.3,
                longitude: 106.9,
            },
        );
        store.complete(&closed).await.unwrap();

        let err = store.complete(&closed).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyCheckedOut));

        let stored = store.find_for_day("EMP001", date).await.unwrap().unwrap();
        assert_eq!(stored, closed);
    }

    #[actix_web::test]
    async fn refresh_tokens_are_single_use() {
        let store = MemoryStore::new();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store.store_refresh_token("u1", "jti-1", expires).await.unwrap();

        assert!(store.consume_refresh_token("jti-1").await.unwrap());
        assert!(!store.consume_refresh_token("jti-1").await.unwrap());
        assert!(!store.consume_refresh_token("unknown").await.unwrap());
    }

    #[actix_web::test]
    async fn revoked_refresh_token_cannot_be_consumed() {
        let store = MemoryStore::new();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store.store_refresh_token("u1", "jti-2", expires).await.unwrap();

        store.revoke_refresh_token("jti-2").await.unwrap();
        store.revoke_refresh_token("jti-2").await.unwrap();
        assert!(!store.consume_refresh_token("jti-2").await.unwrap());
    }
}
