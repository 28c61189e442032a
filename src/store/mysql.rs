use super::{AttendanceStore, StoreResult, UserDirectory};
use crate::{
    error::AppError,
    model::{
        attendance::{AttendanceRecord, NewAttendance},
        user::{Credentials, NewUser, UserProfile, UserRow},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlPool, mysql::MySqlDatabaseError};
use tracing::error;
use uuid::Uuid;

const RECORD_COLUMNS: &str = r#"
    id, employee_id, employee_name, date,
    check_in_time, check_out_time,
    check_in_latitude, check_in_longitude,
    check_out_latitude, check_out_longitude,
    created_at, updated_at
"#;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, employee_id";

/// MySQL error class for integrity constraint violations (duplicate key).
const DUPLICATE_KEY: &str = "23000";
/// ER_DBACCESS_DENIED_ERROR, ER_TABLEACCESS_DENIED_ERROR, ER_SPECIFIC_ACCESS_DENIED_ERROR
const ACCESS_DENIED: [u16; 3] = [1044, 1142, 1227];

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn is_duplicate(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(DUPLICATE_KEY))
}

fn write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let denied = db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|mysql_err| ACCESS_DENIED.contains(&mysql_err.number()));
        if denied {
            error!(error = %e, "Write rejected by database permissions");
            return AppError::WritePermissionDenied;
        }
    }
    AppError::from(e)
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_for_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendances \
             WHERE employee_id = ? AND date = ? \
             ORDER BY created_at ASC LIMIT 1"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list_by_date(&self, date: NaiveDate) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendances WHERE date = ?");
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn append(&self, new: NewAttendance) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO attendances
            (id, employee_id, employee_name, date, check_in_time,
             check_in_latitude, check_in_longitude, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.employee_id)
        .bind(&new.employee_name)
        .bind(new.date)
        .bind(new.check_in_time)
        .bind(new.check_in.latitude)
        .bind(new.check_in.longitude)
        .bind(new.check_in_time)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(e) if is_duplicate(&e) => Err(AppError::AlreadyCheckedIn),
            Err(e) => Err(write_error(e)),
        }
    }

    async fn overwrite(&self, record: &AttendanceRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE attendances SET
                employee_id = ?, employee_name = ?, date = ?,
                check_in_time = ?, check_out_time = ?,
                check_in_latitude = ?, check_in_longitude = ?,
                check_out_latitude = ?, check_out_longitude = ?,
                created_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(record.date)
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.check_in_latitude)
        .bind(record.check_in_longitude)
        .bind(record.check_out_latitude)
        .bind(record.check_out_longitude)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(&record.id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }

    async fn complete(&self, record: &AttendanceRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE attendances SET
                check_out_time = ?, check_out_latitude = ?, check_out_longitude = ?,
                updated_at = ?
            WHERE id = ?
            AND check_in_time IS NOT NULL
            AND check_out_time IS NULL
            "#,
        )
        .bind(record.check_out_time)
        .bind(record.check_out_latitude)
        .bind(record.check_out_longitude)
        .bind(record.updated_at)
        .bind(&record.id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Lost a race: tell "already closed" apart from "gone".
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM attendances WHERE id = ? LIMIT 1)",
        )
        .bind(&record.id)
        .fetch_one(&self.pool)
        .await?;

        if exists > 0 {
            Err(AppError::AlreadyCheckedOut)
        } else {
            Err(AppError::RecordNotFound)
        }
    }
}

#[async_trait]
impl UserDirectory for MySqlStore {
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Credentials::from))
    }

    async fn profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserRow::into_profile))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, employee_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_ref())
        .bind(&user.employee_id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(UserProfile {
            id,
            email: user.email,
            name: user.name,
            role: user.role,
            employee_id: user.employee_id,
        })
    }

    async fn store_refresh_token(
        &self,
        user_id: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume_refresh_token(&self, jti: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE jti = ?
            AND revoked = FALSE
            AND expires_at > ?
            "#,
        )
        .bind(jti)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
