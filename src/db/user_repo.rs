// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::auth::{PasswordResetCode, User, UserPayload, UserRole},
};

const USER_COLUMNS: &str = r#"
    id, enrollment, first_names, last_names, email, phone, org_unit_id, role,
    is_active, password_hash, created_by, failed_attempts, locked_until,
    deactivated_at, created_at, updated_at
"#;

// Destinatario de una notificación por correo
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipient {
    pub email: String,
    pub first_names: String,
}

// Usuarios y códigos de recuperación de contraseña
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self, active: bool) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE is_active = $1 ORDER BY last_names, first_names",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(active)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn list_clerks(&self, org_unit_id: Uuid) -> Result<Vec<User>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE org_unit_id = $1 AND role = 'capturista' AND is_active = TRUE
            ORDER BY last_names, first_names
            "#,
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(org_unit_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Indica si el correo y/o la matrícula ya están en uso por otro usuario.
    pub async fn find_conflicts(
        &self,
        email: &str,
        enrollment: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<(bool, bool), AppError> {
        let (email_taken, enrollment_taken): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1) AND id IS DISTINCT FROM $3),
                EXISTS (SELECT 1 FROM users WHERE $2::text IS NOT NULL AND enrollment = $2 AND id IS DISTINCT FROM $3)
            "#,
        )
        .bind(email)
        .bind(enrollment)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((email_taken, enrollment_taken))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &UserPayload,
        password_hash: &str,
        created_by: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO users (
                enrollment, first_names, last_names, email, phone,
                org_unit_id, role, password_hash, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(payload.normalized_enrollment())
            .bind(&payload.first_names)
            .bind(&payload.last_names)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(payload.effective_org_unit())
            .bind(payload.role)
            .bind(password_hash)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(map_write_error)
    }

    pub async fn update(&self, id: Uuid, payload: &UserPayload) -> Result<User, AppError> {
        let sql = format!(
            r#"
            UPDATE users SET
                enrollment = $2, first_names = $3, last_names = $4, email = $5,
                phone = $6, org_unit_id = $7, role = $8, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(payload.normalized_enrollment())
            .bind(&payload.first_names)
            .bind(&payload.last_names)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(payload.effective_org_unit())
            .bind(payload.role)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(AppError::NotFound("user"))
    }

    /// Baja lógica (`false`) o reactivación (`true`).
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                is_active = $2,
                deactivated_at = CASE WHEN $2 THEN NULL ELSE now() END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), "user")
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "user")
    }

    // ---
    // Control de intentos de inicio de sesión
    // ---

    pub async fn increment_failed_attempts(&self, id: Uuid) -> Result<i32, AppError> {
        let attempts: i32 = sqlx::query_scalar(
            "UPDATE users SET failed_attempts = failed_attempts + 1 WHERE id = $1 RETURNING failed_attempts",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempts)
    }

    pub async fn lock_until(&self, id: Uuid, until: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET failed_attempts = 0, locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn reset_login_counters(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET failed_attempts = 0, locked_until = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $2, failed_attempts = 0, locked_until = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        ensure_affected(result.rows_affected(), "user")
    }

    /// Capturistas y encargados activos, avisados al abrir un periodo de inventario.
    pub async fn list_period_recipients(&self) -> Result<Vec<Recipient>, AppError> {
        let recipients = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT email, first_names FROM users
            WHERE is_active = TRUE AND role IN ('capturista', 'encargado_ur')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(recipients)
    }

    pub async fn count_by_role(&self, role: UserRole) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // ---
    // Códigos de recuperación
    // ---

    pub async fn delete_unused_codes(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM password_reset_codes WHERE user_id = $1 AND used = FALSE")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_code(
        &self,
        user_id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetCode, AppError> {
        let code = sqlx::query_as::<_, PasswordResetCode>(
            r#"
            INSERT INTO password_reset_codes (user_id, code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, code, expires_at, used, created_at
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(code)
    }

    pub async fn find_valid_code(
        &self,
        user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetCode>, AppError> {
        let code = sqlx::query_as::<_, PasswordResetCode>(
            r#"
            SELECT id, user_id, code, expires_at, used, created_at
            FROM password_reset_codes
            WHERE user_id = $1 AND code = $2 AND used = FALSE AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(code)
    }

    /// Consume el código una sola vez: si otra petición lo usó antes, no afecta filas.
    pub async fn mark_code_used<'e, E>(&self, executor: E, code_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE password_reset_codes SET used = TRUE WHERE id = $1 AND used = FALSE")
            .bind(code_id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::InvalidResetCode);
        }
        Ok(())
    }
}
