// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EnergyRepository, OrganizationRepository, UserRepository},
    models::auth::{AuthResponse, Claims, MeResponse, User},
    services::{mailer::Mailer, notifications},
};

pub const MAX_FAILED_ATTEMPTS: i32 = 3;
pub const LOCK_DURATION_HOURS: i64 = 2;
pub const RESET_CODE_MINUTES: i64 = 10;
pub const CHANGE_CODE_MINUTES: i64 = 15;
const TOKEN_DAYS: i64 = 7;

// ---
// Utilidades compartidas con UserService
// ---

pub(crate) async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;
    Ok(valid)
}

/// Código numérico de 6 dígitos, con ceros a la izquierda.
pub(crate) fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Cuándo queda bloqueada la cuenta tras `attempts` intentos fallidos, si aplica.
pub(crate) fn lockout_after(attempts: i32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (attempts >= MAX_FAILED_ATTEMPTS).then(|| now + Duration::hours(LOCK_DURATION_HOURS))
}

fn ensure_passwords_match(new_password: &str, confirm_password: &str) -> Result<(), AppError> {
    if new_password == confirm_password {
        Ok(())
    } else {
        Err(AppError::PasswordMismatch)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    energy_repo: EnergyRepository,
    mailer: Arc<dyn Mailer>,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
        energy_repo: EnergyRepository,
        mailer: Arc<dyn Mailer>,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, org_repo, energy_repo, mailer, jwt_secret, pool }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let now = Utc::now();
        if let Some(until) = user.locked_at(now) {
            tracing::warn!("🔒 Intento de acceso a cuenta bloqueada: {}", user.email);
            return Err(AppError::AccountLocked(until));
        }

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = verify_password(password.to_owned(), user.password_hash.clone()).await?;

        if !valid {
            let attempts = self.user_repo.increment_failed_attempts(user.id).await?;
            if let Some(until) = lockout_after(attempts, now) {
                self.user_repo.lock_until(user.id, until).await?;
                tracing::warn!("🔒 Cuenta bloqueada hasta {}: {}", until, user.email);

                let email = notifications::account_locked(&user.email, &user.first_names, until);
                if let Err(e) = self.mailer.send(email).await {
                    tracing::warn!("No se pudo notificar el bloqueo a {}: {}", user.email, e);
                }
                return Err(AppError::AccountLocked(until));
            }
            return Err(AppError::InvalidCredentials);
        }

        if user.failed_attempts > 0 || user.locked_until.is_some() {
            self.user_repo.reset_login_counters(user.id).await?;
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, role: user.role })
    }

    /// Decodifica el JWT y carga al usuario; cuentas desactivadas quedan fuera.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub async fn me(&self, user: User) -> Result<MeResponse, AppError> {
        let (org_unit_name, available_tariffs) = match user.org_unit_id {
            Some(unit_id) => {
                let unit = self.org_repo.get_org_unit(unit_id).await?;
                let tariffs = self.energy_repo.tariffs_in_unit(unit_id).await?;
                (Some(unit.name), tariffs)
            }
            None => (None, Vec::new()),
        };

        Ok(MeResponse { user, org_unit_name, available_tariffs })
    }

    // ---
    // Cambio de contraseña (usuario autenticado)
    // ---

    pub async fn request_password_change(&self, user: &User, current_password: &str) -> Result<(), AppError> {
        let valid = verify_password(current_password.to_owned(), user.password_hash.clone()).await?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }
        self.issue_code(user, CHANGE_CODE_MINUTES).await
    }

    pub async fn confirm_password_change(
        &self,
        user: &User,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        ensure_passwords_match(new_password, confirm_password)?;
        self.consume_code_and_set_password(user.id, code, new_password).await
    }

    // ---
    // Recuperación de contraseña (sin sesión)
    // ---

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::UserNotFound)?;
        self.issue_code(&user, RESET_CODE_MINUTES).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        ensure_passwords_match(new_password, confirm_password)?;
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidResetCode)?;
        self.consume_code_and_set_password(user.id, code, new_password).await?;

        // Una contraseña nueva también levanta el bloqueo
        self.user_repo.reset_login_counters(user.id).await
    }

    async fn issue_code(&self, user: &User, minutes: i64) -> Result<(), AppError> {
        self.user_repo.delete_unused_codes(user.id).await?;

        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(minutes);
        self.user_repo.insert_code(user.id, &code, expires_at).await?;

        let email = notifications::verification_code(&user.email, &user.first_names, &code, minutes);
        self.mailer.send(email).await?;

        tracing::info!("🔑 Código de verificación emitido para {}", user.email);
        Ok(())
    }

    async fn consume_code_and_set_password(
        &self,
        user_id: Uuid,
        code: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let stored = self
            .user_repo
            .find_valid_code(user_id, code, Utc::now())
            .await?
            .ok_or(AppError::InvalidResetCode)?;

        let hashed = hash_password(new_password.to_owned()).await?;

        let mut tx = self.pool.begin().await?;
        self.user_repo.mark_code_used(&mut *tx, stored.id).await?;
        self.user_repo.update_password(&mut *tx, user_id, &hashed).await?;
        tx.commit().await?;

        Ok(())
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(TOKEN_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_failure_locks_for_two_hours() {
        let now = Utc::now();
        assert_eq!(lockout_after(1, now), None);
        assert_eq!(lockout_after(2, now), None);
        assert_eq!(lockout_after(3, now), Some(now + Duration::hours(2)));
        assert!(lockout_after(7, now).is_some());
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        assert!(ensure_passwords_match("secreto1", "secreto1").is_ok());
        assert!(matches!(
            ensure_passwords_match("secreto1", "secreto2"),
            Err(AppError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn hashing_round_trip() {
        let hashed = hash_password("clave-segura".into()).await.unwrap();
        assert!(verify_password("clave-segura".into(), hashed.clone()).await.unwrap());
        assert!(!verify_password("otra".into(), hashed).await.unwrap());
    }
}
