// src/services/user_service.rs

use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, UserRepository},
    models::auth::{ClerkPayload, User, UserPayload, UserRole},
    services::{
        auth::hash_password,
        mailer::Mailer,
        notifications,
    },
};

const TEMP_PASSWORD_LEN: usize = 10;

pub(crate) fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Traduce el resultado de `find_conflicts` al error correspondiente.
fn conflict_error(email_taken: bool, enrollment_taken: bool) -> Option<AppError> {
    match (email_taken, enrollment_taken) {
        (true, true) => Some(AppError::EmailAndEnrollmentAlreadyExist),
        (true, false) => Some(AppError::EmailAlreadyExists),
        (false, true) => Some(AppError::EnrollmentAlreadyExists),
        (false, false) => None,
    }
}

/// Un encargado solo gestiona a los capturistas que él mismo dio de alta.
fn ensure_owned_clerk(manager: &User, target: &User) -> Result<(), AppError> {
    if target.role == UserRole::Capturista && target.created_by == Some(manager.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    mailer: Arc<dyn Mailer>,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
        mailer: Arc<dyn Mailer>,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, org_repo, mailer, pool }
    }

    pub async fn list_users(&self, active: bool) -> Result<Vec<User>, AppError> {
        self.user_repo.list(active).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn create_user(&self, payload: &UserPayload, created_by: &User) -> Result<User, AppError> {
        self.check_org_unit(payload).await?;
        self.check_conflicts(payload, None).await?;
        self.insert_with_credentials(payload, Some(created_by.id)).await
    }

    pub async fn update_user(&self, id: Uuid, payload: &UserPayload) -> Result<User, AppError> {
        self.check_org_unit(payload).await?;
        self.check_conflicts(payload, Some(id)).await?;
        self.user_repo.update(id, payload).await
    }

    pub async fn deactivate_user(&self, id: Uuid) -> Result<(), AppError> {
        self.user_repo.set_active(id, false).await?;
        tracing::info!("Usuario {} desactivado", id);
        Ok(())
    }

    pub async fn reactivate_user(&self, id: Uuid) -> Result<(), AppError> {
        self.user_repo.set_active(id, true).await?;
        tracing::info!("Usuario {} reactivado", id);
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.user_repo.delete(id).await
    }

    // ---
    // Capturistas (gestionados por el encargado de UR)
    // ---

    pub async fn list_clerks(&self, manager: &User) -> Result<Vec<User>, AppError> {
        let unit = manager.require_org_unit()?;
        self.user_repo.list_clerks(unit).await
    }

    pub async fn create_clerk(&self, manager: &User, payload: ClerkPayload) -> Result<User, AppError> {
        let unit = manager.require_org_unit()?;
        let payload = payload.into_user_payload(unit);
        self.check_conflicts(&payload, None).await?;
        self.insert_with_credentials(&payload, Some(manager.id)).await
    }

    pub async fn update_clerk(&self, manager: &User, id: Uuid, payload: ClerkPayload) -> Result<User, AppError> {
        let unit = manager.require_org_unit()?;
        let target = self.get_user(id).await?;
        ensure_owned_clerk(manager, &target)?;

        let payload = payload.into_user_payload(unit);
        self.check_conflicts(&payload, Some(id)).await?;
        self.user_repo.update(id, &payload).await
    }

    pub async fn delete_clerk(&self, manager: &User, id: Uuid) -> Result<(), AppError> {
        let target = self.get_user(id).await?;
        ensure_owned_clerk(manager, &target)?;
        self.user_repo.delete(id).await
    }

    /// Crea el primer administrador si aún no existe ninguno.
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.count_by_role(UserRole::Admin).await? > 0 {
            return Ok(false);
        }

        let payload = UserPayload {
            enrollment: None,
            first_names: "Administrador".into(),
            last_names: "del Sistema".into(),
            email: email.to_string(),
            phone: None,
            org_unit_id: None,
            role: UserRole::Admin,
        };
        let hashed = hash_password(password.to_owned()).await?;
        self.user_repo.create(&self.pool, &payload, &hashed, None).await?;

        tracing::info!("👤 Administrador inicial creado: {}", email);
        Ok(true)
    }

    // ---
    // Internos
    // ---

    async fn check_org_unit(&self, payload: &UserPayload) -> Result<(), AppError> {
        match (payload.role.requires_org_unit(), payload.org_unit_id) {
            (true, None) => Err(AppError::InvalidReference("orgUnitId".into())),
            (true, Some(unit)) => self.org_repo.get_org_unit(unit).await.map(|_| ()),
            (false, _) => Ok(()),
        }
    }

    async fn check_conflicts(&self, payload: &UserPayload, exclude_id: Option<Uuid>) -> Result<(), AppError> {
        let enrollment = payload.normalized_enrollment();
        let (email_taken, enrollment_taken) = self
            .user_repo
            .find_conflicts(&payload.email, enrollment.as_deref(), exclude_id)
            .await?;

        match conflict_error(email_taken, enrollment_taken) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Alta con contraseña temporal enviada por correo. Si el correo falla, el alta se revierte.
    async fn insert_with_credentials(&self, payload: &UserPayload, created_by: Option<Uuid>) -> Result<User, AppError> {
        let temporary_password = generate_temporary_password();
        let hashed = hash_password(temporary_password.clone()).await?;

        let mut tx = self.pool.begin().await?;
        let user = self.user_repo.create(&mut *tx, payload, &hashed, created_by).await?;

        let email = notifications::account_created(&user.email, &user.full_name(), &temporary_password);
        self.mailer.send(email).await?;
        tx.commit().await?;

        tracing::info!("👤 Usuario creado: {} ({})", user.email, user.role.label());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, created_by: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            enrollment: None,
            first_names: "Luis".into(),
            last_names: "Pérez".into(),
            email: "luis@uni.mx".into(),
            phone: None,
            org_unit_id: Some(Uuid::new_v4()),
            role,
            is_active: true,
            password_hash: String::new(),
            created_by,
            failed_attempts: 0,
            locked_until: None,
            deactivated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn both_conflicts_are_reported_together() {
        assert!(matches!(conflict_error(true, true), Some(AppError::EmailAndEnrollmentAlreadyExist)));
        assert!(matches!(conflict_error(true, false), Some(AppError::EmailAlreadyExists)));
        assert!(matches!(conflict_error(false, true), Some(AppError::EnrollmentAlreadyExists)));
        assert!(conflict_error(false, false).is_none());
    }

    #[test]
    fn managers_only_touch_their_own_clerks() {
        let manager = user(UserRole::EncargadoUr, None);
        let mine = user(UserRole::Capturista, Some(manager.id));
        let foreign = user(UserRole::Capturista, Some(Uuid::new_v4()));
        let colleague = user(UserRole::EncargadoUr, Some(manager.id));

        assert!(ensure_owned_clerk(&manager, &mine).is_ok());
        assert!(matches!(ensure_owned_clerk(&manager, &foreign), Err(AppError::Forbidden)));
        assert!(matches!(ensure_owned_clerk(&manager, &colleague), Err(AppError::Forbidden)));
    }

    #[test]
    fn temporary_passwords_are_alphanumeric() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMP_PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
