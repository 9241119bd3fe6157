// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, models::energy::TariffCode};

// Roles del portal (tipo `user_role` en Postgres)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    AdminEnergia,
    AdminAmbiental,
    AdminSalud,
    Rector,
    Director,
    EncargadoUr,
    Capturista,
    Auditor,
}

impl UserRole {
    /// Roles con acceso a los módulos administrativos y alcance sobre todas las UR.
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::AdminEnergia | UserRole::AdminAmbiental)
    }

    /// Cuentas administrativas, sin UR. `admin_salud` lo es aunque no tenga acceso a ningún módulo.
    pub fn is_unit_free(self) -> bool {
        self.is_admin() || self == UserRole::AdminSalud
    }

    /// Encargados y capturistas operan siempre dentro de una UR.
    pub fn requires_org_unit(self) -> bool {
        matches!(self, UserRole::EncargadoUr | UserRole::Capturista)
    }

    pub fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::AdminEnergia => "Administrador de Energía",
            UserRole::AdminAmbiental => "Administrador Ambiental",
            UserRole::AdminSalud => "Administrador de Salud",
            UserRole::Rector => "Rector",
            UserRole::Director => "Director",
            UserRole::EncargadoUr => "Encargado de UR",
            UserRole::Capturista => "Capturista",
            UserRole::Auditor => "Auditor",
        }
    }
}

// Representa un usuario de la tabla 'users'
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub enrollment: Option<String>,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub org_unit_id: Option<Uuid>,
    pub role: UserRole,
    pub is_active: bool,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_by: Option<Uuid>,

    #[serde(skip_serializing)]
    pub failed_attempts: i32,
    #[serde(skip_serializing)]
    pub locked_until: Option<DateTime<Utc>>,

    pub deactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
    }

    /// Fin del bloqueo si la cuenta sigue bloqueada en `now`.
    pub fn locked_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| *until > now)
    }

    pub fn require_org_unit(&self) -> Result<Uuid, AppError> {
        self.org_unit_id.ok_or(AppError::MissingOrgUnit)
    }

    /// Alcance de lectura/escritura: `None` para administradores (todas las UR),
    /// la UR propia para el resto.
    pub fn scope(&self) -> Result<Option<Uuid>, AppError> {
        if self.role.is_admin() {
            Ok(None)
        } else {
            self.require_org_unit().map(Some)
        }
    }

    /// UR destino de un alta: el administrador la elige, el resto usa la suya.
    pub fn resolve_org_unit(&self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        if self.role.is_admin() {
            requested.ok_or_else(|| AppError::InvalidReference("orgUnitId".into()))
        } else {
            self.require_org_unit()
        }
    }
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

// ---
// Payloads de autenticación
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "El correo electrónico no es válido."))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub org_unit_name: Option<String>,
    pub available_tariffs: Vec<TariffCode>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequestPayload {
    #[validate(length(min = 1, message = "La contraseña actual es obligatoria."))]
    pub current_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeConfirmPayload {
    #[validate(length(equal = 6, message = "El código debe tener 6 dígitos."))]
    pub code: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequestPayload {
    #[validate(email(message = "El correo electrónico no es válido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmPayload {
    #[validate(email(message = "El correo electrónico no es válido."))]
    pub email: String,
    #[validate(length(equal = 6, message = "El código debe tener 6 dígitos."))]
    pub code: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub new_password: String,
    pub confirm_password: String,
}

// ---
// Payloads de gestión de usuarios
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub enrollment: Option<String>,
    #[validate(length(min = 1, message = "Los nombres son obligatorios."))]
    pub first_names: String,
    #[validate(length(min = 1, message = "Los apellidos son obligatorios."))]
    pub last_names: String,
    #[validate(email(message = "El correo electrónico no es válido."))]
    pub email: String,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres."))]
    pub phone: Option<String>,
    pub org_unit_id: Option<Uuid>,
    pub role: UserRole,
}

impl UserPayload {
    /// Los roles administrativos no pertenecen a ninguna UR.
    pub fn effective_org_unit(&self) -> Option<Uuid> {
        if self.role.is_unit_free() { None } else { self.org_unit_id }
    }

    /// Matrícula vacía se guarda como NULL para no chocar con la restricción única.
    pub fn normalized_enrollment(&self) -> Option<String> {
        normalize_enrollment(self.enrollment.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClerkPayload {
    pub enrollment: Option<String>,
    #[validate(length(min = 1, message = "Los nombres son obligatorios."))]
    pub first_names: String,
    #[validate(length(min = 1, message = "Los apellidos son obligatorios."))]
    pub last_names: String,
    #[validate(email(message = "El correo electrónico no es válido."))]
    pub email: String,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres."))]
    pub phone: Option<String>,
}

impl ClerkPayload {
    pub fn into_user_payload(self, org_unit_id: Uuid) -> UserPayload {
        UserPayload {
            enrollment: self.enrollment,
            first_names: self.first_names,
            last_names: self.last_names,
            email: self.email,
            phone: self.phone,
            org_unit_id: Some(org_unit_id),
            role: UserRole::Capturista,
        }
    }
}

pub fn normalize_enrollment(enrollment: Option<&str>) -> Option<String> {
    enrollment
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(role: UserRole) -> UserPayload {
        UserPayload {
            enrollment: Some("  ".into()),
            first_names: "Ana".into(),
            last_names: "López".into(),
            email: "ana@uni.mx".into(),
            phone: None,
            org_unit_id: Some(Uuid::new_v4()),
            role,
        }
    }

    #[test]
    fn admin_roles_drop_org_unit() {
        assert!(payload(UserRole::AdminEnergia).effective_org_unit().is_none());
        assert!(payload(UserRole::AdminSalud).effective_org_unit().is_none());
        assert!(payload(UserRole::EncargadoUr).effective_org_unit().is_some());
    }

    #[test]
    fn blank_enrollment_is_stored_as_null() {
        assert_eq!(payload(UserRole::Capturista).normalized_enrollment(), None);
        assert_eq!(normalize_enrollment(Some(" A123 ")), Some("A123".to_string()));
    }

    #[test]
    fn role_classification() {
        assert!(UserRole::AdminEnergia.is_admin());
        assert!(!UserRole::AdminSalud.is_admin());
        assert!(UserRole::AdminSalud.is_unit_free());
        assert!(!UserRole::Rector.is_admin());
        assert!(!UserRole::Rector.is_unit_free());
        assert!(UserRole::Capturista.requires_org_unit());
        assert!(!UserRole::Auditor.requires_org_unit());
    }

    fn user(role: UserRole, org_unit_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            enrollment: None,
            first_names: "Ana".into(),
            last_names: "López".into(),
            email: "ana@uni.mx".into(),
            phone: None,
            org_unit_id,
            role,
            is_active: true,
            password_hash: String::new(),
            created_by: None,
            failed_attempts: 0,
            locked_until: None,
            deactivated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admins_see_every_unit_and_pick_one_on_create() {
        let admin = user(UserRole::Admin, None);
        let unit = Uuid::new_v4();
        assert_eq!(admin.scope().unwrap(), None);
        assert_eq!(admin.resolve_org_unit(Some(unit)).unwrap(), unit);
        assert!(matches!(admin.resolve_org_unit(None), Err(AppError::InvalidReference(_))));
    }

    #[test]
    fn managers_are_pinned_to_their_unit() {
        let unit = Uuid::new_v4();
        let manager = user(UserRole::EncargadoUr, Some(unit));
        assert_eq!(manager.scope().unwrap(), Some(unit));
        assert_eq!(manager.resolve_org_unit(Some(Uuid::new_v4())).unwrap(), unit);

        let orphan = user(UserRole::Capturista, None);
        assert!(matches!(orphan.scope(), Err(AppError::MissingOrgUnit)));
    }

    #[test]
    fn lock_expires() {
        let mut u = user(UserRole::Capturista, None);
        let now = Utc::now();
        u.locked_until = Some(now + chrono::Duration::minutes(5));
        assert_eq!(u.locked_at(now), u.locked_until);
        assert_eq!(u.locked_at(now + chrono::Duration::minutes(6)), None);
    }

    #[test]
    fn clerk_payload_becomes_capturista_of_unit() {
        let unit = Uuid::new_v4();
        let clerk = ClerkPayload {
            enrollment: None,
            first_names: "Luis".into(),
            last_names: "Pérez".into(),
            email: "luis@uni.mx".into(),
            phone: Some("5551234567".into()),
        };
        let user = clerk.into_user_payload(unit);
        assert_eq!(user.role, UserRole::Capturista);
        assert_eq!(user.org_unit_id, Some(unit));
    }
}
