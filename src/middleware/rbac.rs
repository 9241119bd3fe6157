// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{User, UserRole},
};

/// Conjunto de roles admitidos por un grupo de rutas.
pub trait RolePolicy: Send + Sync + 'static {
    const NAME: &'static str;
    fn allows(role: UserRole) -> bool;
}

/// Extractor guardián: rechaza con 403 si el rol del usuario no está en la política `P`.
pub struct RequireRole<P: RolePolicy> {
    pub user: User,
    _policy: PhantomData<P>,
}

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !P::allows(user.role) {
            tracing::warn!("🚫 {} ({:?}) sin acceso a una ruta {}", user.email, user.role, P::NAME);
            let app_state = AppState::from_ref(state);
            let locale = Locale::from_header(parts.headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()));
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole { user, _policy: PhantomData })
    }
}

// ---
// Políticas
// ---

/// admin, admin_energia, admin_ambiental (ver `UserRole::is_admin`)
pub struct Admins;
impl RolePolicy for Admins {
    const NAME: &'static str = "administrativa";
    fn allows(role: UserRole) -> bool {
        role.is_admin()
    }
}

/// Administradores y encargados de UR (el alcance lo aplica cada servicio).
pub struct EnergyStaff;
impl RolePolicy for EnergyStaff {
    const NAME: &'static str = "de energía";
    fn allows(role: UserRole) -> bool {
        Admins::allows(role) || role == UserRole::EncargadoUr
    }
}

/// Quien consulta inventarios; el encargado solo lee los de su UR.
pub struct InventoryStaff;
impl RolePolicy for InventoryStaff {
    const NAME: &'static str = "de inventarios";
    fn allows(role: UserRole) -> bool {
        EnergyStaff::allows(role) || role == UserRole::Capturista
    }
}

/// Quien captura, edita o elimina inventarios: capturistas y administradores.
pub struct InventoryEditors;
impl RolePolicy for InventoryEditors {
    const NAME: &'static str = "de captura de inventarios";
    fn allows(role: UserRole) -> bool {
        Admins::allows(role) || role == UserRole::Capturista
    }
}

pub struct Managers;
impl RolePolicy for Managers {
    const NAME: &'static str = "de encargado";
    fn allows(role: UserRole) -> bool {
        role == UserRole::EncargadoUr
    }
}

pub struct Clerks;
impl RolePolicy for Clerks {
    const NAME: &'static str = "de capturista";
    fn allows(role: UserRole) -> bool {
        role == UserRole::Capturista
    }
}

/// Tablero general: administradores y usuarios de consulta.
pub struct DashboardViewers;
impl RolePolicy for DashboardViewers {
    const NAME: &'static str = "de tablero";
    fn allows(role: UserRole) -> bool {
        Admins::allows(role) || matches!(role, UserRole::Rector | UserRole::Director | UserRole::Auditor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [UserRole; 9] = [
        UserRole::Admin,
        UserRole::AdminEnergia,
        UserRole::AdminAmbiental,
        UserRole::AdminSalud,
        UserRole::Rector,
        UserRole::Director,
        UserRole::EncargadoUr,
        UserRole::Capturista,
        UserRole::Auditor,
    ];

    fn allowed<P: RolePolicy>() -> Vec<UserRole> {
        ALL_ROLES.into_iter().filter(|r| P::allows(*r)).collect()
    }

    #[test]
    fn admin_policy_covers_the_three_admin_roles() {
        assert_eq!(
            allowed::<Admins>(),
            vec![UserRole::Admin, UserRole::AdminEnergia, UserRole::AdminAmbiental]
        );
    }

    #[test]
    fn energy_staff_adds_managers_only() {
        let roles = allowed::<EnergyStaff>();
        assert!(roles.contains(&UserRole::EncargadoUr));
        assert!(!roles.contains(&UserRole::Capturista));
        assert_eq!(roles.len(), 4);
    }

    #[test]
    fn inventory_staff_includes_clerks() {
        assert!(InventoryStaff::allows(UserRole::Capturista));
        assert!(!InventoryStaff::allows(UserRole::Auditor));
    }

    #[test]
    fn managers_read_inventories_but_do_not_edit_them() {
        assert!(InventoryStaff::allows(UserRole::EncargadoUr));
        assert!(!InventoryEditors::allows(UserRole::EncargadoUr));
        assert_eq!(
            allowed::<InventoryEditors>(),
            vec![UserRole::Admin, UserRole::AdminEnergia, UserRole::AdminAmbiental, UserRole::Capturista]
        );
    }

    #[test]
    fn admin_salud_has_no_module_access() {
        assert!(!Admins::allows(UserRole::AdminSalud));
        assert!(!DashboardViewers::allows(UserRole::AdminSalud));
        assert!(!InventoryStaff::allows(UserRole::AdminSalud));
    }

    #[test]
    fn single_role_policies() {
        assert_eq!(allowed::<Managers>(), vec![UserRole::EncargadoUr]);
        assert_eq!(allowed::<Clerks>(), vec![UserRole::Capturista]);
    }

    #[test]
    fn dashboard_is_read_by_viewers_but_not_by_operators() {
        assert!(DashboardViewers::allows(UserRole::Rector));
        assert!(DashboardViewers::allows(UserRole::AdminEnergia));
        assert!(!DashboardViewers::allows(UserRole::Capturista));
        assert!(!DashboardViewers::allows(UserRole::EncargadoUr));
    }
}
