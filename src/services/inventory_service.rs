// src/services/inventory_service.rs

use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PeriodRepository},
    models::{
        auth::{User, UserRole},
        inventory::{
            InventoryFigures, InventoryFilter, InventoryKind, InventoryListResponse, InventoryPayload,
            InventoryPeriod, InventoryRecord, InventoryRecordView, InventoryTotals,
        },
    },
    services::{organization_service::OrganizationService, period_service::today},
};

fn details_error(message: &'static str) -> AppError {
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add("details", err);
    AppError::ValidationError(errors)
}

/// Equipo con cifras negativas: se rechaza como error de validación sobre `details`.
fn ensure_non_negative(payload: &InventoryPayload) -> Result<(), AppError> {
    if payload.details.has_negative_values() {
        return Err(details_error("Los valores del equipo no pueden ser negativos."));
    }
    Ok(())
}

/// Potencia y consumo del equipo; cifras que no caben en el registro son un error de validación.
fn compute_figures(payload: &InventoryPayload) -> Result<InventoryFigures, AppError> {
    payload
        .details
        .figures(payload.monthly_hours)
        .ok_or_else(|| details_error("Los valores del equipo exceden el rango permitido."))
}

/// Lectura: capturistas sus propios registros, encargados los de su UR, administradores todos.
fn ensure_can_read(actor: &User, record: &InventoryRecord) -> Result<(), AppError> {
    let allowed = match actor.role {
        UserRole::EncargadoUr => actor.org_unit_id == Some(record.org_unit_id),
        _ => can_modify(actor, record),
    };
    if allowed { Ok(()) } else { Err(AppError::NotFound("inventory")) }
}

/// Escritura: capturistas sus propios registros, administradores todos. El encargado solo consulta.
fn ensure_can_modify(actor: &User, record: &InventoryRecord) -> Result<(), AppError> {
    if can_modify(actor, record) { Ok(()) } else { Err(AppError::Forbidden) }
}

fn can_modify(actor: &User, record: &InventoryRecord) -> bool {
    match actor.role {
        UserRole::Capturista => record.created_by == Some(actor.id),
        role => role.is_admin(),
    }
}

fn with_totals(records: Vec<InventoryRecordView>) -> InventoryListResponse {
    let totals = InventoryTotals::from_records(records.iter().map(|r| &r.record));
    InventoryListResponse { records, totals }
}

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
    period_repo: PeriodRepository,
    organization: OrganizationService,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository, period_repo: PeriodRepository, organization: OrganizationService) -> Self {
        Self { repo, period_repo, organization }
    }

    /// Listado según el rol:
    /// - capturista: sus registros del periodo vigente (vacío si no hay periodo);
    /// - encargado: los de su UR, con filtro opcional de periodo y tipo;
    /// - administrador: filtros libres.
    pub async fn list(&self, actor: &User, filter: InventoryFilter) -> Result<InventoryListResponse, AppError> {
        let records = match actor.role {
            UserRole::Capturista => {
                let Some(period) = self.period_repo.find_active(today()).await? else {
                    return Ok(with_totals(Vec::new()));
                };
                let filter = InventoryFilter {
                    org_unit_id: Some(actor.require_org_unit()?),
                    period_id: Some(period.id),
                    kind: filter.kind,
                    active: Some(true),
                };
                self.repo.list(&filter, Some(actor.id)).await?
            }
            _ => {
                let filter = InventoryFilter {
                    org_unit_id: actor.scope()?.or(filter.org_unit_id),
                    ..filter
                };
                self.repo.list(&filter, None).await?
            }
        };
        Ok(with_totals(records))
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<InventoryRecord, AppError> {
        let record = self.repo.get(id).await?;
        // Fuera de alcance se reporta como inexistente
        ensure_can_read(actor, &record)?;
        Ok(record)
    }

    pub async fn create(&self, actor: &User, payload: &InventoryPayload) -> Result<InventoryRecord, AppError> {
        ensure_non_negative(payload)?;

        let unit = actor.resolve_org_unit(payload.org_unit_id)?;
        let period = self.target_period(actor, payload.period_id).await?;
        self.organization
            .ensure_location(unit, payload.building_id, payload.area_id)
            .await?;

        let figures = compute_figures(payload)?;
        let record = self.repo.create(unit, period.id, payload, figures, actor.id).await?;

        tracing::info!(
            "📦 Inventario {} registrado en {} por {}",
            record.kind.label(),
            period.name,
            actor.email
        );
        Ok(record)
    }

    pub async fn update(&self, actor: &User, id: Uuid, payload: &InventoryPayload) -> Result<InventoryRecord, AppError> {
        ensure_non_negative(payload)?;

        let current = self.repo.get(id).await?;
        ensure_can_modify(actor, &current)?;
        if current.kind != payload.details.kind() {
            return Err(AppError::InvalidKind(payload.details.kind().label().to_string()));
        }

        self.organization
            .ensure_location(current.org_unit_id, payload.building_id, payload.area_id)
            .await?;

        let figures = compute_figures(payload)?;
        self.repo.update(id, payload, figures, actor.id).await
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let current = self.repo.get(id).await?;
        ensure_can_modify(actor, &current)?;
        self.repo.delete(id).await
    }

    pub async fn deactivate(&self, actor: &User, id: Uuid) -> Result<InventoryRecord, AppError> {
        let record = self.repo.deactivate(id, actor.id).await?;
        tracing::info!("Inventario {} dado de baja por {}", id, actor.email);
        Ok(record)
    }

    pub async fn reactivate(&self, actor: &User, id: Uuid) -> Result<InventoryRecord, AppError> {
        let record = self.repo.reactivate(id, actor.id).await?;
        tracing::info!("Inventario {} reactivado por {}", id, actor.email);
        Ok(record)
    }

    /// Registros activos de una UR, periodo y tipo para la hoja de Excel.
    pub async fn export_rows(
        &self,
        actor: &User,
        org_unit_id: Option<Uuid>,
        period_id: Uuid,
        kind: InventoryKind,
    ) -> Result<InventoryListResponse, AppError> {
        let filter = InventoryFilter {
            org_unit_id: Some(actor.resolve_org_unit(org_unit_id)?),
            period_id: Some(period_id),
            kind: Some(kind),
            active: Some(true),
        };
        let records = self.repo.list(&filter, None).await?;
        Ok(with_totals(records))
    }

    pub async fn count_by_creator(&self, user: &User, period_id: Option<Uuid>) -> Result<i64, AppError> {
        self.repo.count_by_creator(user.id, period_id).await
    }

    /// Los capturistas siempre capturan en el periodo vigente; el administrador puede elegir otro.
    async fn target_period(&self, actor: &User, requested: Option<Uuid>) -> Result<InventoryPeriod, AppError> {
        match requested {
            Some(id) if actor.role.is_admin() => self
                .period_repo
                .get(id)
                .await
                .map_err(|_| AppError::InvalidReference("periodId".into())),
            _ => self
                .period_repo
                .find_active(today())
                .await?
                .ok_or(AppError::NoActivePeriod),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::{FloorLevel, InventoryDetails, LightingDetails, MiscDetails};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    fn user(role: UserRole, org_unit_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            enrollment: None,
            first_names: "Eva".into(),
            last_names: "Soto".into(),
            email: "eva@uni.mx".into(),
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

    fn lighting(fixtures: i32) -> InventoryDetails {
        InventoryDetails::Luminarias(LightingDetails {
            lamp_type: "LED".into(),
            fixtures,
            lamps_per_fixture: 2,
            lamp_watts: Decimal::from(18),
        })
    }

    fn record(org_unit_id: Uuid, created_by: Uuid) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::new_v4(),
            kind: InventoryKind::Luminarias,
            org_unit_id,
            building_id: Uuid::new_v4(),
            level: FloorLevel::GroundFloor,
            area_id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            details: Json(lighting(4)),
            total_power_kw: Decimal::new(144, 3),
            monthly_hours: Decimal::from(100),
            monthly_consumption: Decimal::new(1440, 2),
            created_by: Some(created_by),
            updated_by: None,
            updated_at: None,
            active: true,
            deactivated_at: None,
            deactivated_by: None,
            reactivated_at: None,
            reactivated_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn clerks_only_modify_their_own_records() {
        let unit = Uuid::new_v4();
        let clerk = user(UserRole::Capturista, Some(unit));
        let other_clerk = user(UserRole::Capturista, Some(unit));
        let r = record(unit, clerk.id);

        assert!(ensure_can_modify(&clerk, &r).is_ok());
        assert!(matches!(ensure_can_modify(&other_clerk, &r), Err(AppError::Forbidden)));
    }

    #[test]
    fn managers_only_read_records_of_their_unit() {
        let unit = Uuid::new_v4();
        let r = record(unit, Uuid::new_v4());
        let manager = user(UserRole::EncargadoUr, Some(unit));

        assert!(ensure_can_read(&manager, &r).is_ok());
        assert!(matches!(ensure_can_modify(&manager, &r), Err(AppError::Forbidden)));
        assert!(matches!(
            ensure_can_read(&user(UserRole::EncargadoUr, Some(Uuid::new_v4())), &r),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn admins_reach_every_record() {
        let r = record(Uuid::new_v4(), Uuid::new_v4());

        assert!(ensure_can_modify(&user(UserRole::Admin, None), &r).is_ok());
        assert!(ensure_can_read(&user(UserRole::AdminAmbiental, None), &r).is_ok());
        assert!(ensure_can_modify(&user(UserRole::Auditor, None), &r).is_err());
        assert!(ensure_can_modify(&user(UserRole::AdminSalud, None), &r).is_err());
    }

    #[test]
    fn negative_equipment_is_a_validation_error() {
        let payload = InventoryPayload {
            org_unit_id: None,
            period_id: None,
            building_id: Uuid::new_v4(),
            area_id: Uuid::new_v4(),
            level: FloorLevel::First,
            monthly_hours: Decimal::from(80),
            details: lighting(-3),
        };
        match ensure_non_negative(&payload) {
            Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("details")),
            other => panic!("resultado inesperado: {:?}", other.err()),
        }
    }

    #[test]
    fn oversized_equipment_is_a_validation_error() {
        let payload = InventoryPayload {
            org_unit_id: None,
            period_id: None,
            building_id: Uuid::new_v4(),
            area_id: Uuid::new_v4(),
            level: FloorLevel::NoFloor,
            monthly_hours: Decimal::from(10),
            details: InventoryDetails::Miscelaneos(MiscDetails {
                description: "Subestación portátil".into(),
                brand: None,
                model: None,
                voltage: Decimal::from(10i64.pow(16)),
                amperage: Decimal::from(10i64.pow(14)),
            }),
        };
        assert!(ensure_non_negative(&payload).is_ok());
        match compute_figures(&payload) {
            Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("details")),
            other => panic!("resultado inesperado: {:?}", other),
        }
    }

    #[test]
    fn totals_sum_every_record() {
        let unit = Uuid::new_v4();
        let records: Vec<InventoryRecord> = (0..3).map(|_| record(unit, Uuid::new_v4())).collect();
        let totals = InventoryTotals::from_records(records.iter());
        assert_eq!(totals.records, 3);
        assert_eq!(totals.monthly_consumption, Decimal::new(4320, 2));
        assert_eq!(totals.monthly_hours, Decimal::from(300));
    }
}
