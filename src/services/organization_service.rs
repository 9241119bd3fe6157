// src/services/organization_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrganizationRepository,
    models::{
        auth::User,
        organization::{
            Area, AreaFilter, AreaPayload, Building, BuildingPayload, Campus, CampusPayload, LookupOption, OrgUnit,
            OrgUnitPayload,
        },
    },
};

#[derive(Clone)]
pub struct OrganizationService {
    repo: OrganizationRepository,
}

impl OrganizationService {
    pub fn new(repo: OrganizationRepository) -> Self {
        Self { repo }
    }

    // --- Campus ---

    pub async fn list_campuses(&self) -> Result<Vec<Campus>, AppError> {
        self.repo.list_campuses().await
    }

    pub async fn get_campus(&self, id: Uuid) -> Result<Campus, AppError> {
        self.repo.get_campus(id).await
    }

    pub async fn create_campus(&self, payload: &CampusPayload) -> Result<Campus, AppError> {
        self.repo.create_campus(payload).await
    }

    pub async fn update_campus(&self, id: Uuid, payload: &CampusPayload) -> Result<Campus, AppError> {
        self.repo.update_campus(id, payload).await
    }

    pub async fn delete_campus(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_campus(id).await
    }

    // --- Unidades Responsables ---

    pub async fn list_org_units(&self) -> Result<Vec<OrgUnit>, AppError> {
        self.repo.list_org_units().await
    }

    pub async fn get_org_unit(&self, id: Uuid) -> Result<OrgUnit, AppError> {
        self.repo.get_org_unit(id).await
    }

    pub async fn create_org_unit(&self, payload: &OrgUnitPayload) -> Result<OrgUnit, AppError> {
        self.repo.create_org_unit(payload).await
    }

    pub async fn update_org_unit(&self, id: Uuid, payload: &OrgUnitPayload) -> Result<OrgUnit, AppError> {
        self.repo.update_org_unit(id, payload).await
    }

    pub async fn delete_org_unit(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_org_unit(id).await
    }

    // --- Edificios ---

    /// Administradores ven todos (o los de `org_unit_id`); el encargado solo los de su UR.
    pub async fn list_buildings(&self, actor: &User, org_unit_id: Option<Uuid>) -> Result<Vec<Building>, AppError> {
        let unit = actor.scope()?.or(org_unit_id);
        self.repo.list_buildings(unit).await
    }

    pub async fn create_building(&self, manager: &User, payload: &BuildingPayload) -> Result<Building, AppError> {
        let unit = manager.require_org_unit()?;
        self.repo.create_building(unit, payload).await
    }

    pub async fn update_building(
        &self,
        manager: &User,
        id: Uuid,
        payload: &BuildingPayload,
    ) -> Result<Building, AppError> {
        let unit = manager.require_org_unit()?;
        self.repo.update_building(id, unit, payload).await
    }

    pub async fn delete_building(&self, manager: &User, id: Uuid) -> Result<(), AppError> {
        let unit = manager.require_org_unit()?;
        self.repo.delete_building(id, unit).await
    }

    // --- Áreas ---

    pub async fn list_areas(&self, actor: &User, filter: AreaFilter) -> Result<Vec<Area>, AppError> {
        let filter = AreaFilter {
            org_unit_id: actor.scope()?.or(filter.org_unit_id),
            building_id: filter.building_id,
        };
        self.repo.list_areas(&filter).await
    }

    pub async fn create_area(&self, manager: &User, payload: &AreaPayload) -> Result<Area, AppError> {
        let unit = manager.require_org_unit()?;
        self.ensure_building_in_unit(payload.building_id, unit).await?;
        self.repo.create_area(unit, payload).await
    }

    pub async fn update_area(&self, manager: &User, id: Uuid, payload: &AreaPayload) -> Result<Area, AppError> {
        let unit = manager.require_org_unit()?;
        self.ensure_building_in_unit(payload.building_id, unit).await?;
        self.repo.update_area(id, unit, payload).await
    }

    pub async fn delete_area(&self, manager: &User, id: Uuid) -> Result<(), AppError> {
        let unit = manager.require_org_unit()?;
        self.repo.delete_area(id, unit).await
    }

    // --- Selects en cascada ---

    pub async fn building_options(&self, org_unit_id: Uuid) -> Result<Vec<LookupOption>, AppError> {
        self.repo.building_options(org_unit_id).await
    }

    pub async fn area_options(&self, filter: &AreaFilter) -> Result<Vec<LookupOption>, AppError> {
        self.repo.area_options(filter).await
    }

    /// Verifica que edificio y área existan, pertenezcan a la UR y estén relacionados entre sí.
    pub async fn ensure_location(&self, org_unit_id: Uuid, building_id: Uuid, area_id: Uuid) -> Result<(), AppError> {
        self.ensure_building_in_unit(building_id, org_unit_id).await?;

        let area = self
            .repo
            .get_area(area_id)
            .await
            .map_err(|_| AppError::InvalidReference("areaId".into()))?;
        if area.org_unit_id != org_unit_id || area.building_id != building_id {
            return Err(AppError::InvalidReference("areaId".into()));
        }
        Ok(())
    }

    async fn ensure_building_in_unit(&self, building_id: Uuid, org_unit_id: Uuid) -> Result<(), AppError> {
        let building = self
            .repo
            .get_building(building_id)
            .await
            .map_err(|_| AppError::InvalidReference("buildingId".into()))?;
        if building.org_unit_id != org_unit_id {
            return Err(AppError::InvalidReference("buildingId".into()));
        }
        Ok(())
    }
}
