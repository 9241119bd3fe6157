// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::{DashboardRepository, EnergyRepository, OrganizationRepository},
    models::{
        auth::User,
        dashboard::{AdminDashboard, ClerkDashboard, EnvironmentalDashboard, EnvironmentalKindCount, ManagerDashboard},
        environmental::EnvironmentalKind,
    },
    services::{inventory_service::InventoryService, period_service::PeriodService},
};

const LATEST_PERIODS: i64 = 5;

/// Completa con cero los tipos sin registros, en el orden de `EnvironmentalKind::ALL`.
fn fill_environmental_counts(found: Vec<EnvironmentalKindCount>) -> Vec<EnvironmentalKindCount> {
    EnvironmentalKind::ALL
        .into_iter()
        .map(|kind| EnvironmentalKindCount {
            kind,
            total: found.iter().find(|c| c.kind == kind).map_or(0, |c| c.total),
        })
        .collect()
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    energy_repo: EnergyRepository,
    org_repo: OrganizationRepository,
    periods: PeriodService,
    inventories: InventoryService,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        energy_repo: EnergyRepository,
        org_repo: OrganizationRepository,
        periods: PeriodService,
        inventories: InventoryService,
    ) -> Self {
        Self { repo, energy_repo, org_repo, periods, inventories }
    }

    pub async fn admin(&self) -> Result<AdminDashboard, AppError> {
        let mut summary = self.repo.admin_counts().await?;
        summary.latest_periods = self.periods.latest(LATEST_PERIODS).await?;
        Ok(summary)
    }

    pub async fn environmental(&self) -> Result<EnvironmentalDashboard, AppError> {
        let found = self.repo.environmental_counts().await?;
        Ok(EnvironmentalDashboard { counts: fill_environmental_counts(found) })
    }

    pub async fn manager(&self, manager: &User) -> Result<ManagerDashboard, AppError> {
        let unit = manager.require_org_unit()?;
        let org_unit = self.org_repo.get_org_unit(unit).await?;

        Ok(ManagerDashboard {
            org_unit_name: Some(org_unit.name),
            active_period: self.periods.active_period().await?,
            available_tariffs: self.energy_repo.tariffs_in_unit(unit).await?,
        })
    }

    pub async fn clerk(&self, clerk: &User) -> Result<ClerkDashboard, AppError> {
        let active_period = self.periods.active_period().await?;
        let my_records = match &active_period {
            Some(period) => self.inventories.count_by_creator(clerk, Some(period.id)).await?,
            None => 0,
        };
        Ok(ClerkDashboard { active_period, my_records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kinds_are_reported_as_zero() {
        let found = vec![
            EnvironmentalKindCount { kind: EnvironmentalKind::CentroAcopioRrr, total: 4 },
            EnvironmentalKindCount { kind: EnvironmentalKind::BitacoraMensual, total: 9 },
        ];
        let counts = fill_environmental_counts(found);

        assert_eq!(counts.len(), EnvironmentalKind::ALL.len());
        assert_eq!(counts[0].kind, EnvironmentalKind::BitacoraMensual);
        assert_eq!(counts[0].total, 9);
        assert_eq!(counts[6].total, 4);
        assert_eq!(counts.iter().map(|c| c.total).sum::<i64>(), 13);
    }
}
