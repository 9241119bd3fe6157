// src/db/dashboard_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::dashboard::{AdminDashboard, EnvironmentalKindCount},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Conteos globales; los periodos recientes se completan en el servicio.
    pub async fn admin_counts(&self) -> Result<AdminDashboard, AppError> {
        let counts = sqlx::query_as::<_, AdminDashboard>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM org_units) AS org_units,
                (SELECT COUNT(*) FROM buildings) AS buildings,
                (SELECT COUNT(*) FROM substations) AS substations,
                (SELECT COUNT(*) FROM invoices) AS invoices,
                (SELECT COUNT(*) FROM areas) AS areas,
                (SELECT COUNT(*) FROM inventory_records WHERE kind = 'CLIMATIZACION') AS hvac_inventories,
                (SELECT COUNT(*) FROM inventory_records WHERE kind = 'LUMINARIAS') AS lighting_inventories,
                (SELECT COUNT(*) FROM inventory_records WHERE kind = 'MISCELANEOS') AS misc_inventories
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Registros ambientales vigentes agrupados por tipo (solo los tipos con registros).
    pub async fn environmental_counts(&self) -> Result<Vec<EnvironmentalKindCount>, AppError> {
        let counts = sqlx::query_as::<_, EnvironmentalKindCount>(
            r#"
            SELECT kind, COUNT(*) AS total
            FROM environmental_records
            WHERE status = TRUE
            GROUP BY kind
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}
