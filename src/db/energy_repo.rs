// src/db/energy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::energy::{
        Invoice, InvoiceFilter, InvoicePayload, InvoiceView, Meter, MeterPayload, Substation,
        SubstationPayload, Tariff, TariffCode, TariffGroup, TariffPayload,
    },
};

const INVOICE_VIEW_SELECT: &str = r#"
    SELECT
        i.*,
        s.service_number,
        s.meter_number,
        s.org_unit_id,
        o.name AS org_unit_name,
        (u.first_names || ' ' || u.last_names) AS created_by_name
    FROM invoices i
    JOIN substations s ON s.id = i.substation_id
    JOIN org_units o ON o.id = s.org_unit_id
    LEFT JOIN users u ON u.id = i.created_by
"#;

fn group_slug(group: Option<TariffGroup>) -> Option<&'static str> {
    group.map(|g| match g {
        TariffGroup::Pdbt => "pdbt",
        TariffGroup::Triple => "triple",
    })
}

// Subestaciones, catálogo de tarifas, medidores y facturas
#[derive(Clone)]
pub struct EnergyRepository {
    pool: PgPool,
}

impl EnergyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Subestaciones
    // ---

    pub async fn list_substations(&self, org_unit_id: Option<Uuid>) -> Result<Vec<Substation>, AppError> {
        let substations = sqlx::query_as::<_, Substation>(
            r#"
            SELECT * FROM substations
            WHERE ($1::uuid IS NULL OR org_unit_id = $1)
            ORDER BY service_number
            "#,
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(substations)
    }

    pub async fn get_substation(&self, id: Uuid) -> Result<Substation, AppError> {
        sqlx::query_as::<_, Substation>("SELECT * FROM substations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("substation"))
    }

    pub async fn create_substation(
        &self,
        org_unit_id: Uuid,
        payload: &SubstationPayload,
    ) -> Result<Substation, AppError> {
        sqlx::query_as::<_, Substation>(
            r#"
            INSERT INTO substations (org_unit_id, service_number, meter_number, tariff, multiplier)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(org_unit_id)
        .bind(payload.service_number)
        .bind(&payload.meter_number)
        .bind(payload.tariff)
        .bind(payload.multiplier)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// `scope` limita la operación a una UR (encargado); `None` es acceso global.
    pub async fn update_substation(
        &self,
        id: Uuid,
        scope: Option<Uuid>,
        org_unit_id: Uuid,
        payload: &SubstationPayload,
    ) -> Result<Substation, AppError> {
        sqlx::query_as::<_, Substation>(
            r#"
            UPDATE substations SET
                org_unit_id = $3, service_number = $4, meter_number = $5,
                tariff = $6, multiplier = $7
            WHERE id = $1 AND ($2::uuid IS NULL OR org_unit_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(org_unit_id)
        .bind(payload.service_number)
        .bind(&payload.meter_number)
        .bind(payload.tariff)
        .bind(payload.multiplier)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("substation"))
    }

    pub async fn delete_substation(&self, id: Uuid, scope: Option<Uuid>) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM substations WHERE id = $1 AND ($2::uuid IS NULL OR org_unit_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .execute(&self.pool)
        .await
        .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "substation")
    }

    /// Tarifas presentes en las subestaciones de una UR.
    pub async fn tariffs_in_unit(&self, org_unit_id: Uuid) -> Result<Vec<TariffCode>, AppError> {
        let tariffs = sqlx::query_scalar::<_, TariffCode>(
            "SELECT DISTINCT tariff FROM substations WHERE org_unit_id = $1 ORDER BY tariff",
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tariffs)
    }

    // ---
    // Catálogo de tarifas
    // ---

    pub async fn list_tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        let tariffs = sqlx::query_as::<_, Tariff>("SELECT * FROM tariffs ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tariffs)
    }

    pub async fn get_tariff(&self, id: Uuid) -> Result<Tariff, AppError> {
        sqlx::query_as::<_, Tariff>("SELECT * FROM tariffs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("tariff"))
    }

    pub async fn create_tariff(&self, payload: &TariffPayload) -> Result<Tariff, AppError> {
        sqlx::query_as::<_, Tariff>(
            "INSERT INTO tariffs (name, description, rate) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.rate)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_tariff(&self, id: Uuid, payload: &TariffPayload) -> Result<Tariff, AppError> {
        sqlx::query_as::<_, Tariff>(
            "UPDATE tariffs SET name = $2, description = $3, rate = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.rate)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("tariff"))
    }

    pub async fn delete_tariff(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tariffs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "tariff")
    }

    // ---
    // Medidores
    // ---

    pub async fn list_meters(&self, org_unit_id: Option<Uuid>) -> Result<Vec<Meter>, AppError> {
        let meters = sqlx::query_as::<_, Meter>(
            r#"
            SELECT * FROM meters
            WHERE ($1::uuid IS NULL OR org_unit_id = $1)
            ORDER BY meter_number
            "#,
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(meters)
    }

    pub async fn get_meter(&self, id: Uuid) -> Result<Meter, AppError> {
        sqlx::query_as::<_, Meter>("SELECT * FROM meters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("meter"))
    }

    pub async fn create_meter(&self, payload: &MeterPayload, created_by: Uuid) -> Result<Meter, AppError> {
        sqlx::query_as::<_, Meter>(
            r#"
            INSERT INTO meters (org_unit_id, meter_number, transformer_capacity, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.org_unit_id)
        .bind(&payload.meter_number)
        .bind(payload.transformer_capacity)
        .bind(payload.status)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_meter(
        &self,
        id: Uuid,
        payload: &MeterPayload,
        updated_by: Uuid,
    ) -> Result<Meter, AppError> {
        sqlx::query_as::<_, Meter>(
            r#"
            UPDATE meters SET
                org_unit_id = $2, meter_number = $3, transformer_capacity = $4,
                status = $5, updated_by = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.org_unit_id)
        .bind(&payload.meter_number)
        .bind(payload.transformer_capacity)
        .bind(payload.status)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("meter"))
    }

    pub async fn delete_meter(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM meters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "meter")
    }

    // ---
    // Facturas
    // ---

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceView>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::uuid IS NULL OR s.org_unit_id = $1)
              AND ($2::uuid IS NULL OR i.substation_id = $2)
              AND ($3::tariff_code IS NULL OR i.tariff_type = $3)
              AND ($4::text IS NULL
                   OR ($4 = 'pdbt' AND i.tariff_type = 'PDBT')
                   OR ($4 = 'triple' AND i.tariff_type <> 'PDBT'))
              AND ($5::int IS NULL OR EXTRACT(YEAR FROM i.created_at)::int = $5)
            ORDER BY i.created_at DESC
            "#,
            INVOICE_VIEW_SELECT
        );
        let invoices = sqlx::query_as::<_, InvoiceView>(&sql)
            .bind(filter.org_unit_id)
            .bind(filter.substation_id)
            .bind(filter.tariff)
            .bind(group_slug(filter.group))
            .bind(filter.year)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceView, AppError> {
        let sql = format!("{} WHERE i.id = $1", INVOICE_VIEW_SELECT);
        sqlx::query_as::<_, InvoiceView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("invoice"))
    }

    /// Años (fecha de registro) con facturas, del más reciente al más antiguo.
    pub async fn invoice_years(&self, org_unit_id: Option<Uuid>) -> Result<Vec<i32>, AppError> {
        let years = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT DISTINCT EXTRACT(YEAR FROM i.created_at)::int AS year
            FROM invoices i
            JOIN substations s ON s.id = i.substation_id
            WHERE ($1::uuid IS NULL OR s.org_unit_id = $1)
            ORDER BY year DESC
            "#,
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }

    pub async fn create_invoice(&self, payload: &InvoicePayload, created_by: Uuid) -> Result<Invoice, AppError> {
        sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                tariff_type, substation_id, period_days, billing_period, consumption_kwh,
                energy_charge, max_demand_amount, dap, vat, total_due,
                max_demand, power_factor, load_factor, bt_amount, pf_amount,
                due_date, status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(payload.tariff_type)
        .bind(payload.substation_id)
        .bind(payload.period_days)
        .bind(&payload.billing_period)
        .bind(payload.consumption_kwh)
        .bind(payload.energy_charge)
        .bind(payload.max_demand_amount)
        .bind(payload.dap)
        .bind(payload.vat)
        .bind(payload.total_due)
        .bind(payload.max_demand)
        .bind(payload.power_factor)
        .bind(payload.load_factor)
        .bind(payload.bt_amount)
        .bind(payload.pf_amount)
        .bind(payload.due_date)
        .bind(payload.effective_status())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_invoice(
        &self,
        id: Uuid,
        payload: &InvoicePayload,
        updated_by: Uuid,
    ) -> Result<Invoice, AppError> {
        sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET
                tariff_type = $2, substation_id = $3, period_days = $4, billing_period = $5,
                consumption_kwh = $6, energy_charge = $7, max_demand_amount = $8, dap = $9,
                vat = $10, total_due = $11, max_demand = $12, power_factor = $13,
                load_factor = $14, bt_amount = $15, pf_amount = $16, due_date = $17,
                status = COALESCE($18, status), updated_by = $19, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.tariff_type)
        .bind(payload.substation_id)
        .bind(payload.period_days)
        .bind(&payload.billing_period)
        .bind(payload.consumption_kwh)
        .bind(payload.energy_charge)
        .bind(payload.max_demand_amount)
        .bind(payload.dap)
        .bind(payload.vat)
        .bind(payload.total_due)
        .bind(payload.max_demand)
        .bind(payload.power_factor)
        .bind(payload.load_factor)
        .bind(payload.bt_amount)
        .bind(payload.pf_amount)
        .bind(payload.due_date)
        .bind(payload.status)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("invoice"))
    }

    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "invoice")
    }
}
