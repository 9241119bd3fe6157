// src/services/energy_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EnergyRepository,
    models::{
        auth::User,
        energy::{
            Invoice, InvoiceFilter, InvoicePayload, InvoiceView, Meter, MeterPayload, Substation, SubstationPayload,
            Tariff, TariffPayload,
        },
        organization::LookupOption,
    },
};

/// Reglas de captura de una factura frente a su subestación:
/// la subestación pertenece a la UR, la tarifa es del mismo grupo
/// y las facturas triples traen todas sus columnas.
fn check_invoice(payload: &InvoicePayload, substation: &Substation, org_unit_id: Uuid) -> Result<(), AppError> {
    if substation.org_unit_id != org_unit_id {
        return Err(AppError::SubstationNotInUnit);
    }
    if substation.tariff.group() != payload.tariff_type.group() {
        return Err(AppError::TariffMismatch);
    }
    let missing = payload.missing_triple_fields();
    if !missing.is_empty() {
        return Err(AppError::MissingTripleFields(missing.join(", ")));
    }
    Ok(())
}

#[derive(Clone)]
pub struct EnergyService {
    repo: EnergyRepository,
}

impl EnergyService {
    pub fn new(repo: EnergyRepository) -> Self {
        Self { repo }
    }

    // ---
    // Subestaciones
    // ---

    pub async fn list_substations(&self, actor: &User, org_unit_id: Option<Uuid>) -> Result<Vec<Substation>, AppError> {
        let unit = actor.scope()?.or(org_unit_id);
        self.repo.list_substations(unit).await
    }

    pub async fn get_substation(&self, actor: &User, id: Uuid) -> Result<Substation, AppError> {
        let substation = self.repo.get_substation(id).await?;
        match actor.scope()? {
            Some(unit) if unit != substation.org_unit_id => Err(AppError::NotFound("substation")),
            _ => Ok(substation),
        }
    }

    pub async fn substation_options(&self, org_unit_id: Uuid) -> Result<Vec<LookupOption>, AppError> {
        let substations = self.repo.list_substations(Some(org_unit_id)).await?;
        Ok(substations
            .iter()
            .map(|s| LookupOption { id: s.id, label: s.lookup_label() })
            .collect())
    }

    pub async fn create_substation(&self, actor: &User, payload: &SubstationPayload) -> Result<Substation, AppError> {
        let unit = actor.resolve_org_unit(payload.org_unit_id)?;
        let substation = self.repo.create_substation(unit, payload).await?;
        tracing::info!("⚡ Subestación {} registrada", substation.service_number);
        Ok(substation)
    }

    pub async fn update_substation(
        &self,
        actor: &User,
        id: Uuid,
        payload: &SubstationPayload,
    ) -> Result<Substation, AppError> {
        let scope = actor.scope()?;
        let unit = actor.resolve_org_unit(payload.org_unit_id)?;
        self.repo.update_substation(id, scope, unit, payload).await
    }

    pub async fn delete_substation(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_substation(id, actor.scope()?).await
    }

    // ---
    // Catálogo de tarifas
    // ---

    pub async fn list_tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        self.repo.list_tariffs().await
    }

    pub async fn get_tariff(&self, id: Uuid) -> Result<Tariff, AppError> {
        self.repo.get_tariff(id).await
    }

    pub async fn create_tariff(&self, payload: &TariffPayload) -> Result<Tariff, AppError> {
        self.repo.create_tariff(payload).await
    }

    pub async fn update_tariff(&self, id: Uuid, payload: &TariffPayload) -> Result<Tariff, AppError> {
        self.repo.update_tariff(id, payload).await
    }

    pub async fn delete_tariff(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_tariff(id).await
    }

    // ---
    // Medidores
    // ---

    pub async fn list_meters(&self, org_unit_id: Option<Uuid>) -> Result<Vec<Meter>, AppError> {
        self.repo.list_meters(org_unit_id).await
    }

    pub async fn get_meter(&self, id: Uuid) -> Result<Meter, AppError> {
        self.repo.get_meter(id).await
    }

    pub async fn create_meter(&self, actor: &User, payload: &MeterPayload) -> Result<Meter, AppError> {
        self.repo.create_meter(payload, actor.id).await
    }

    pub async fn update_meter(&self, actor: &User, id: Uuid, payload: &MeterPayload) -> Result<Meter, AppError> {
        self.repo.update_meter(id, payload, actor.id).await
    }

    pub async fn delete_meter(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_meter(id).await
    }

    // ---
    // Facturas
    // ---

    pub async fn list_invoices(&self, actor: &User, filter: InvoiceFilter) -> Result<Vec<InvoiceView>, AppError> {
        let filter = InvoiceFilter {
            org_unit_id: actor.scope()?.or(filter.org_unit_id),
            ..filter
        };
        self.repo.list_invoices(&filter).await
    }

    pub async fn invoice_years(&self, actor: &User) -> Result<Vec<i32>, AppError> {
        self.repo.invoice_years(actor.scope()?).await
    }

    pub async fn get_invoice(&self, actor: &User, id: Uuid) -> Result<InvoiceView, AppError> {
        let invoice = self.repo.get_invoice(id).await?;
        match actor.scope()? {
            Some(unit) if unit != invoice.org_unit_id => Err(AppError::NotFound("invoice")),
            _ => Ok(invoice),
        }
    }

    pub async fn create_invoice(&self, actor: &User, payload: InvoicePayload) -> Result<Invoice, AppError> {
        let unit = actor.resolve_org_unit(payload.org_unit_id)?;
        let substation = self.repo.get_substation(payload.substation_id).await?;
        check_invoice(&payload, &substation, unit)?;

        let payload = payload.strip_triple_fields();
        let invoice = self.repo.create_invoice(&payload, actor.id).await?;
        tracing::info!(
            "🧾 Factura {} registrada ({}, servicio {})",
            invoice.id,
            invoice.tariff_type.as_str(),
            substation.service_number
        );
        Ok(invoice)
    }

    pub async fn update_invoice(&self, actor: &User, id: Uuid, payload: InvoicePayload) -> Result<Invoice, AppError> {
        // Comprueba existencia y alcance antes de validar la captura
        let current = self.get_invoice(actor, id).await?;
        let unit = if actor.role.is_admin() {
            payload.org_unit_id.unwrap_or(current.org_unit_id)
        } else {
            actor.require_org_unit()?
        };

        let substation = self.repo.get_substation(payload.substation_id).await?;
        check_invoice(&payload, &substation, unit)?;

        let payload = payload.strip_triple_fields();
        self.repo.update_invoice(id, &payload, actor.id).await
    }

    pub async fn delete_invoice(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        self.get_invoice(actor, id).await?;
        self.repo.delete_invoice(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::energy::TariffCode;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn substation(org_unit_id: Uuid, tariff: TariffCode) -> Substation {
        Substation {
            id: Uuid::new_v4(),
            org_unit_id,
            service_number: 987654,
            meter_number: "M-77".into(),
            tariff,
            multiplier: Decimal::ONE,
            created_at: Utc::now(),
        }
    }

    fn payload(tariff: TariffCode, substation_id: Uuid) -> InvoicePayload {
        InvoicePayload {
            tariff_type: tariff,
            substation_id,
            org_unit_id: None,
            period_days: 30,
            billing_period: "01/02/2025 - 28/02/2025".into(),
            consumption_kwh: Decimal::new(150000, 2),
            energy_charge: Decimal::new(320000, 2),
            max_demand_amount: Decimal::ZERO,
            dap: Decimal::new(9000, 2),
            vat: Decimal::new(51200, 2),
            total_due: Decimal::new(380200, 2),
            max_demand: Some(120),
            power_factor: Some(Decimal::new(92, 2)),
            load_factor: Some(65),
            bt_amount: Some(Decimal::new(10000, 2)),
            pf_amount: Some(Decimal::new(2500, 2)),
            due_date: None,
            status: None,
        }
    }

    #[test]
    fn substation_must_belong_to_the_unit() {
        let unit = Uuid::new_v4();
        let s = substation(Uuid::new_v4(), TariffCode::Pdbt);
        let result = check_invoice(&payload(TariffCode::Pdbt, s.id), &s, unit);
        assert!(matches!(result, Err(AppError::SubstationNotInUnit)));
    }

    #[test]
    fn tariff_group_must_match_substation() {
        let unit = Uuid::new_v4();
        let s = substation(unit, TariffCode::Gdmth);
        assert!(matches!(
            check_invoice(&payload(TariffCode::Pdbt, s.id), &s, unit),
            Err(AppError::TariffMismatch)
        ));
        // Dentro del grupo triple cualquier código es válido
        assert!(check_invoice(&payload(TariffCode::Gdbt, s.id), &s, unit).is_ok());
    }

    #[test]
    fn triple_invoice_lists_missing_columns() {
        let unit = Uuid::new_v4();
        let s = substation(unit, TariffCode::Gdmto);
        let mut p = payload(TariffCode::Gdmto, s.id);
        p.load_factor = None;
        p.pf_amount = None;
        match check_invoice(&p, &s, unit) {
            Err(AppError::MissingTripleFields(fields)) => assert_eq!(fields, "loadFactor, pfAmount"),
            other => panic!("resultado inesperado: {:?}", other),
        }
    }
}
