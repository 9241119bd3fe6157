// tests/repositories.rs
//
// Filtros por UR y consumo de códigos contra Postgres real.

mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use common::{insert_org_unit, insert_substation, insert_user};
use sigo_backend::{
    common::error::AppError,
    db::{EnergyRepository, UserRepository},
    models::{
        auth::UserRole,
        energy::{InvoiceFilter, SubstationPayload, TariffCode},
    },
};

async fn insert_invoice(pool: &PgPool, substation_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO invoices (
            tariff_type, substation_id, period_days, billing_period, consumption_kwh,
            energy_charge, max_demand_amount, dap, vat, total_due, status
        )
        VALUES ('PDBT', $1, 30, 'ENE-2030', 1200, 3000, 0, 150, 480, 3630, 'NO_PAGADA')
        RETURNING id
        "#,
    )
    .bind(substation_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn substation_payload(meter_number: &str) -> SubstationPayload {
    SubstationPayload {
        org_unit_id: None,
        service_number: 555,
        meter_number: meter_number.to_string(),
        tariff: TariffCode::Gdmth,
        multiplier: Decimal::new(40, 0),
    }
}

#[sqlx::test]
async fn substations_are_scoped_to_their_unit(pool: PgPool) {
    let repo = EnergyRepository::new(pool.clone());
    let north = insert_org_unit(&pool, "Facultad Norte").await;
    let south = insert_org_unit(&pool, "Facultad Sur").await;
    let north_sub = insert_substation(&pool, north, 1001).await;
    insert_substation(&pool, south, 2001).await;

    let scoped = repo.list_substations(Some(north)).await.unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].id, north_sub);

    assert_eq!(repo.list_substations(None).await.unwrap().len(), 2);

    // Un encargado de otra UR no alcanza el registro
    let foreign = repo
        .update_substation(north_sub, Some(south), south, &substation_payload("M-X"))
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound("substation"))));
    let foreign_delete = repo.delete_substation(north_sub, Some(south)).await;
    assert!(matches!(foreign_delete, Err(AppError::NotFound("substation"))));

    let own = repo
        .update_substation(north_sub, Some(north), north, &substation_payload("M-N2"))
        .await
        .unwrap();
    assert_eq!(own.meter_number, "M-N2");
    assert_eq!(own.tariff, TariffCode::Gdmth);

    repo.delete_substation(north_sub, None).await.unwrap();
    assert!(repo.list_substations(Some(north)).await.unwrap().is_empty());
}

#[sqlx::test]
async fn invoices_filter_by_unit_of_their_substation(pool: PgPool) {
    let repo = EnergyRepository::new(pool.clone());
    let north = insert_org_unit(&pool, "Facultad Norte").await;
    let south = insert_org_unit(&pool, "Facultad Sur").await;
    let north_invoice = insert_invoice(&pool, insert_substation(&pool, north, 1001).await).await;
    insert_invoice(&pool, insert_substation(&pool, south, 2001).await).await;

    let filter = InvoiceFilter { org_unit_id: Some(north), ..Default::default() };
    let scoped = repo.list_invoices(&filter).await.unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].invoice.id, north_invoice);
    assert_eq!(scoped[0].org_unit_name, "Facultad Norte");

    assert_eq!(repo.list_invoices(&InvoiceFilter::default()).await.unwrap().len(), 2);

    let triple = InvoiceFilter { tariff: Some(TariffCode::Gdmth), ..Default::default() };
    assert!(repo.list_invoices(&triple).await.unwrap().is_empty());
}

#[sqlx::test]
async fn substation_with_invoices_cannot_be_deleted(pool: PgPool) {
    let repo = EnergyRepository::new(pool.clone());
    let unit = insert_org_unit(&pool, "Rectoría").await;
    let substation = insert_substation(&pool, unit, 3001).await;
    insert_invoice(&pool, substation).await;

    let result = repo.delete_substation(substation, None).await;
    assert!(matches!(result, Err(AppError::RecordInUse)));
}

#[sqlx::test]
async fn reset_code_is_consumed_once(pool: PgPool) {
    let repo = UserRepository::new(pool.clone());
    let user = insert_user(&pool, "capturista@uni.mx", UserRole::Capturista, None).await;
    let now = Utc::now();
    let code = repo.insert_code(user.id, "481516", now + Duration::minutes(15)).await.unwrap();

    repo.mark_code_used(&pool, code.id).await.unwrap();

    let second = repo.mark_code_used(&pool, code.id).await;
    assert!(matches!(second, Err(AppError::InvalidResetCode)));
    assert!(repo.find_valid_code(user.id, "481516", now).await.unwrap().is_none());
}
