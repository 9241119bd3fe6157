// tests/common/mod.rs
//
// Datos mínimos para las pruebas que corren contra Postgres (`#[sqlx::test]`).
#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use sigo_backend::{
    db::UserRepository,
    models::auth::{User, UserRole},
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn insert_org_unit(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO org_units (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_user(pool: &PgPool, email: &str, role: UserRole, org_unit_id: Option<Uuid>) -> User {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (first_names, last_names, email, org_unit_id, role, password_hash)
        VALUES ('Marta', 'Ibarra', $1, $2, $3, 'sin-hash')
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(org_unit_id)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    UserRepository::new(pool.clone()).find_by_id(id).await.unwrap().unwrap()
}

pub async fn insert_substation(pool: &PgPool, org_unit_id: Uuid, service_number: i64) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO substations (org_unit_id, service_number, meter_number, tariff, multiplier)
        VALUES ($1, $2, $3, 'PDBT', 1)
        RETURNING id
        "#,
    )
    .bind(org_unit_id)
    .bind(service_number)
    .bind(format!("M-{}", service_number))
    .fetch_one(pool)
    .await
    .unwrap()
}
