// tests/periods.rs
//
// Reglas de periodos que dependen de la base de datos: nombres, solapes y estados.

mod common;

use std::sync::Arc;

use sqlx::PgPool;

use common::{date, insert_user};
use sigo_backend::{
    common::error::AppError,
    db::{PeriodRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        inventory::{PeriodPayload, PeriodStatus},
    },
    services::{mailer::LogMailer, period_service::PeriodService},
};

fn service(pool: &PgPool) -> PeriodService {
    PeriodService::new(
        PeriodRepository::new(pool.clone()),
        UserRepository::new(pool.clone()),
        Arc::new(LogMailer),
        pool.clone(),
    )
}

fn payload(starts_on: chrono::NaiveDate, ends_on: chrono::NaiveDate) -> PeriodPayload {
    PeriodPayload { starts_on, ends_on, notes: None }
}

async fn admin(pool: &PgPool) -> User {
    insert_user(pool, "admin@uni.mx", UserRole::Admin, None).await
}

#[sqlx::test]
async fn deleting_an_old_period_does_not_block_new_ones(pool: PgPool) {
    let periods = service(&pool);
    let admin = admin(&pool).await;

    let first = periods.create(&admin, &payload(date(2030, 1, 1), date(2030, 1, 31))).await.unwrap();
    let second = periods.create(&admin, &payload(date(2030, 2, 1), date(2030, 2, 28))).await.unwrap();
    assert_eq!(first.name, "PERIODO_001");
    assert_eq!(second.name, "PERIODO_002");

    periods.delete(first.id).await.unwrap();

    let third = periods.create(&admin, &payload(date(2030, 3, 1), date(2030, 3, 31))).await.unwrap();
    let fourth = periods.create(&admin, &payload(date(2030, 4, 1), date(2030, 4, 30))).await.unwrap();
    assert_eq!(third.name, "PERIODO_003");
    assert_eq!(fourth.name, "PERIODO_004");
}

#[sqlx::test]
async fn authorizer_is_the_admin_who_creates_the_period(pool: PgPool) {
    let admin = insert_user(&pool, "energia@uni.mx", UserRole::AdminEnergia, None).await;

    let period = service(&pool)
        .create(&admin, &payload(date(2030, 5, 1), date(2030, 5, 31)))
        .await
        .unwrap();

    assert_eq!(period.authorized_by.as_deref(), Some("Marta Ibarra"));
    assert_eq!(period.authorizer_role, Some(UserRole::AdminEnergia));
    assert_eq!(period.status, PeriodStatus::Pendiente);
    assert!(!period.active);
}

#[sqlx::test]
async fn overlapping_periods_are_rejected_but_boundaries_may_touch(pool: PgPool) {
    let periods = service(&pool);
    let admin = admin(&pool).await;

    periods.create(&admin, &payload(date(2031, 1, 1), date(2031, 1, 31))).await.unwrap();

    let inside = periods.create(&admin, &payload(date(2031, 1, 15), date(2031, 2, 15))).await;
    assert!(matches!(inside, Err(AppError::PeriodOverlap)));

    let covering = periods.create(&admin, &payload(date(2030, 12, 1), date(2031, 3, 1))).await;
    assert!(matches!(covering, Err(AppError::PeriodOverlap)));

    // Compartir solo el día frontera no es solape
    let touching = periods.create(&admin, &payload(date(2031, 1, 31), date(2031, 2, 28))).await;
    assert!(touching.is_ok());
}

#[sqlx::test]
async fn editing_a_period_only_checks_the_others(pool: PgPool) {
    let periods = service(&pool);
    let admin = admin(&pool).await;

    let january = periods.create(&admin, &payload(date(2032, 1, 1), date(2032, 1, 31))).await.unwrap();
    periods.create(&admin, &payload(date(2032, 3, 1), date(2032, 3, 31))).await.unwrap();

    let widened = periods
        .update(january.id, &payload(date(2032, 1, 1), date(2032, 2, 15)))
        .await
        .unwrap();
    assert_eq!(widened.ends_on, date(2032, 2, 15));
    assert_eq!(widened.name, january.name);

    let clash = periods.update(january.id, &payload(date(2032, 1, 1), date(2032, 3, 10))).await;
    assert!(matches!(clash, Err(AppError::PeriodOverlap)));
}

#[sqlx::test]
async fn statuses_follow_the_reference_date(pool: PgPool) {
    let repo = PeriodRepository::new(pool.clone());
    let admin = admin(&pool).await;
    let period = service(&pool)
        .create(&admin, &payload(date(2033, 6, 1), date(2033, 6, 30)))
        .await
        .unwrap();

    assert!(repo.find_active(date(2033, 6, 15)).await.unwrap().is_none());

    assert_eq!(repo.refresh_statuses(date(2033, 6, 15)).await.unwrap(), 1);
    let current = repo.get(period.id).await.unwrap();
    assert_eq!(current.status, PeriodStatus::Activo);
    assert!(current.active);
    assert_eq!(repo.find_active(date(2033, 6, 30)).await.unwrap().map(|p| p.id), Some(period.id));

    // Sin cambios: no se reescribe ninguna fila
    assert_eq!(repo.refresh_statuses(date(2033, 6, 20)).await.unwrap(), 0);

    repo.refresh_statuses(date(2033, 7, 1)).await.unwrap();
    let finished = repo.get(period.id).await.unwrap();
    assert_eq!(finished.status, PeriodStatus::Finalizado);
    assert!(!finished.active);
    assert!(repo.find_active(date(2033, 7, 1)).await.unwrap().is_none());
}
