// src/services/period_service.rs

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::Recipient, PeriodRepository, UserRepository},
    models::{
        auth::User,
        inventory::{period_name, InventoryPeriod, PeriodPayload, PeriodStatus},
    },
    services::{mailer::Mailer, notifications},
};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn ensure_valid_range(payload: &PeriodPayload) -> Result<(), AppError> {
    if payload.starts_on < payload.ends_on {
        Ok(())
    } else {
        Err(AppError::InvalidPeriodRange)
    }
}

/// Avisa del nuevo periodo a cada destinatario; devuelve cuántos correos salieron.
/// Un fallo individual se registra y no interrumpe el resto.
pub(crate) async fn notify_recipients(
    mailer: &dyn Mailer,
    recipients: &[Recipient],
    period: &InventoryPeriod,
) -> usize {
    let mut sent = 0;
    for recipient in recipients {
        let email = notifications::period_opened(&recipient.email, &recipient.first_names, period);
        match mailer.send(email).await {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!("No se pudo avisar del periodo {} a {}: {}", period.name, recipient.email, e),
        }
    }
    sent
}

#[derive(Clone)]
pub struct PeriodService {
    period_repo: PeriodRepository,
    user_repo: UserRepository,
    mailer: Arc<dyn Mailer>,
    pool: PgPool,
}

impl PeriodService {
    pub fn new(period_repo: PeriodRepository, user_repo: UserRepository, mailer: Arc<dyn Mailer>, pool: PgPool) -> Self {
        Self { period_repo, user_repo, mailer, pool }
    }

    /// Listado con estados recalculados a la fecha de hoy.
    pub async fn list(&self) -> Result<Vec<InventoryPeriod>, AppError> {
        let updated = self.period_repo.refresh_statuses(today()).await?;
        if updated > 0 {
            tracing::info!("📅 {} periodos cambiaron de estado", updated);
        }
        self.period_repo.list().await
    }

    pub async fn latest(&self, limit: i64) -> Result<Vec<InventoryPeriod>, AppError> {
        self.period_repo.refresh_statuses(today()).await?;
        self.period_repo.latest(limit).await
    }

    pub async fn get(&self, id: Uuid) -> Result<InventoryPeriod, AppError> {
        self.period_repo.get(id).await
    }

    pub async fn active_period(&self) -> Result<Option<InventoryPeriod>, AppError> {
        let today = today();
        self.period_repo.refresh_statuses(today).await?;
        self.period_repo.find_active(today).await
    }

    /// Alta de periodo; `actor` queda registrado como quien lo autoriza.
    pub async fn create(&self, actor: &User, payload: &PeriodPayload) -> Result<InventoryPeriod, AppError> {
        ensure_valid_range(payload)?;

        let mut tx = self.pool.begin().await?;
        self.period_repo.lock_for_write(&mut *tx).await?;

        if self.period_repo.overlaps(&mut *tx, payload.starts_on, payload.ends_on, None).await? {
            return Err(AppError::PeriodOverlap);
        }

        let sequence = self.period_repo.next_sequence(&mut *tx).await?;
        let status = PeriodStatus::on(payload.starts_on, payload.ends_on, today());
        let period = self
            .period_repo
            .create(&mut *tx, &period_name(sequence), payload, status, actor)
            .await?;
        tx.commit().await?;

        tracing::info!("📅 Periodo {} creado ({} a {})", period.name, period.starts_on, period.ends_on);

        let recipients = self.user_repo.list_period_recipients().await?;
        let sent = notify_recipients(self.mailer.as_ref(), &recipients, &period).await;
        tracing::info!("📧 Aviso de {} enviado a {}/{} usuarios", period.name, sent, recipients.len());

        Ok(period)
    }

    pub async fn update(&self, id: Uuid, payload: &PeriodPayload) -> Result<InventoryPeriod, AppError> {
        ensure_valid_range(payload)?;

        let mut tx = self.pool.begin().await?;
        self.period_repo.lock_for_write(&mut *tx).await?;

        if self
            .period_repo
            .overlaps(&mut *tx, payload.starts_on, payload.ends_on, Some(id))
            .await?
        {
            return Err(AppError::PeriodOverlap);
        }

        let status = PeriodStatus::on(payload.starts_on, payload.ends_on, today());
        let period = self.period_repo.update(&mut *tx, id, payload, status).await?;
        tx.commit().await?;

        Ok(period)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.period_repo.has_inventories(id).await? {
            tracing::warn!("Periodo {} con inventarios; no se elimina", id);
            return Err(AppError::RecordInUse);
        }
        self.period_repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::MockMailer;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period() -> InventoryPeriod {
        InventoryPeriod {
            id: Uuid::new_v4(),
            name: "PERIODO_002".into(),
            starts_on: date(2025, 8, 1),
            ends_on: date(2025, 8, 31),
            status: PeriodStatus::Pendiente,
            notes: None,
            authorized_by: Some("Dra. Ruiz".into()),
            authorizer_role: None,
            active: false,
            created_at: Utc::now(),
        }
    }

    fn recipient(email: &str) -> Recipient {
        Recipient { email: email.into(), first_names: "Ana".into() }
    }

    #[test]
    fn start_must_precede_end() {
        let mut payload = PeriodPayload {
            starts_on: date(2025, 8, 1),
            ends_on: date(2025, 8, 31),
            notes: None,
        };
        assert!(ensure_valid_range(&payload).is_ok());

        payload.ends_on = payload.starts_on;
        assert!(matches!(ensure_valid_range(&payload), Err(AppError::InvalidPeriodRange)));
    }

    #[tokio::test]
    async fn every_recipient_gets_the_notice() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.subject.contains("PERIODO_002"))
            .times(2)
            .returning(|_| Ok(()));

        let recipients = vec![recipient("a@uni.mx"), recipient("b@uni.mx")];
        let sent = notify_recipients(&mailer, &recipients, &period()).await;
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_the_rest() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.to == "roto@uni.mx")
            .times(1)
            .returning(|_| Err(AppError::MailError("buzón inexistente".into())));
        mailer
            .expect_send()
            .withf(|email| email.to != "roto@uni.mx")
            .times(2)
            .returning(|_| Ok(()));

        let recipients = vec![recipient("a@uni.mx"), recipient("roto@uni.mx"), recipient("c@uni.mx")];
        let sent = notify_recipients(&mailer, &recipients, &period()).await;
        assert_eq!(sent, 2);
    }
}
