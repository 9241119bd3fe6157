// src/services/environmental_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EnvironmentalRepository,
    models::{
        auth::User,
        environmental::{EnvironmentalKind, EnvironmentalPayload, EnvironmentalRecord, EnvironmentalRecordView},
    },
};

/// El tipo de la URL y el `kind` del cuerpo deben coincidir.
fn ensure_kind(kind: EnvironmentalKind, payload: &EnvironmentalPayload) -> Result<(), AppError> {
    if payload.details.kind() == kind {
        Ok(())
    } else {
        Err(AppError::InvalidKind(payload.details.kind().slug().to_string()))
    }
}

#[derive(Clone)]
pub struct EnvironmentalService {
    repo: EnvironmentalRepository,
}

impl EnvironmentalService {
    pub fn new(repo: EnvironmentalRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        kind: EnvironmentalKind,
        org_unit_id: Option<Uuid>,
    ) -> Result<Vec<EnvironmentalRecordView>, AppError> {
        self.repo.list(kind, org_unit_id).await
    }

    pub async fn get(&self, kind: EnvironmentalKind, id: Uuid) -> Result<EnvironmentalRecord, AppError> {
        self.repo.get(kind, id).await
    }

    pub async fn create(
        &self,
        actor: &User,
        kind: EnvironmentalKind,
        payload: &EnvironmentalPayload,
    ) -> Result<EnvironmentalRecord, AppError> {
        ensure_kind(kind, payload)?;
        let record = self.repo.create(payload, actor.id).await?;
        tracing::info!("🌱 Registro ambiental {} creado ({})", record.id, kind.slug());
        Ok(record)
    }

    pub async fn update(
        &self,
        actor: &User,
        kind: EnvironmentalKind,
        id: Uuid,
        payload: &EnvironmentalPayload,
    ) -> Result<EnvironmentalRecord, AppError> {
        ensure_kind(kind, payload)?;
        self.repo.update(id, payload, actor.id).await
    }

    pub async fn delete(&self, kind: EnvironmentalKind, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_kind_must_match_path_kind() {
        let payload: EnvironmentalPayload = serde_json::from_value(serde_json::json!({
            "orgUnitId": Uuid::new_v4(),
            "details": { "kind": "VERTEDERO_MUNICIPAL" }
        }))
        .unwrap();

        assert!(ensure_kind(payload.details.kind(), &payload).is_ok());
        let other = EnvironmentalKind::ALL
            .into_iter()
            .find(|k| *k != payload.details.kind())
            .unwrap();
        assert!(matches!(ensure_kind(other, &payload), Err(AppError::InvalidKind(_))));
    }
}
