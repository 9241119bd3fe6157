// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Traducción de violaciones de restricciones de Postgres
// ---

/// Errores de INSERT/UPDATE: unicidad → 409, FK inexistente → 400.
pub(crate) fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        if db_err.is_unique_violation() {
            return match constraint.as_str() {
                "users_email_key" => AppError::EmailAlreadyExists,
                "users_enrollment_key" => AppError::EnrollmentAlreadyExists,
                _ => AppError::UniqueConstraintViolation(constraint),
            };
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference(constraint);
        }
        if db_err.is_check_violation() && constraint == "inventory_periods_range_check" {
            return AppError::InvalidPeriodRange;
        }
    }
    e.into()
}

/// Errores de DELETE: un padre referenciado (ON DELETE RESTRICT) → 409.
pub(crate) fn map_delete_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            tracing::warn!("Borrado rechazado por referencia: {:?}", db_err.constraint());
            return AppError::RecordInUse;
        }
    }
    e.into()
}

/// Convierte `rows_affected == 0` en 404 para el recurso indicado.
pub(crate) fn ensure_affected(rows: u64, resource: &'static str) -> Result<(), AppError> {
    if rows == 0 {
        return Err(AppError::NotFound(resource));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_is_not_found() {
        assert!(matches!(ensure_affected(0, "campus"), Err(AppError::NotFound("campus"))));
        assert!(ensure_affected(1, "campus").is_ok());
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
        let err = map_delete_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::PoolTimedOut)));
    }
}
