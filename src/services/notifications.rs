// src/services/notifications.rs

use chrono::{DateTime, Utc};

use crate::{
    models::inventory::InventoryPeriod,
    services::mailer::Email,
};

// Plantillas de los correos del portal

pub fn account_created(to: &str, name: &str, temporary_password: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Acceso al sistema SIGO".to_string(),
        body: format!(
            "Hola {},\n\n\
             Se ha creado tu cuenta en el Sistema de Gestión.\n\n\
             Usuario: {}\n\
             Contraseña temporal: {}\n\n\
             Te recomendamos cambiarla al iniciar sesión.",
            name, to, temporary_password
        ),
    }
}

pub fn account_locked(to: &str, name: &str, until: DateTime<Utc>) -> Email {
    Email {
        to: to.to_string(),
        subject: "Cuenta bloqueada temporalmente".to_string(),
        body: format!(
            "Hola {},\n\n\
             Tu cuenta fue bloqueada por múltiples intentos fallidos de inicio de sesión.\n\
             Podrás intentarlo nuevamente después de {}.\n\n\
             Si no fuiste tú, restablece tu contraseña.",
            name,
            until.format("%d/%m/%Y %H:%M UTC")
        ),
    }
}

pub fn verification_code(to: &str, name: &str, code: &str, minutes: i64) -> Email {
    Email {
        to: to.to_string(),
        subject: "Código de verificación".to_string(),
        body: format!(
            "Hola {},\n\n\
             Tu código de verificación es: {}\n\n\
             El código expira en {} minutos. Si no solicitaste este cambio, ignora este mensaje.",
            name, code, minutes
        ),
    }
}

pub fn period_opened(to: &str, name: &str, period: &InventoryPeriod) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("Nuevo periodo de inventario: {}", period.name),
        body: format!(
            "Hola {},\n\n\
             Se ha registrado el periodo de inventario {}.\n\
             Inicio: {}\n\
             Fin: {}\n\n\
             Durante este periodo podrás capturar los inventarios de tu Unidad Responsable.",
            name,
            period.name,
            period.starts_on.format("%d/%m/%Y"),
            period.ends_on.format("%d/%m/%Y")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::PeriodStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn credentials_email_contains_password() {
        let email = account_created("ana@uni.mx", "Ana", "Xy7pQ2");
        assert_eq!(email.to, "ana@uni.mx");
        assert!(email.body.contains("Xy7pQ2"));
    }

    #[test]
    fn code_email_states_expiry() {
        let email = verification_code("ana@uni.mx", "Ana", "042137", 10);
        assert!(email.body.contains("042137"));
        assert!(email.body.contains("10 minutos"));
    }

    #[test]
    fn period_email_formats_dates() {
        let period = InventoryPeriod {
            id: Uuid::new_v4(),
            name: "PERIODO_003".into(),
            starts_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            status: PeriodStatus::Pendiente,
            notes: None,
            authorized_by: None,
            authorizer_role: None,
            active: false,
            created_at: Utc::now(),
        };
        let email = period_opened("luis@uni.mx", "Luis", &period);
        assert!(email.subject.contains("PERIODO_003"));
        assert!(email.body.contains("01/06/2025"));
        assert!(email.body.contains("30/06/2025"));
    }
}
