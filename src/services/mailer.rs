// src/services/mailer.rs

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Envío de correos. `AppState` guarda un `Arc<dyn Mailer>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), AppError>;
}

// ---
// SMTP (STARTTLS)
// ---

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, user: &str, password: &str, from: &str) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::MailError(e.to_string()))?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| AppError::MailError(format!("Remitente inválido '{}': {}", from, e)))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::MailError(format!("Destinatario inválido '{}': {}", email.to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| AppError::MailError(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::MailError(e.to_string()))?;

        tracing::info!("📧 Correo enviado a {}", email.to);
        Ok(())
    }
}

// ---
// Sin SMTP configurado: el correo solo se registra en el log
// ---

#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "📧 SMTP no configurado; correo no enviado:\n{}",
            email.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let mailer = LogMailer;
        let result = mailer
            .send(Email {
                to: "ana@uni.mx".into(),
                subject: "Prueba".into(),
                body: "Hola".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn smtp_mailer_rejects_invalid_sender() {
        let result = SmtpMailer::new("smtp.example.com", "user", "secret", "no es un correo");
        assert!(matches!(result, Err(AppError::MailError(_))));
    }
}
