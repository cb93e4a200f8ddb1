//! Email service for sending transactional emails.
//!
//! Uses `lettre` for SMTP transport.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    /// Sends a welcome email to a newly created user.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_welcome_email(
        &self,
        to_email: &str,
        to_name: &str,
        username: &str,
    ) -> Result<(), EmailError> {
        let subject = "Welcome to SDX Project Manager";
        let body = format!(
            r"Hi {to_name},

An account has been created for you in SDX Project Manager.

Your username is: {username}

You can change your password from your profile page after logging in.

Best regards,
The SDX Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Sends a temporary password after an administrative reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        temporary_password: &str,
    ) -> Result<(), EmailError> {
        let subject = "Your password has been reset - SDX Project Manager";
        let body = format!(
            r"Hi {to_name},

Your password was reset by an administrator. Your temporary password is:

{temporary_password}

Please log in and change it as soon as possible.

If you did not request this reset, contact your administrator.

Best regards,
The SDX Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.config.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_recipient_is_rejected_before_send() {
        let service = EmailService::new(EmailConfig::default());

        let result = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(service.send_welcome_email("not an address", "Test", "test"));

        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
