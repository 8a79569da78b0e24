//! Transactional email via SMTP (lettre).
//!
//! When SMTP is not configured the service runs in log-only mode: every
//! send is traced instead of delivered. Callers treat delivery as
//! best-effort; an order is never rolled back because its confirmation
//! email bounced.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use sundry_core::{Email, TokenPurpose};

use crate::config::EmailConfig;
use crate::models::order::OrderView;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for transactional messages.
#[derive(Clone)]
pub struct EmailService {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer: Some(mailer),
            from_address: config.from_address.clone(),
        })
    }

    /// Create a log-only service for environments without SMTP.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            from_address: "noreply@localhost".to_owned(),
        }
    }

    /// Send a one-time verification code.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_otp_code(
        &self,
        to: &Email,
        code: &str,
        purpose: TokenPurpose,
    ) -> Result<(), EmailError> {
        let (subject, intro) = match purpose {
            TokenPurpose::EmailVerify => {
                ("Your Sundry verification code", "Confirm your email address")
            }
            TokenPurpose::PasswordReset => {
                ("Your Sundry password reset code", "Reset your password")
            }
        };

        let body = format!(
            "{intro} by entering this code:\n\n    {code}\n\n\
             The code expires in 15 minutes. If you didn't request it, you can ignore this email.\n"
        );

        self.send(to, subject, body).await
    }

    /// Send an order confirmation.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_order_confirmation(
        &self,
        to: &Email,
        order: &OrderView,
    ) -> Result<(), EmailError> {
        let mut body = format!(
            "Thanks for your order!\n\nOrder {}\n\n",
            order.order.order_number
        );
        for item in &order.items {
            body.push_str(&format!(
                "  {} x{} @ {}\n",
                item.product_name, item.quantity, item.unit_price
            ));
        }
        body.push_str(&format!("\nTotal: {}\n", order.order.total_amount));
        body.push_str(&format!(
            "\nShipping to:\n  {}\n  {}\n  {} {}\n  {}\n",
            order.order.shipping.recipient,
            order.order.shipping.line1,
            order.order.shipping.city,
            order.order.shipping.postal_code,
            order.order.shipping.country,
        ));

        let subject = format!("Order confirmation {}", order.order.order_number);
        self.send(to, &subject, body).await
    }

    async fn send(&self, to: &Email, subject: &str, body: String) -> Result<(), EmailError> {
        let Some(mailer) = &self.mailer else {
            tracing::info!(to = %to, subject = %subject, "Email delivery disabled, logging only");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        mailer.send(message).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}
