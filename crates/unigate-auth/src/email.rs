//! OTP delivery — the notification gateway.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use unigate_core::error::{UnigateError, UnigateResult};

/// Notification gateway for one-time codes.
///
/// Failures surface as [`UnigateError::Delivery`] and fail the
/// enclosing operation; the core attempts no retry.
pub trait OtpSender: Send + Sync {
    fn send_otp(&self, email: &str, code: &str)
    -> impl Future<Output = UnigateResult<()>> + Send;
}

/// SMTP settings for the mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname (e.g., `smtp.example.edu`).
    pub relay: String,
    pub username: String,
    pub password: String,
    /// `From` address on outgoing mail.
    pub from: String,
}

/// SMTP-backed [`OtpSender`] using lettre's async transport.
pub struct SmtpOtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpOtpSender {
    pub fn new(config: &SmtpConfig) -> UnigateResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|e| UnigateError::Delivery(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

impl OtpSender for SmtpOtpSender {
    async fn send_otp(&self, email: &str, code: &str) -> UnigateResult<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| UnigateError::Delivery(format!("bad sender address: {e}")))?,
            )
            .to(email
                .parse()
                .map_err(|e| UnigateError::Delivery(format!("bad recipient address: {e}")))?)
            .subject("Your one-time verification code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your one-time verification code is: {code}\n\n\
                 If you did not request this code, you can ignore this message.\n"
            ))
            .map_err(|e| UnigateError::Delivery(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| UnigateError::Delivery(e.to_string()))?;

        Ok(())
    }
}
