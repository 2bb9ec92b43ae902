//! Email verification codes
//!
//! Sends a six-digit code in an HTML email over authenticated SMTP and hands
//! the code back to the caller.

use std::fmt;

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rand::Rng;

use crate::backend::notify::dispatcher::DispatchError;
use crate::backend::server::config::SmtpSettings;

pub const CODE_SUBJECT: &str = "Verify Your Email";
pub const CODE_EXPIRY_MINUTES: u32 = 10;

#[derive(Clone)]
pub struct EmailCodeSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

// the transport holds SMTP credentials, keep them out of logs
impl fmt::Debug for EmailCodeSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailCodeSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl EmailCodeSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DispatchError> {
        let from_address = settings.from.as_deref().unwrap_or(&settings.username);
        let from = parse_mailbox(from_address)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| DispatchError::Email(e.to_string()))?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    /// Email a fresh code to `to` and return it
    pub async fn send_code(&self, to: &str) -> Result<String, DispatchError> {
        let recipient = parse_mailbox(to)?;
        let code = generate_code();

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(CODE_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_code_email(&code))
            .map_err(|e| DispatchError::Email(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!("[Email] Failed to send code to {}: {}", to, e);
            DispatchError::Email(e.to_string())
        })?;

        tracing::info!("[Email] Verification code sent to {}", to);
        Ok(code)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DispatchError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Six-digit code without a leading zero
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub fn render_code_email(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; margin: 0; padding: 0;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <div style="background: linear-gradient(to right, #4ade80, #3b82f6); color: white; padding: 20px; text-align: center; border-radius: 10px 10px 0 0;">
        <h1>Chatwire</h1>
      </div>
      <div style="background: white; padding: 30px; border-radius: 0 0 10px 10px;">
        <h2>Verify Your Email</h2>
        <p>Please use the following code to verify your email address:</p>
        <div style="font-size: 32px; font-weight: bold; color: #4ade80; text-align: center; letter-spacing: 8px; margin: 20px 0;">{code}</div>
        <p>This code will expire in {minutes} minutes.</p>
        <p>If you didn't request this verification, please ignore this email.</p>
      </div>
      <div style="text-align: center; margin-top: 20px; color: #666; font-size: 12px;">
        <p>This is an automated message, please do not reply.</p>
      </div>
    </div>
  </body>
</html>
"#,
        code = code,
        minutes = CODE_EXPIRY_MINUTES,
    )
}
