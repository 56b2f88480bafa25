//! OTP delivery.
//!
//! Handlers build an [`EmailMessage`] and hand it to an [`EmailSender`]. The
//! production sender talks SMTP with STARTTLS to a single relay; local
//! development without credentials uses [`LogEmailSender`], which only logs.
//! Delivery is attempted once: a failure surfaces to the caller, which aborts
//! the request before anything is persisted.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    #[must_use]
    pub fn signup_otp(to_email: &str, otp: &str) -> Self {
        Self::otp(to_email, "Signup OTP", otp)
    }

    #[must_use]
    pub fn resend_otp(to_email: &str, otp: &str) -> Self {
        Self::otp(to_email, "Resend OTP", otp)
    }

    fn otp(to_email: &str, subject: &str, otp: &str) -> Self {
        Self {
            to_email: to_email.to_string(),
            subject: subject.to_string(),
            body: format!("Your OTP is {otp}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("missing recipient address")]
    MissingRecipient,

    #[error("invalid email address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Other(String),
}

/// Email delivery abstraction used by the signup and resend handlers.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message, or return an error so the caller can abort.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if message.to_email.is_empty() {
            return Err(EmailError::MissingRecipient);
        }

        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    from: String,
}

impl SmtpConfig {
    /// Relay defaults to `smtp.gmail.com:587`; the sender address defaults to
    /// the login username.
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            from: username.clone(),
            username,
            password,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: String) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }
}

/// Sends through one STARTTLS relay with fixed credentials.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpEmailSender {
    /// # Errors
    /// Returns an error if the sender address is invalid or the relay host
    /// cannot be used for STARTTLS.
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let from = parse_mailbox(config.from())?;
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.host())?
            .port(config.port())
            .credentials(credentials)
            .build();

        debug!(host = config.host(), port = config.port(), "smtp sender configured");

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if message.to_email.is_empty() {
            return Err(EmailError::MissingRecipient);
        }

        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to_email)?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        self.transport.send(email).await?;

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address.parse::<Mailbox>().map_err(|source| EmailError::Address {
        address: address.to_string(),
        source,
    })
}
