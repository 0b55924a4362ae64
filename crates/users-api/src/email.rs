//! Outgoing mail and e-mail address validation
//!
//! All notification mail goes through the [`NotificationSender`]
//! capability, injected once at startup. Delivery is bounded: user-facing
//! mails wait at most 60 seconds, administrator notices at most 30, and a
//! failed or timed-out send never rolls back state that was already
//! committed — it only changes the HTTP response variant.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;
use thiserror::Error;

use users_org::User;

use crate::config::SmtpConfig;

/// How long to wait for a user-facing mail before giving up.
const USER_MAIL_TIMEOUT: Duration = Duration::from_secs(60);

/// How long to wait for an administrator notice before giving up.
const ADMIN_MAIL_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail delivery failure.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// The transport did not finish within the bounded wait
    #[error("mail delivery timed out")]
    Timeout,

    /// The transport reported an error
    #[error("mail delivery failed: {0}")]
    Transport(String),

    /// Mail is not configured on this instance
    #[error("mail delivery is disabled")]
    Disabled,
}

/// Capability for sending the service's notification mails.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send the sign-up mail carrying the verification link.
    async fn send_signup(&self, user: &User, verification_url: &str) -> Result<(), MailError>;

    /// Send the welcome mail after successful verification.
    async fn send_welcome(&self, user: &User) -> Result<(), MailError>;

    /// Send a password-reset mail.
    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<(), MailError>;

    /// Send a notice to the service administrator.
    async fn send_admin_notice(&self, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP-backed sender.
pub struct SmtpSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    service_name: String,
    admin_email: Option<String>,
}

impl SmtpSender {
    /// Build a sender from SMTP settings.
    pub fn new(
        smtp: &SmtpConfig,
        service_name: impl Into<String>,
        admin_email: Option<String>,
    ) -> Result<Self, MailError> {
        let builder = if smtp.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        };
        let builder = builder.port(smtp.port);
        let builder = match (&smtp.username, &smtp.password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };
        tracing::info!(host = %smtp.host, port = smtp.port, "SMTP sender initialized");
        Ok(Self {
            mailer: builder.build(),
            from: smtp.from.clone(),
            service_name: service_name.into(),
            admin_email,
        })
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str, wait: Duration) -> Result<(), MailError> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|_| MailError::Transport("invalid sender address".into()))?;
        let to: Mailbox = to
            .parse()
            .map_err(|_| MailError::Transport("invalid recipient address".into()))?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(|e| MailError::Transport(e.to_string()))?;

        match tokio::time::timeout(wait, self.mailer.send(message)).await {
            Err(_) => Err(MailError::Timeout),
            Ok(Err(e)) => Err(MailError::Transport(e.to_string())),
            Ok(Ok(_)) => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationSender for SmtpSender {
    async fn send_signup(&self, user: &User, verification_url: &str) -> Result<(), MailError> {
        let subject = format!("{}: please verify your e-mail address", self.service_name);
        let body = format!(
            "Hello {},\n\nplease verify your e-mail address by visiting:\n\n{}\n",
            user.name, verification_url
        );
        self.deliver(&user.email, &subject, &body, USER_MAIL_TIMEOUT)
            .await
    }

    async fn send_welcome(&self, user: &User) -> Result<(), MailError> {
        let subject = format!("Welcome to {}!", self.service_name);
        let body = format!("Hello {},\n\nyour account is now active.\n", user.name);
        self.deliver(&user.email, &subject, &body, USER_MAIL_TIMEOUT)
            .await
    }

    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<(), MailError> {
        let subject = format!("{}: password reset", self.service_name);
        let body = format!(
            "Hello {},\n\na password reset was requested for your account:\n\n{}\n",
            user.name, reset_url
        );
        self.deliver(&user.email, &subject, &body, USER_MAIL_TIMEOUT)
            .await
    }

    async fn send_admin_notice(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let Some(admin) = &self.admin_email else {
            return Err(MailError::Disabled);
        };
        self.deliver(admin, subject, body, ADMIN_MAIL_TIMEOUT).await
    }
}

/// Sender used when mail is not configured; every send fails softly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSender;

#[async_trait]
impl NotificationSender for NullSender {
    async fn send_signup(&self, _user: &User, _verification_url: &str) -> Result<(), MailError> {
        Err(MailError::Disabled)
    }

    async fn send_welcome(&self, _user: &User) -> Result<(), MailError> {
        Err(MailError::Disabled)
    }

    async fn send_password_reset(&self, _user: &User, _reset_url: &str) -> Result<(), MailError> {
        Err(MailError::Disabled)
    }

    async fn send_admin_notice(&self, _subject: &str, _body: &str) -> Result<(), MailError> {
        Err(MailError::Disabled)
    }
}

// ----------------------------------------------------------------------
// Address validation
// ----------------------------------------------------------------------

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("e-mail regex is valid")
    })
}

/// Whether the address passes the syntax check.
pub fn email_syntax_ok(address: &str) -> bool {
    email_regex().is_match(address)
}

/// Whether the address's domain resolves (MX, falling back to A/AAAA).
pub async fn email_domain_resolves(address: &str) -> bool {
    let Some((_, domain)) = address.rsplit_once('@') else {
        return false;
    };
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    if resolver.mx_lookup(domain).await.is_ok() {
        return true;
    }
    resolver.lookup_ip(domain).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test sender recording every delivery for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send_signup(&self, user: &User, url: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push(("signup".into(), format!("{} {}", user.email, url)));
            Ok(())
        }

        async fn send_welcome(&self, user: &User) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push(("welcome".into(), user.email.clone()));
            Ok(())
        }

        async fn send_password_reset(&self, user: &User, url: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push(("reset".into(), format!("{} {}", user.email, url)));
            Ok(())
        }

        async fn send_admin_notice(&self, subject: &str, _body: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push(("admin".into(), subject.to_owned()));
            Ok(())
        }
    }

    #[test]
    fn test_email_syntax() {
        assert!(email_syntax_ok("alice@example.org"));
        assert!(email_syntax_ok("a.b+c@sub.example.co.uk"));
        assert!(!email_syntax_ok("not-an-email"));
        assert!(!email_syntax_ok("missing@tld"));
        assert!(!email_syntax_ok("@example.org"));
        assert!(!email_syntax_ok("spaces in@example.org"));
    }

    #[tokio::test]
    async fn test_domain_check_rejects_address_without_at() {
        // Must fail before any DNS lookup happens.
        assert!(!email_domain_resolves("no-at-sign").await);
    }

    #[tokio::test]
    async fn test_null_sender_fails_softly() {
        let sender = NullSender;
        let user = User::new(users_org::UserId::parse("alice").unwrap(), "a@example.org");
        assert!(matches!(
            sender.send_welcome(&user).await,
            Err(MailError::Disabled)
        ));
    }
}
