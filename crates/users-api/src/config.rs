//! Service configuration
//!
//! The configuration surface is constructor parameters only: build a
//! [`UsersApiConfig`] in code (usually starting from `Default`) and hand
//! it to the state constructor. There is no config file format.

use std::path::PathBuf;

use chrono::Duration;

/// SMTP delivery settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,

    /// SMTP port
    pub port: u16,

    /// Optional credentials
    pub username: Option<String>,

    /// Optional credentials
    pub password: Option<String>,

    /// Sender address
    pub from: String,

    /// Whether to use STARTTLS
    pub use_starttls: bool,
}

/// Configuration of the users HTTP service.
#[derive(Debug, Clone)]
pub struct UsersApiConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// External URL prefix used in generated links (verification mails)
    pub external_url: String,

    /// Service name used in page titles and mail subjects
    pub service_name: String,

    /// Administrator contact receiving sign-up notices
    pub admin_email: Option<String>,

    /// Minimum length of a username
    pub min_username_length: usize,

    /// Minimum length of a realm
    pub min_realm_length: usize,

    /// Minimum length of a password
    pub min_password_length: usize,

    /// Lifetime of a sign-in session (and its cookie)
    pub session_lifetime: Duration,

    /// SMTP settings; `None` disables outgoing mail
    pub smtp: Option<SmtpConfig>,

    /// Directory with the bundled front-end; `None` serves the built-in
    /// landing page instead
    pub www_root: Option<PathBuf>,

    /// Whether sign-up verifies the e-mail domain via DNS (A/AAAA/MX)
    pub validate_email_dns: bool,
}

impl Default for UsersApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 2000,
            external_url: "http://127.0.0.1:2000".to_owned(),
            service_name: "Social Open Data".to_owned(),
            admin_email: None,
            min_username_length: 4,
            min_realm_length: 2,
            min_password_length: 8,
            session_lifetime: Duration::days(30),
            smtp: None,
            www_root: None,
            validate_email_dns: true,
        }
    }
}

impl UsersApiConfig {
    /// Set the bind address.
    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the external URL prefix.
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = url.into();
        self
    }

    /// Set the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the administrator contact address.
    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self
    }

    /// Set the SMTP settings.
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    /// Set the front-end directory.
    pub fn with_www_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.www_root = Some(root.into());
        self
    }

    /// Set the session lifetime.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Disable the DNS part of e-mail validation (syntax is still checked).
    pub fn without_dns_validation(mut self) -> Self {
        self.validate_email_dns = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let config = UsersApiConfig::default();
        assert_eq!(config.min_username_length, 4);
        assert_eq!(config.min_realm_length, 2);
        assert_eq!(config.min_password_length, 8);
        assert_eq!(config.session_lifetime, Duration::days(30));
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let config = UsersApiConfig::default()
            .with_bind("0.0.0.0", 8080)
            .with_service_name("Test Service")
            .with_admin_email("admin@example.org")
            .without_dns_validation();

        assert_eq!(config.port, 8080);
        assert_eq!(config.service_name, "Test Service");
        assert_eq!(config.admin_email.as_deref(), Some("admin@example.org"));
        assert!(!config.validate_email_dns);
    }
}
