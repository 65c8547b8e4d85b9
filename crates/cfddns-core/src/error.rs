//! Error types for cfddns
//!
//! Errors fall into two groups. Fatal errors (the provider could not be
//! reached, or answered with something that is not JSON at all) abort the
//! whole run. Every other error is contained to the address family being
//! reconciled and is reported as [`Outcome::Failed`](crate::engine::Outcome).

use thiserror::Error;

/// Result type alias for cfddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cfddns
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The public IP could not be detected
    #[error("IP source error: {0}")]
    IpSource(String),

    /// The provider could not be reached (DNS, TCP, TLS, reading the body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a body that is not JSON
    #[error("Provider returned an undecodable body: {0}")]
    InvalidBody(String),

    /// A JSON response did not have the expected shape
    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    /// The domain or subdomain does not exist at the provider
    #[error("Domain not found: {0}")]
    ZoneNotFound(String),

    /// The zone identifier could not be discovered
    #[error("Could not resolve zone ID for {0}")]
    ZoneUnresolved(String),

    /// The provider reported an error in its response envelope
    #[error("Provider error {code}: {message}")]
    Api {
        /// Provider error code
        code: u32,
        /// Provider error message
        message: String,
    },

    /// The change hook failed
    #[error("Change notifier error: {0}")]
    Notifier(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a provider API error
    pub fn api(code: u32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Create a change notifier error
    pub fn notifier(msg: impl Into<String>) -> Self {
        Self::Notifier(msg.into())
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidBody(_))
    }
}

/// Why a single address family's reconciliation failed
///
/// Unlike [`Error`] this is cheap to clone and compare, so it can be carried
/// in outcomes and asserted on in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The domain or subdomain does not exist at the provider
    ZoneNotFound,
    /// The zone identifier could not be discovered
    ZoneUnresolved,
    /// The provider rejected the request
    Api { code: u32, message: String },
    /// The provider answered with an unexpected shape
    Decode(String),
    /// Anything else that is not fatal to the run
    Other(String),
}

impl From<&Error> for FailureKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::ZoneNotFound(_) => FailureKind::ZoneNotFound,
            Error::ZoneUnresolved(_) => FailureKind::ZoneUnresolved,
            Error::Api { code, message } => FailureKind::Api {
                code: *code,
                message: message.clone(),
            },
            Error::Decode(msg) => FailureKind::Decode(msg.clone()),
            other => FailureKind::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_fatal() {
        assert!(Error::transport("connection refused").is_fatal());
        assert!(Error::InvalidBody("<html>".into()).is_fatal());

        assert!(!Error::decode("missing id").is_fatal());
        assert!(!Error::api(1000, "bad request").is_fatal());
        assert!(!Error::ZoneNotFound("example.com".into()).is_fatal());
        assert!(!Error::config("no domain").is_fatal());
    }

    #[test]
    fn failure_kind_keeps_provider_code() {
        let kind = FailureKind::from(&Error::api(9106, "Missing X-Auth-Key"));
        assert_eq!(
            kind,
            FailureKind::Api {
                code: 9106,
                message: "Missing X-Auth-Key".to_string()
            }
        );
        assert_eq!(
            FailureKind::from(&Error::ZoneNotFound("home.example.com".into())),
            FailureKind::ZoneNotFound
        );
    }
}
