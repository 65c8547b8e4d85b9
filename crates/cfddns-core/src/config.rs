//! Configuration for cfddns
//!
//! The configuration is a flat TOML document:
//!
//! ```toml
//! domain = "example.com"
//! subdomain = "home"
//! api_key = "..."
//! record_ttl = 0        # 0 = automatic
//! proxied = false
//! script_on_change = "/usr/local/bin/on-ip-change.sh"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::traits::{IpVersion, Ttl};

/// Valid values for `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main cfddns configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DdnsConfig {
    /// Base domain (e.g., "example.com")
    pub domain: String,

    /// Zone ID of the base domain (looked up when absent)
    #[serde(default)]
    pub zone_id: Option<String>,

    /// Label to update below the base domain (e.g., "home")
    #[serde(default)]
    pub subdomain: Option<String>,

    /// API token, or global API key when `email` is set
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: String,

    /// Account email, selects key+email authentication
    #[serde(default)]
    pub email: Option<String>,

    /// Record TTL in seconds, 0 = automatic
    #[serde(default)]
    pub record_ttl: u32,

    /// Whether records are proxied
    #[serde(default)]
    pub proxied: bool,

    /// Skip the A record
    #[serde(default)]
    pub disable_ipv4: bool,

    /// Skip the AAAA record
    #[serde(default)]
    pub disable_ipv6: bool,

    /// Executable run after a record was created or updated
    #[serde(default)]
    pub script_on_change: Option<PathBuf>,

    /// Log destination: unset for stderr, "stdout", or a file path
    #[serde(default)]
    pub log_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Echo service returning the public IPv4 address
    #[serde(default = "default_ipv4_echo_url")]
    pub ipv4_echo_url: String,

    /// Echo service returning the public IPv6 address
    #[serde(default = "default_ipv6_echo_url")]
    pub ipv6_echo_url: String,

    /// Optional HTTP timeout; the transport default applies when unset
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("domain", &self.domain)
            .field("zone_id", &self.zone_id)
            .field("subdomain", &self.subdomain)
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("record_ttl", &self.record_ttl)
            .field("proxied", &self.proxied)
            .field("disable_ipv4", &self.disable_ipv4)
            .field("disable_ipv6", &self.disable_ipv6)
            .field("script_on_change", &self.script_on_change)
            .field("log_file", &self.log_file)
            .field("log_level", &self.log_level)
            .field("ipv4_echo_url", &self.ipv4_echo_url)
            .field("ipv6_echo_url", &self.ipv6_echo_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration for a domain with defaults for everything else
    pub fn new(domain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            zone_id: None,
            subdomain: None,
            api_key: api_key.into(),
            email: None,
            record_ttl: 0,
            proxied: false,
            disable_ipv4: false,
            disable_ipv6: false,
            script_on_change: None,
            log_file: None,
            log_level: default_log_level(),
            ipv4_echo_url: default_ipv4_echo_url(),
            ipv6_echo_url: default_ipv6_echo_url(),
            http_timeout_secs: None,
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("Invalid config file: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration
    ///
    /// Every check here runs before the first network call.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("No api_key configured"));
        }

        if self.domain.trim().is_empty() {
            return Err(Error::config("No domain configured"));
        }

        if self.disable_ipv4 && self.disable_ipv6 {
            return Err(Error::config(
                "IPv4 and IPv6 can't be disabled at the same time",
            ));
        }

        if let Some(email) = &self.email
            && email.trim().is_empty()
        {
            return Err(Error::config(
                "email is set but empty; remove it to use token authentication",
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level '{}' is not valid. Valid levels: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.ipv4_echo_url.is_empty() || self.ipv6_echo_url.is_empty() {
            return Err(Error::config("IP echo URLs cannot be empty"));
        }

        Ok(())
    }

    /// The fully-qualified name being managed
    pub fn target_name(&self) -> String {
        match self.subdomain.as_deref().map(str::trim) {
            Some(sub) if !sub.is_empty() => format!("{}.{}", sub, self.domain),
            _ => self.domain.clone(),
        }
    }

    /// Whether a subdomain label is configured
    pub fn has_subdomain(&self) -> bool {
        self.subdomain.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// The TTL to request for records
    pub fn ttl(&self) -> Ttl {
        Ttl::from_config(self.record_ttl)
    }

    /// Address families to reconcile, in order
    pub fn enabled_versions(&self) -> Vec<IpVersion> {
        IpVersion::ALL
            .into_iter()
            .filter(|version| match version {
                IpVersion::V4 => !self.disable_ipv4,
                IpVersion::V6 => !self.disable_ipv6,
            })
            .collect()
    }

    /// Configured zone ID, ignoring blank values
    pub fn configured_zone_id(&self) -> Option<&str> {
        self.zone_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Change script, ignoring blank paths
    pub fn change_script(&self) -> Option<&Path> {
        self.script_on_change
            .as_deref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
    }

    /// HTTP timeout, when one is configured
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ipv4_echo_url() -> String {
    "https://ipv4.icanhazip.com".to_string()
}

fn default_ipv6_echo_url() -> String {
    "https://ipv6.icanhazip.com".to_string()
}
