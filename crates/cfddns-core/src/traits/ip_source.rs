// # IP Source Trait
//
// Defines the interface for detecting the machine's public IP address.
//
// ## Implementations
//
// - HTTP echo services: `cfddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::traits::{IpSource, IpVersion};
//
// let source = /* IpSource implementation */;
// let ip = source.current(IpVersion::V4).await?;
// ```

use async_trait::async_trait;
use std::fmt;

use super::dns_provider::RecordType;

/// IP version (address family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Both families, in the order they are reconciled
    pub const ALL: [IpVersion; 2] = [IpVersion::V4, IpVersion::V6];

    /// Short label used in logs and passed to the change hook
    pub fn label(self) -> &'static str {
        match self {
            IpVersion::V4 => "v4",
            IpVersion::V6 => "v6",
        }
    }

    /// The DNS record type that carries addresses of this family
    pub fn record_type(self) -> RecordType {
        match self {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP{}", self.label())
    }
}

/// Trait for public IP detection
///
/// # Contract
///
/// - One attempt per call, no retries
/// - The returned string is passed to the DNS provider as-is; the provider
///   is the authority on whether it is a valid address
/// - An error or an empty string means "no address for this family this run"
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP for the given family
    async fn current(&self, version: IpVersion) -> Result<String, crate::Error>;
}
