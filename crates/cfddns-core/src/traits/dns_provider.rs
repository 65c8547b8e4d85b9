// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via a provider API.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::traits::{DnsProvider, RecordType};
//
// let provider = /* DnsProvider implementation */;
// match provider.find_record("home.example.com", RecordType::A).await? {
//     Some(record) => println!("{} -> {}", record.name, record.content),
//     None => println!("no A record yet"),
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// DNS record type managed by cfddns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-to-live requested for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Let the provider pick (configured as `0`)
    Automatic,
    /// Explicit TTL in seconds
    Seconds(u32),
}

impl Ttl {
    /// Interpret a configured TTL value; `0` means automatic
    pub fn from_config(value: u32) -> Self {
        if value == 0 {
            Ttl::Automatic
        } else {
            Ttl::Seconds(value)
        }
    }
}

/// A DNS record as it currently exists at the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-side identifier, required to update the record
    pub id: String,
    /// Record type
    pub record_type: RecordType,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (the IP address)
    pub content: String,
    /// TTL as reported by the provider
    pub ttl: u32,
    /// Whether the record is proxied
    pub proxied: bool,
}

/// The record cfddns wants to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: Ttl,
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Providers translate record reads and writes into API calls. They do not
/// decide whether an update is needed (that is the engine's job) and never
/// retry on their own.
///
/// # Error Contract
///
/// - Unreachable API or a non-JSON body: an error for which
///   [`Error::is_fatal`](crate::Error::is_fatal) is true
/// - Unknown domain/subdomain: [`Error::ZoneNotFound`](crate::Error::ZoneNotFound)
/// - Unexpected response shape: [`Error::Decode`](crate::Error::Decode)
/// - Any other provider-reported failure: [`Error::Api`](crate::Error::Api)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the record of the given type and name
    ///
    /// Returns `Ok(None)` when the name exists but has no record of this type.
    async fn find_record(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Option<DnsRecord>, crate::Error>;

    /// Create a new record
    async fn create_record(&self, record: &DesiredRecord) -> Result<DnsRecord, crate::Error>;

    /// Replace the record with the given identifier
    async fn update_record(
        &self,
        record_id: &str,
        record: &DesiredRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_is_automatic() {
        assert_eq!(Ttl::from_config(0), Ttl::Automatic);
        assert_eq!(Ttl::from_config(1), Ttl::Seconds(1));
        assert_eq!(Ttl::from_config(300), Ttl::Seconds(300));
    }

    #[test]
    fn record_type_wire_names() {
        assert_eq!(RecordType::A.as_str(), "A");
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
    }
}
