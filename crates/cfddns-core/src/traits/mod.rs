//! Core traits for cfddns
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Detect the current public IP
//! - [`DnsProvider`]: Read and write DNS records via provider APIs
//! - [`ChangeNotifier`]: React to applied record changes

pub mod ip_source;
pub mod dns_provider;
pub mod notifier;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{DesiredRecord, DnsProvider, DnsRecord, RecordType, Ttl};
pub use notifier::{ChangeEvent, ChangeNotifier};
