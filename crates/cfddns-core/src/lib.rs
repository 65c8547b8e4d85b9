// # cfddns-core
//
// Core library for the cfddns dynamic DNS updater.
//
// ## Architecture Overview
//
// A run is a single, stateless reconciliation pass:
// - **IpSource**: Detects the current public IP per address family
// - **DnsProvider**: Reads and writes A/AAAA records via the provider API
// - **ChangeNotifier**: Hook invoked after a record was created or updated
// - **DdnsEngine**: Decides, per family, whether to create, update or do nothing
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic is separate from API and process plumbing
// 2. **Single Pass**: No internal scheduler and no retries; the caller re-runs the process
// 3. **Contained Failures**: One family failing never prevents the other from running
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod notifier;

// Re-export core types for convenience
pub use traits::{ChangeNotifier, DnsProvider, IpSource};
pub use engine::{DdnsEngine, Outcome, RunReport};
pub use config::DdnsConfig;
pub use error::{Error, FailureKind, Result};
pub use notifier::ScriptNotifier;
