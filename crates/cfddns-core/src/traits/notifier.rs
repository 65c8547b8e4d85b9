// # Change Notifier Trait
//
// Defines the hook invoked after a record was created or updated.
//
// ## Implementations
//
// - External script: `cfddns_core::notifier::ScriptNotifier`

use async_trait::async_trait;

use super::ip_source::IpVersion;

/// A record change that was just applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Address family of the changed record
    pub version: IpVersion,
    /// Previous content, empty when the record was created
    pub previous: String,
    /// New content
    pub current: String,
    /// Fully-qualified name of the record
    pub name: String,
}

/// Trait for change notification hooks
///
/// Failures are reported back to the engine, which logs them and moves on.
/// A notifier can never change the outcome of a run.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Report a change
    async fn notify(&self, event: &ChangeEvent) -> Result<(), crate::Error>;
}
