//! Record reconciliation engine
//!
//! The DdnsEngine is responsible for:
//! - Detecting the public IP of each enabled address family via IpSource
//! - Fetching the current record from the DnsProvider
//! - Creating or updating the record when it diverges
//! - Invoking the ChangeNotifier after a change
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── detected IP ─────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ DdnsEngine   │
//!                            └──────────────┘
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     │                               │
//!                     ▼                               ▼
//!            ┌──────────────┐                ┌────────────────┐
//!            │ DnsProvider  │                │ ChangeNotifier │
//!            │ (fetch/write)│                │ (hook)         │
//!            └──────────────┘                └────────────────┘
//! ```
//!
//! ## Per-family flow
//!
//! 1. Detect: no IP → `NoIpFound`
//! 2. Fetch: existing record, `None` when the type has no record yet
//! 3. Decide: create, update by identifier, or leave unchanged
//! 4. Notify: after a create or update
//!
//! There are no retries. A run is one attempt; the external scheduler runs
//! the next one.

use crate::config::DdnsConfig;
use crate::error::{Error, FailureKind, Result};
use crate::traits::{
    ChangeEvent, ChangeNotifier, DesiredRecord, DnsProvider, DnsRecord, IpSource, IpVersion,
    Ttl,
};
use tracing::{debug, error, info, warn};

/// Result of reconciling one address family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No public IP was detected for this family
    NoIpFound,
    /// The record already had the detected IP
    Unchanged { ip: String },
    /// The record did not exist and was created
    Created { ip: String },
    /// The record had a different IP and was updated
    Updated { previous_ip: String, ip: String },
    /// Reconciliation of this family was aborted
    Failed(FailureKind),
}

impl Outcome {
    /// Whether the record was written (or would have been, in dry-run mode)
    pub fn is_change(&self) -> bool {
        matches!(self, Outcome::Created { .. } | Outcome::Updated { .. })
    }
}

/// Outcomes of a full run, in the order the families were processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<(IpVersion, Outcome)>,
}

impl RunReport {
    /// Outcome for a family, if it was processed
    pub fn outcome(&self, version: IpVersion) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, outcome)| outcome)
    }

    /// Number of families whose reconciliation failed
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Outcome::Failed(_)))
            .count()
    }
}

/// Core reconciliation engine
///
/// Holds its collaborators by ownership; there is no shared global state.
/// All calls are awaited one after another, so a run never has two requests
/// in flight.
pub struct DdnsEngine {
    /// IP source for detecting the public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// Optional hook run after a change
    notifier: Option<Box<dyn ChangeNotifier>>,

    /// Fully-qualified name being managed
    target: String,

    /// TTL to request
    ttl: Ttl,

    /// Proxy flag to request
    proxied: bool,

    /// Families to reconcile, in order
    versions: Vec<IpVersion>,

    /// Log intended writes instead of performing them
    dry_run: bool,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// The configuration is validated here so an invalid one never reaches
    /// the network.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        notifier: Option<Box<dyn ChangeNotifier>>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            notifier,
            target: config.target_name(),
            ttl: config.ttl(),
            proxied: config.proxied,
            versions: config.enabled_versions(),
            dry_run: false,
        })
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile every enabled family once
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: every family reached a terminal state, including
    ///   `NoIpFound` and `Failed`
    /// - `Err(Error)`: a fatal error aborted the run
    pub async fn run_once(&self) -> Result<RunReport> {
        info!("Checking {}", self.target);

        let mut report = RunReport::default();
        for &version in &self.versions {
            let outcome = self.reconcile(version).await?;
            report.outcomes.push((version, outcome));
        }

        Ok(report)
    }

    /// Reconcile a single address family
    pub async fn reconcile(&self, version: IpVersion) -> Result<Outcome> {
        let record_type = version.record_type();

        // Detect
        let ip = match self.ip_source.current(version).await {
            Ok(ip) if !ip.is_empty() => ip,
            Ok(_) => {
                info!(version = version.label(), "No {} address found", version);
                return Ok(Outcome::NoIpFound);
            }
            Err(e) => {
                info!(version = version.label(), error = %e, "No {} address found", version);
                return Ok(Outcome::NoIpFound);
            }
        };
        debug!(version = version.label(), ip = %ip, "Detected public address");

        // Fetch
        let existing = match self.provider.find_record(&self.target, record_type).await {
            Ok(existing) => existing,
            Err(e) => return self.contain(version, "fetching the current record", e),
        };

        let desired = DesiredRecord {
            record_type,
            name: self.target.clone(),
            content: ip.clone(),
            ttl: self.ttl,
            proxied: self.proxied,
        };

        // Decide
        let outcome = match existing {
            None => {
                info!(
                    version = version.label(),
                    ip = %ip,
                    "{} address detected for the first time",
                    version
                );
                if let Err(e) = self.create(&desired).await {
                    return self.contain(version, "creating the record", e);
                }
                Outcome::Created { ip }
            }
            Some(record) if record.content == ip => {
                info!(version = version.label(), ip = %ip, "{} address has not changed", version);
                return Ok(Outcome::Unchanged { ip });
            }
            Some(record) => {
                if record.id.is_empty() {
                    return self.contain(
                        version,
                        "reading the current record",
                        Error::decode(format!(
                            "no record ID for {}'s {} record",
                            self.target, record_type
                        )),
                    );
                }
                info!(
                    version = version.label(),
                    from = %record.content,
                    to = %ip,
                    "{} address changed",
                    version
                );
                if let Err(e) = self.update(&record, &desired).await {
                    return self.contain(version, "updating the record", e);
                }
                Outcome::Updated {
                    previous_ip: record.content,
                    ip,
                }
            }
        };

        // Notify
        if self.dry_run {
            debug!("[DRY-RUN] Skipping change notifier");
        } else {
            self.notify(version, &outcome).await;
        }

        Ok(outcome)
    }

    /// Create a record (or log it in dry-run mode)
    async fn create(&self, desired: &DesiredRecord) -> Result<()> {
        if self.dry_run {
            info!(
                "[DRY-RUN] Would create {} record {} -> {}",
                desired.record_type, desired.name, desired.content
            );
            return Ok(());
        }

        let created = self.provider.create_record(desired).await?;
        info!(
            record_type = %created.record_type,
            id = %created.id,
            "Record created successfully"
        );
        Ok(())
    }

    /// Update a record by the identifier from the same lookup
    async fn update(&self, current: &DnsRecord, desired: &DesiredRecord) -> Result<()> {
        if self.dry_run {
            info!(
                "[DRY-RUN] Would update {} record {} ({}): {} -> {}",
                desired.record_type, desired.name, current.id, current.content, desired.content
            );
            return Ok(());
        }

        let updated = self.provider.update_record(&current.id, desired).await?;
        info!(
            record_type = %updated.record_type,
            id = %updated.id,
            "Record changed successfully"
        );
        Ok(())
    }

    /// Run the change notifier; failures are only logged
    async fn notify(&self, version: IpVersion, outcome: &Outcome) {
        let (previous, current) = match outcome {
            Outcome::Created { ip } => (String::new(), ip.clone()),
            Outcome::Updated { previous_ip, ip } => (previous_ip.clone(), ip.clone()),
            _ => return,
        };

        let Some(notifier) = &self.notifier else {
            debug!("No change notifier configured");
            return;
        };

        let event = ChangeEvent {
            version,
            previous,
            current,
            name: self.target.clone(),
        };

        if let Err(e) = notifier.notify(&event).await {
            warn!(version = version.label(), error = %e, "Change notifier failed");
        }
    }

    /// Keep a non-fatal error inside this family, propagate a fatal one
    fn contain(&self, version: IpVersion, action: &str, err: Error) -> Result<Outcome> {
        if err.is_fatal() {
            return Err(err);
        }

        match &err {
            Error::ZoneNotFound(name) => {
                error!(
                    version = version.label(),
                    provider = self.provider.provider_name(),
                    "Domain/subdomain {} does not exist",
                    name
                );
            }
            Error::Api { code, message } => {
                error!(
                    version = version.label(),
                    provider = self.provider.provider_name(),
                    code = *code,
                    message = %message,
                    "Provider error while {}",
                    action
                );
            }
            other => {
                error!(
                    version = version.label(),
                    provider = self.provider.provider_name(),
                    error = %other,
                    "Failed while {}",
                    action
                );
            }
        }

        Ok(Outcome::Failed(FailureKind::from(&err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_writes_count_as_changes() {
        assert!(Outcome::Created { ip: "1.2.3.4".into() }.is_change());
        assert!(
            Outcome::Updated {
                previous_ip: "1.2.3.4".into(),
                ip: "5.6.7.8".into()
            }
            .is_change()
        );
        assert!(!Outcome::Unchanged { ip: "1.2.3.4".into() }.is_change());
        assert!(!Outcome::NoIpFound.is_change());
        assert!(!Outcome::Failed(FailureKind::ZoneNotFound).is_change());
    }

    #[test]
    fn report_counts_failures() {
        let report = RunReport {
            outcomes: vec![
                (IpVersion::V4, Outcome::Failed(FailureKind::ZoneNotFound)),
                (IpVersion::V6, Outcome::Created { ip: "2001:db8::1".into() }),
            ],
        };

        assert_eq!(report.failures(), 1);
        assert_eq!(
            report.outcome(IpVersion::V6),
            Some(&Outcome::Created { ip: "2001:db8::1".into() })
        );
    }
}
