//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles share their state through `Arc`, so a test can keep a clone
//! for assertions while the engine owns the boxed original.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{
    ChangeEvent, ChangeNotifier, DesiredRecord, DnsProvider, DnsRecord, IpSource, IpVersion,
    RecordType,
};
use cfddns_core::DdnsConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource returning fixed answers per family
#[derive(Clone, Default)]
pub struct StaticIpSource {
    answers: Arc<Mutex<HashMap<IpVersion, std::result::Result<String, String>>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `ip` for `version`
    pub fn with_ip(self, version: IpVersion, ip: &str) -> Self {
        self.answers.lock().unwrap().insert(version, Ok(ip.to_string()));
        self
    }

    /// Fail for `version`, like an unreachable echo service
    pub fn with_failure(self, version: IpVersion) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(version, Err("connection refused".to_string()));
        self
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self, version: IpVersion) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.lock().unwrap().get(&version) {
            Some(Ok(ip)) => Ok(ip.clone()),
            Some(Err(msg)) => Err(Error::ip_source(msg.clone())),
            None => Ok(String::new()),
        }
    }
}

/// A provider call, as recorded by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Find { name: String, record_type: RecordType },
    Create(DesiredRecord),
    Update { id: String, record: DesiredRecord },
}

/// How find_record() should fail for a record type
#[derive(Debug, Clone)]
pub enum FindFailure {
    ZoneNotFound,
    Api(u32, &'static str),
    Decode,
    Transport,
}

impl FindFailure {
    fn to_error(&self, name: &str) -> Error {
        match self {
            FindFailure::ZoneNotFound => Error::ZoneNotFound(name.to_string()),
            FindFailure::Api(code, message) => Error::api(*code, *message),
            FindFailure::Decode => Error::decode("result is not an array"),
            FindFailure::Transport => Error::transport("connection reset by peer"),
        }
    }
}

/// A DnsProvider backed by an in-memory record table
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<HashMap<RecordType, DnsRecord>>>,
    find_failures: Arc<Mutex<HashMap<RecordType, FindFailure>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    next_id: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing record
    pub fn with_record(self, record_type: RecordType, name: &str, id: &str, content: &str) -> Self {
        self.records.lock().unwrap().insert(
            record_type,
            DnsRecord {
                id: id.to_string(),
                record_type,
                name: name.to_string(),
                content: content.to_string(),
                ttl: 1,
                proxied: false,
            },
        );
        self
    }

    /// Make find_record() fail for a record type
    pub fn failing_find(self, record_type: RecordType, failure: FindFailure) -> Self {
        self.find_failures.lock().unwrap().insert(record_type, failure);
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded create and update calls
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, ProviderCall::Find { .. }))
            .collect()
    }

    /// Current content of a record type
    pub fn content(&self, record_type: RecordType) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&record_type)
            .map(|r| r.content.clone())
    }

    fn stored(&self, id: String, record: &DesiredRecord) -> DnsRecord {
        let stored = DnsRecord {
            id,
            record_type: record.record_type,
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: 1,
            proxied: record.proxied,
        };
        self.records
            .lock()
            .unwrap()
            .insert(record.record_type, stored.clone());
        stored
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_record(&self, name: &str, record_type: RecordType) -> Result<Option<DnsRecord>> {
        self.calls.lock().unwrap().push(ProviderCall::Find {
            name: name.to_string(),
            record_type,
        });

        if let Some(failure) = self.find_failures.lock().unwrap().get(&record_type) {
            return Err(failure.to_error(name));
        }

        Ok(self.records.lock().unwrap().get(&record_type).cloned())
    }

    async fn create_record(&self, record: &DesiredRecord) -> Result<DnsRecord> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Create(record.clone()));
        let id = format!("created-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(self.stored(id, record))
    }

    async fn update_record(&self, record_id: &str, record: &DesiredRecord) -> Result<DnsRecord> {
        self.calls.lock().unwrap().push(ProviderCall::Update {
            id: record_id.to_string(),
            record: record.clone(),
        });
        Ok(self.stored(record_id.to_string(), record))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A ChangeNotifier that records events
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records the event and then reports a failure
    pub fn failing() -> Self {
        Self {
            events: Arc::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(Error::notifier("hook.sh exited with exit status: 1"));
        }
        Ok(())
    }
}

/// Configuration for `home.example.com` with both families enabled
pub fn home_config() -> DdnsConfig {
    let mut config = DdnsConfig::new("example.com", "test-token");
    config.subdomain = Some("home".to_string());
    config
}
