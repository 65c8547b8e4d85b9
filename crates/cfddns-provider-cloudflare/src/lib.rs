// # Cloudflare DNS Provider
//
// Implements `DnsProvider` on top of the Cloudflare API v4.
//
// ## Behavior
//
// - One HTTP request per operation, no retries
// - Zone ID taken from the configuration, or looked up once and cached
// - Both A and AAAA records
// - Automatic TTL is sent as `1`
//
// ## Security
//
// - Credentials never appear in logs or Debug output
//
// ## API Reference
//
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

pub mod client;
pub mod codes;
pub mod model;
pub mod zone;

use async_trait::async_trait;
use cfddns_core::traits::{DesiredRecord, DnsProvider, DnsRecord, RecordType};
use cfddns_core::{DdnsConfig, Error, Result};
use reqwest::Method;

pub use client::{ApiClient, ApiRequest, Auth, ReqwestTransport, Transport};
pub use codes::ApiErrorCode;
pub use zone::ZoneResolver;

use codes::classify;
use model::{Envelope, RecordBody, RecordResponse};

/// Cloudflare DNS provider
pub struct CloudflareProvider<T = ReqwestTransport> {
    api: ApiClient<T>,
    zones: ZoneResolver,
}

impl<T> std::fmt::Debug for CloudflareProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("zones", &self.zones)
            .finish_non_exhaustive()
    }
}

impl CloudflareProvider<ReqwestTransport> {
    /// Create a provider from the configuration, sharing `client`
    pub fn from_config(client: reqwest::Client, config: &DdnsConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }

        let auth = match &config.email {
            Some(email) => Auth::KeyEmail {
                key: config.api_key.clone(),
                email: email.clone(),
            },
            None => Auth::Token(config.api_key.clone()),
        };

        Ok(Self::with_transport(
            ReqwestTransport::new(client, auth),
            &config.domain,
            config.configured_zone_id(),
        ))
    }
}

impl<T: Transport> CloudflareProvider<T> {
    /// Create a provider over an arbitrary transport
    pub fn with_transport(transport: T, domain: &str, zone_id: Option<&str>) -> Self {
        Self {
            api: ApiClient::new(transport),
            zones: ZoneResolver::new(domain, zone_id),
        }
    }

    fn records_path(zone_id: &str) -> String {
        format!("zones/{}/dns_records", zone_id)
    }

    fn written(envelope: Envelope<RecordResponse>, name: &str) -> Result<DnsRecord> {
        if !envelope.success {
            return Err(classify(&envelope.errors, name));
        }

        let record = envelope
            .result
            .ok_or_else(|| Error::decode(format!("no record returned for {}", name)))?;

        DnsRecord::try_from(record)
    }
}

#[async_trait]
impl<T: Transport> DnsProvider for CloudflareProvider<T> {
    async fn find_record(&self, name: &str, record_type: RecordType) -> Result<Option<DnsRecord>> {
        let zone_id = self.zones.resolve(&self.api).await?;

        let request = ApiRequest::get(Self::records_path(&zone_id))
            .with_query("type", record_type.as_str())
            .with_query("name", name);

        let envelope = self.api.get::<Vec<RecordResponse>>(request).await?;

        if !envelope.success {
            if let Some(first) = envelope.errors.first()
                && ApiErrorCode::from_code(first.code).is_no_records()
            {
                return Ok(None);
            }
            return Err(classify(&envelope.errors, name));
        }

        let records = envelope.result.ok_or_else(|| {
            Error::decode(format!("record lookup for {} returned no result", name))
        })?;

        match records.into_iter().next() {
            Some(record) => DnsRecord::try_from(record).map(Some),
            None => Ok(None),
        }
    }

    async fn create_record(&self, record: &DesiredRecord) -> Result<DnsRecord> {
        let zone_id = self.zones.resolve(&self.api).await?;

        let envelope: Envelope<RecordResponse> = self
            .api
            .send_json(
                Method::POST,
                &Self::records_path(&zone_id),
                &RecordBody::from(record),
            )
            .await?;

        Self::written(envelope, &record.name)
    }

    async fn update_record(&self, record_id: &str, record: &DesiredRecord) -> Result<DnsRecord> {
        if record_id.is_empty() {
            return Err(Error::decode(format!(
                "cannot update {} without a record id",
                record.name
            )));
        }

        let zone_id = self.zones.resolve(&self.api).await?;
        let path = format!("{}/{}", Self::records_path(&zone_id), record_id);

        let envelope: Envelope<RecordResponse> = self
            .api
            .send_json(Method::PUT, &path, &RecordBody::from(record))
            .await?;

        Self::written(envelope, &record.name)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
