//! Zone identifier resolution

use cfddns_core::{Error, Result};
use tokio::sync::OnceCell;

use crate::client::{ApiClient, ApiRequest, Transport};
use crate::codes::classify;
use crate::model::Zone;

/// Resolves and caches the zone ID of the base domain
///
/// A configured ID is used as-is. Otherwise the first successful lookup is
/// cached for the lifetime of the resolver; failed lookups are not, so the
/// next record operation tries again.
#[derive(Debug)]
pub struct ZoneResolver {
    domain: String,
    zone_id: OnceCell<String>,
}

impl ZoneResolver {
    pub fn new(domain: impl Into<String>, configured: Option<&str>) -> Self {
        let configured = configured
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self {
            domain: domain.into(),
            zone_id: OnceCell::new_with(configured),
        }
    }

    /// The zone ID, if already known
    pub fn cached(&self) -> Option<&str> {
        self.zone_id.get().map(String::as_str)
    }

    /// Return the zone ID, looking it up on first use
    pub async fn resolve<T: Transport>(&self, api: &ApiClient<T>) -> Result<String> {
        self.zone_id
            .get_or_try_init(|| self.lookup(api))
            .await
            .cloned()
    }

    async fn lookup<T: Transport>(&self, api: &ApiClient<T>) -> Result<String> {
        tracing::info!("Zone ID not configured, looking it up for {}", self.domain);

        let envelope = api
            .get::<Vec<Zone>>(ApiRequest::get("zones").with_query("name", &self.domain))
            .await?;

        if !envelope.success {
            return Err(classify(&envelope.errors, &self.domain));
        }

        let zones = envelope
            .result
            .ok_or_else(|| Error::decode("zone lookup returned no result"))?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::ZoneUnresolved(self.domain.clone()))?;

        if zone.id.is_empty() {
            return Err(Error::decode(format!("zone {} has an empty id", zone.name)));
        }

        tracing::debug!(zone_id = %zone.id, "Resolved zone for {}", self.domain);
        Ok(zone.id)
    }
}
