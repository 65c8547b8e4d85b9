//! Wire types of the Cloudflare v4 API

use cfddns_core::Error;
use cfddns_core::traits::{DesiredRecord, DnsRecord, RecordType, Ttl};
use serde::{Deserialize, Deserializer, Serialize};

/// TTL value Cloudflare interprets as "automatic"
pub const AUTOMATIC_TTL: u32 = 1;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<R> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<R>,
}

/// An entry of the envelope's `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(deserialize_with = "code_from_number_or_string")]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

// Cloudflare sends codes as numbers, some proxies rewrite them as strings
fn code_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(code) => Ok(code),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A zone from `GET zones?name=`
#[derive(Debug, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A DNS record as returned by the API
#[derive(Debug, Deserialize)]
pub struct RecordResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

impl TryFrom<RecordResponse> for DnsRecord {
    type Error = Error;

    fn try_from(record: RecordResponse) -> Result<Self, Error> {
        let record_type = match record.record_type.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            other => {
                return Err(Error::decode(format!(
                    "unexpected record type '{}' for {}",
                    other, record.name
                )));
            }
        };

        if record.content.is_empty() {
            return Err(Error::decode(format!("record {} has no content", record.name)));
        }

        Ok(DnsRecord {
            id: record.id,
            record_type,
            name: record.name,
            content: record.content,
            ttl: record.ttl,
            proxied: record.proxied,
        })
    }
}

/// Request body for creating or replacing a record
#[derive(Debug, Serialize)]
pub struct RecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: &'a str,
    pub content: &'a str,
    pub ttl: u32,
    pub proxied: bool,
}

impl<'a> From<&'a DesiredRecord> for RecordBody<'a> {
    fn from(record: &'a DesiredRecord) -> Self {
        Self {
            record_type: record.record_type.as_str(),
            name: &record.name,
            content: &record.content,
            ttl: encode_ttl(record.ttl),
            proxied: record.proxied,
        }
    }
}

/// Encode a TTL for the API; a literal 0 is never sent
pub fn encode_ttl(ttl: Ttl) -> u32 {
    match ttl {
        Ttl::Automatic | Ttl::Seconds(0) => AUTOMATIC_TTL,
        Ttl::Seconds(seconds) => seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desired(ttl: Ttl) -> DesiredRecord {
        DesiredRecord {
            record_type: RecordType::Aaaa,
            name: "home.example.com".into(),
            content: "2001:db8::1".into(),
            ttl,
            proxied: true,
        }
    }

    #[test]
    fn automatic_ttl_is_sent_as_one() {
        assert_eq!(encode_ttl(Ttl::Automatic), 1);
        assert_eq!(encode_ttl(Ttl::from_config(0)), 1);
        assert_eq!(encode_ttl(Ttl::Seconds(0)), 1);
        assert_eq!(encode_ttl(Ttl::Seconds(300)), 300);
    }

    #[test]
    fn record_body_shape() {
        let record = desired(Ttl::Automatic);
        let body = serde_json::to_value(RecordBody::from(&record)).unwrap();

        assert_eq!(
            body,
            json!({
                "type": "AAAA",
                "name": "home.example.com",
                "content": "2001:db8::1",
                "ttl": 1,
                "proxied": true
            })
        );
    }

    #[test]
    fn error_code_accepts_number_or_string() {
        let envelope: Envelope<serde_json::Value> = serde_json::from_value(json!({
            "success": false,
            "errors": [
                { "code": 7003, "message": "Could not route" },
                { "code": "81044", "message": "Record does not exist" }
            ],
            "result": null
        }))
        .unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.errors[0].code, 7003);
        assert_eq!(envelope.errors[1].code, 81044);
        assert!(envelope.result.is_none());
    }

    #[test]
    fn non_numeric_code_is_rejected() {
        let result: std::result::Result<ApiMessage, _> =
            serde_json::from_value(json!({ "code": "abc", "message": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn envelope_without_errors_or_result() {
        let envelope: Envelope<Vec<Zone>> =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(envelope.errors.is_empty());
        assert!(envelope.result.is_none());
    }

    #[test]
    fn record_response_converts() {
        let response: RecordResponse = serde_json::from_value(json!({
            "id": "372e67954025e0ba6aaa6d586b9e0b59",
            "type": "A",
            "name": "home.example.com",
            "content": "198.51.100.4",
            "ttl": 3600,
            "proxied": false,
            "zone_id": "023e105f4ecef8ad9ca31a8372d0c353"
        }))
        .unwrap();

        let record = DnsRecord::try_from(response).unwrap();
        assert_eq!(record.id, "372e67954025e0ba6aaa6d586b9e0b59");
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.content, "198.51.100.4");
        assert_eq!(record.ttl, 3600);
    }

    #[test]
    fn unexpected_record_type_is_a_decode_error() {
        let response: RecordResponse = serde_json::from_value(json!({
            "id": "r1",
            "type": "CNAME",
            "name": "home.example.com",
            "content": "example.com"
        }))
        .unwrap();

        assert!(matches!(DnsRecord::try_from(response), Err(Error::Decode(_))));
    }
}
