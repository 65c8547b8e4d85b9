//! Cloudflare error codes with special meaning

use cfddns_core::Error;

use crate::model::ApiMessage;

/// Error codes the provider treats specially
///
/// Every other code is carried as [`ApiErrorCode::Unrecognized`] and surfaces
/// as a generic [`Error::Api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// 1001: the zone identifier does not exist
    InvalidZoneIdentifier,
    /// 7003: the route (zone or record path) does not exist
    RouteNotFound,
    /// 81044: the record does not exist
    RecordNotFound,
    Unrecognized(u32),
}

impl ApiErrorCode {
    pub fn from_code(code: u32) -> Self {
        match code {
            1001 => ApiErrorCode::InvalidZoneIdentifier,
            7003 => ApiErrorCode::RouteNotFound,
            81044 => ApiErrorCode::RecordNotFound,
            other => ApiErrorCode::Unrecognized(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ApiErrorCode::InvalidZoneIdentifier => 1001,
            ApiErrorCode::RouteNotFound => 7003,
            ApiErrorCode::RecordNotFound => 81044,
            ApiErrorCode::Unrecognized(code) => code,
        }
    }

    /// The domain or subdomain does not exist
    pub fn is_name_not_found(self) -> bool {
        matches!(
            self,
            ApiErrorCode::InvalidZoneIdentifier | ApiErrorCode::RouteNotFound
        )
    }

    /// The lookup succeeded but matched nothing
    pub fn is_no_records(self) -> bool {
        matches!(self, ApiErrorCode::RecordNotFound)
    }
}

/// Turn the errors of a failed envelope into an [`Error`]
///
/// Only the first error is classified; `name` is the domain or record name
/// the request was about.
pub fn classify(errors: &[ApiMessage], name: &str) -> Error {
    let Some(first) = errors.first() else {
        return Error::api(0, "request failed without error details");
    };

    let code = ApiErrorCode::from_code(first.code);
    if code.is_name_not_found() {
        return Error::ZoneNotFound(name.to_string());
    }

    Error::api(code.code(), first.message.clone())
}
