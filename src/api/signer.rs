//! HMAC-SHA256 request signing and URL construction.
//!
//! The signed URL is built in three steps:
//! 1. Merge caller parameters with the reserved ones (service, operation,
//!    version, timestamp, access key, associate tag)
//! 2. Build the canonical query string: keys sorted bytewise, keys and values
//!    percent-encoded per RFC 3986
//! 3. Sign `GET\n{host}\n/onca/xml\n{canonical}` and append the base64
//!    signature as the last parameter

use crate::api::credentials::Credentials;
use crate::api::locales::Locale;
use crate::api::params::Params;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Service identifier sent with every request.
pub const SERVICE: &str = "AWSECommerceService";

/// Path of the REST endpoint on every host.
pub const REQUEST_PATH: &str = "/onca/xml";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Scheme and host requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
}

impl Endpoint {
    /// The production endpoint for a locale.
    pub fn for_locale(locale: Locale) -> Self {
        Self { scheme: "https".to_string(), host: locale.host().to_string() }
    }

    /// An endpoint from a base URL such as `http://127.0.0.1:8080`.
    /// URLs without a scheme default to https.
    pub fn from_base_url(base_url: &str) -> Self {
        let (scheme, rest) = match base_url.split_once("://") {
            Some((scheme, rest)) => (scheme.to_string(), rest),
            None => ("https".to_string(), base_url),
        };
        let host = rest.split('/').next().unwrap_or_default().to_string();
        Self { scheme, host }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Signs requests with the secret key.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Builds the complete signed URL for one request.
    pub fn signed_url(
        &self,
        endpoint: &Endpoint,
        operation: &str,
        version: &str,
        params: &Params,
        timestamp: DateTime<Utc>,
    ) -> String {
        let query = self.canonical_query(operation, version, params, timestamp);
        let signature = self.signature(endpoint.host(), &query);

        format!(
            "{}{}?{}&Signature={}",
            endpoint.base_url(),
            REQUEST_PATH,
            query,
            urlencoding::encode(&signature)
        )
    }

    /// Merges reserved parameters into `params` and returns the canonical
    /// query string. Caller values for reserved keys are replaced and any
    /// caller `Signature` is dropped.
    pub fn canonical_query(
        &self,
        operation: &str,
        version: &str,
        params: &Params,
        timestamp: DateTime<Utc>,
    ) -> String {
        let mut all = params.clone();
        all.remove("Signature");
        all.insert("Service", SERVICE);
        all.insert("Operation", operation);
        all.insert("Version", version);
        all.insert("Timestamp", format_timestamp(timestamp));
        all.insert("AWSAccessKeyId", self.credentials.access_key());

        match self.credentials.associate_tag() {
            Some(tag) => {
                all.insert("AssociateTag", tag);
            }
            None => {
                all.remove("AssociateTag");
            }
        }

        build_query_string(&all)
    }

    /// Computes the base64 HMAC-SHA256 signature of the canonical request.
    pub fn signature(&self, host: &str, canonical_query: &str) -> String {
        let string_to_sign = format!("GET\n{}\n{}\n{}", host, REQUEST_PATH, canonical_query);

        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key().as_bytes())
            .expect("HMAC can take any size");
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Joins parameters as `key=value` pairs in key order, RFC 3986 encoded.
pub fn build_query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Formats a timestamp the way the provider expects it.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
