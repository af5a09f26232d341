//! Error types for Product Advertising API calls.
//!
//! Every failure is surfaced as an [`ApiError`]. Provider errors keep the
//! raw error code and message so callers can log or inspect them.

use crate::api::operations::Operation;
use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while building, sending or classifying API requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Locale missing from every source, or not a supported marketplace.
    #[error("Unknown locale '{}'. Valid locales: us, uk, de, fr, jp, ca, it, es, cn, in, br, mx", .0.as_deref().unwrap_or("<missing>"))]
    UnknownLocale(Option<String>),

    /// A required credential key was not found in any source.
    #[error("Missing credential '{0}'")]
    MissingCredentials(&'static str),

    /// Name that matches no known operation.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    /// The operation was retired by the provider and is refused locally.
    #[error("{0} has been deprecated and is no longer supported")]
    DeprecatedOperation(Operation),

    /// The provider rejected the access key.
    #[error("Invalid client token id: {message}")]
    InvalidClientTokenId { message: String },

    /// The provider is throttling requests from this account.
    #[error("Too many requests: {message}")]
    TooManyRequests { message: String },

    /// An error code reported in the provider's XML body.
    #[error("{code}: {message}")]
    Aws {
        kind: AwsErrorKind,
        code: String,
        message: String,
    },

    /// Non-success status without a recognizable error payload.
    #[error("Request failed with status {status}")]
    Http { status: u16, body: String },

    /// Network-level failure before a response was received.
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A success response whose body is not well-formed XML.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Config file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Known provider error codes, grouped the way callers usually react to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsErrorKind {
    InvalidSignature,
    InvalidParameterValue,
    InvalidSearchIndex,
    InvalidResponseGroup,
    InvalidParameterCombination,
    NotEnoughParameters,
    NoExactMatchesFound,
    NoSimilarityForAsin,
    ItemNotAccessible,
    CartInfoMismatch,
    ItemAlreadyInCart,
    Other,
}

impl ApiError {
    /// Wraps a network failure for the given URL.
    pub fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Transport { url: url.into(), source: Box::new(source) }
    }

    /// Returns the provider error code, if this error came from the provider.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::InvalidClientTokenId { .. } => Some("InvalidClientTokenId"),
            ApiError::TooManyRequests { .. } => Some("RequestThrottled"),
            ApiError::Aws { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the provider error kind for `Aws` errors.
    pub fn kind(&self) -> Option<AwsErrorKind> {
        match self {
            ApiError::Aws { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
