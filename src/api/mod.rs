//! Product Advertising API client.

pub mod client;
pub mod credentials;
pub mod locales;
pub mod operations;
pub mod paginator;
pub mod params;
pub mod response;
pub mod signer;
pub mod throttle;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use credentials::{Credentials, ExplicitSettings, ResolvedSettings};
pub use locales::Locale;
pub use operations::{Operation, Support};
pub use paginator::{PageSpec, Paginator};
pub use params::Params;
pub use response::{ProviderError, XmlResponse};
pub use signer::{Endpoint, RequestSigner};
pub use transport::{HttpTransport, RawResponse, Transport};
