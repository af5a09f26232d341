//! amz-product-api - Signed, rate-limited Amazon Product Advertising API client
//!
//! Builds HMAC-SHA256 signed REST requests, keeps calls under the
//! provider's request rate, and turns error payloads into typed errors.
//!
//! ```no_run
//! use amz_product_api::{ApiClient, Params};
//!
//! # async fn run() -> amz_product_api::Result<()> {
//! let client = ApiClient::new("ACCESS_KEY", "SECRET_KEY", "us", Some("mytag-20"))?;
//! let response = client
//!     .item_search("Books", Params::new().with("Title", "Harry Potter"))
//!     .await?;
//! for asin in response.texts("Items/Item/ASIN") {
//!     println!("{}", asin);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    ApiClient, ApiClientBuilder, Credentials, Locale, Operation, PageSpec, Paginator, Params, RawResponse,
    Transport, XmlResponse,
};
pub use config::{ClientOptions, ConfigFile, ConfigSource, EnvSource};
pub use error::{ApiError, AwsErrorKind, Result};
