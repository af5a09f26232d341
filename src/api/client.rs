//! The API client: one method per provider operation, all routed through
//! signing, throttling, transport and classification.

use crate::api::credentials::{self, Credentials, ExplicitSettings};
use crate::api::locales::Locale;
use crate::api::operations::Operation;
use crate::api::paginator::{PageSpec, Paginator};
use crate::api::params::Params;
use crate::api::response::{self, XmlResponse};
use crate::api::signer::{Endpoint, RequestSigner};
use crate::api::throttle::{self, RateLimiter};
use crate::api::transport::{HttpTransport, RawResponse, Transport};
use crate::config::{ClientOptions, ConfigFile, ConfigSource, EnvSource};
use crate::error::{ApiError, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Signed, throttled Product Advertising API client.
///
/// One client may be shared between tasks; its rate limiter serializes
/// requests so the configured interval holds across all of them.
pub struct ApiClient {
    signer: RequestSigner,
    locale: Locale,
    endpoint: Endpoint,
    api_version: String,
    requests_per_second: f64,
    limiter: RateLimiter,
    transport: Arc<dyn Transport>,
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    explicit: ExplicitSettings,
    sources: Vec<Box<dyn ConfigSource>>,
    options: ClientOptions,
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    pub fn access_key(mut self, access_key: impl Into<String>) -> Self {
        self.explicit.access_key = Some(access_key.into());
        self
    }

    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.explicit.secret_key = Some(secret_key.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.explicit.locale = Some(locale.into());
        self
    }

    pub fn associate_tag(mut self, tag: impl Into<String>) -> Self {
        self.explicit.associate_tag = Some(tag.into());
        self
    }

    /// Adds a fallback source. Sources are consulted in the order added,
    /// after the explicit values.
    pub fn config_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.options.api_version = version.into();
        self
    }

    pub fn requests_per_second(mut self, requests_per_second: f64) -> Self {
        self.options.requests_per_second = requests_per_second;
        self
    }

    /// Sends requests to `base_url` instead of the locale's host.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Uses a custom transport instead of the HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Resolves credentials and locale and creates the client.
    pub fn build(self) -> Result<ApiClient> {
        let sources: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
        let resolved = credentials::resolve(&self.explicit, &sources)?;
        throttle::check_rate(self.options.requests_per_second)?;

        let endpoint = match &self.base_url {
            Some(url) => Endpoint::from_base_url(url),
            None => Endpoint::for_locale(resolved.locale),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.options)?),
        };

        debug!(
            "Client for locale {} at {} (version {}, {} req/s)",
            resolved.locale,
            endpoint.base_url(),
            self.options.api_version,
            self.options.requests_per_second
        );

        Ok(ApiClient {
            signer: RequestSigner::new(resolved.credentials),
            locale: resolved.locale,
            endpoint,
            api_version: self.options.api_version,
            requests_per_second: self.options.requests_per_second,
            limiter: RateLimiter::new(),
            transport,
        })
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Creates a client from explicit credentials.
    pub fn new(
        access_key: &str,
        secret_key: &str,
        locale: &str,
        associate_tag: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Self::builder().access_key(access_key).secret_key(secret_key).locale(locale);
        if let Some(tag) = associate_tag {
            builder = builder.associate_tag(tag);
        }
        builder.build()
    }

    /// Creates a client from environment variables, then the first config
    /// file found in the default locations.
    pub fn from_default_config() -> Result<Self> {
        let file = ConfigFile::load(None).map_err(|e| ApiError::Config(format!("{:#}", e)))?;
        let options = file.options().map_err(|e| ApiError::Config(format!("{:#}", e)))?;

        Self::builder().options(options).config_source(EnvSource).config_source(file).build()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn credentials(&self) -> &Credentials {
        self.signer.credentials()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn set_api_version(&mut self, version: impl Into<String>) {
        self.api_version = version.into();
    }

    pub fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    /// Changes the rate ceiling; applies from the next call on.
    pub fn set_requests_per_second(&mut self, requests_per_second: f64) -> Result<()> {
        throttle::check_rate(requests_per_second)?;
        self.requests_per_second = requests_per_second;
        Ok(())
    }

    /// Builds a signed URL, timestamped now.
    pub fn build_url(&self, operation: Operation, params: &Params) -> String {
        self.signer.signed_url(&self.endpoint, operation.name(), &self.api_version, params, Utc::now())
    }

    /// Throttles, then issues a GET for `url`.
    pub async fn fetch(&self, url: &str) -> Result<RawResponse> {
        self.limiter.throttle(self.requests_per_second).await;
        self.send(url).await
    }

    async fn send(&self, url: &str) -> Result<RawResponse> {
        debug!("GET {}", url);
        self.transport.fetch(url).await
    }

    /// Calls any operation with raw parameters.
    pub async fn call(&self, operation: Operation, params: Params) -> Result<XmlResponse> {
        if operation.is_deprecated() {
            return Err(ApiError::DeprecatedOperation(operation));
        }

        info!("Calling {} ({})", operation, self.locale);
        // Sign after the wait so queued calls carry a fresh timestamp.
        self.limiter.throttle(self.requests_per_second).await;
        let url = self.build_url(operation, &params);
        let raw = self.send(&url).await?;
        response::classify(raw.status, raw.body)
    }

    /// Pages through the results of `operation`.
    pub fn paginate(&self, operation: Operation, params: Params, spec: PageSpec) -> Paginator<'_> {
        Paginator::new(self, operation, params, spec)
    }

    /// Searches a search index (`Books`, `All`, ...).
    pub async fn item_search(&self, search_index: &str, params: Params) -> Result<XmlResponse> {
        self.call(Operation::ItemSearch, params.with("SearchIndex", search_index)).await
    }

    /// Looks up an item by ASIN, or by another id type via `IdType`.
    pub async fn item_lookup(&self, item_id: &str, params: Params) -> Result<XmlResponse> {
        self.call(Operation::ItemLookup, params.with("ItemId", item_id)).await
    }

    /// Finds items similar to all of the given ASINs.
    pub async fn similarity_lookup(&self, asins: &[&str], params: Params) -> Result<XmlResponse> {
        self.call(Operation::SimilarityLookup, params.with("ItemId", asins.join(","))).await
    }

    pub async fn browse_node_lookup(
        &self,
        browse_node_id: &str,
        response_group: Option<&str>,
    ) -> Result<XmlResponse> {
        let mut params = Params::new().with("BrowseNodeId", browse_node_id);
        if let Some(group) = response_group {
            params.insert("ResponseGroup", group);
        }
        self.call(Operation::BrowseNodeLookup, params).await
    }

    /// Creates a remote cart holding `(asin, quantity)` items.
    pub async fn cart_create(&self, items: &[(&str, u32)], params: Params) -> Result<XmlResponse> {
        self.call(Operation::CartCreate, with_items(params, "ASIN", items)).await
    }

    pub async fn cart_add(
        &self,
        cart_id: &str,
        hmac: &str,
        items: &[(&str, u32)],
        params: Params,
    ) -> Result<XmlResponse> {
        let params = with_cart(params, cart_id, hmac);
        self.call(Operation::CartAdd, with_items(params, "ASIN", items)).await
    }

    /// Changes quantities of `(cart_item_id, quantity)` entries; quantity 0 removes.
    pub async fn cart_modify(
        &self,
        cart_id: &str,
        hmac: &str,
        items: &[(&str, u32)],
        params: Params,
    ) -> Result<XmlResponse> {
        let params = with_cart(params, cart_id, hmac);
        self.call(Operation::CartModify, with_items(params, "CartItemId", items)).await
    }

    pub async fn cart_get(&self, cart_id: &str, hmac: &str, params: Params) -> Result<XmlResponse> {
        self.call(Operation::CartGet, with_cart(params, cart_id, hmac)).await
    }

    pub async fn cart_clear(&self, cart_id: &str, hmac: &str, params: Params) -> Result<XmlResponse> {
        self.call(Operation::CartClear, with_cart(params, cart_id, hmac)).await
    }

    // Retired operations. Each fails with `DeprecatedOperation` without
    // sending a request.

    pub async fn customer_content_lookup(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::CustomerContentLookup, params).await
    }

    pub async fn customer_content_search(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::CustomerContentSearch, params).await
    }

    pub async fn help(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::Help, params).await
    }

    pub async fn list_lookup(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::ListLookup, params).await
    }

    pub async fn list_search(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::ListSearch, params).await
    }

    pub async fn tag_lookup(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::TagLookup, params).await
    }

    pub async fn transaction_lookup(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::TransactionLookup, params).await
    }

    pub async fn vehicle_part_lookup(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::VehiclePartLookup, params).await
    }

    pub async fn vehicle_part_search(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::VehiclePartSearch, params).await
    }

    pub async fn vehicle_search(&self, params: Params) -> Result<XmlResponse> {
        self.call(Operation::VehicleSearch, params).await
    }
}

fn with_cart(params: Params, cart_id: &str, hmac: &str) -> Params {
    params.with("CartId", cart_id).with("HMAC", hmac)
}

/// Adds `Item.N.<id_key>` / `Item.N.Quantity` pairs, numbered from 1.
fn with_items(mut params: Params, id_key: &str, items: &[(&str, u32)]) -> Params {
    for (n, (id, quantity)) in items.iter().enumerate() {
        params.insert(format!("Item.{}.{}", n + 1, id_key), id);
        params.insert(format!("Item.{}.Quantity", n + 1), quantity);
    }
    params
}
