//! Product catalog collaborator
//!
//! The ledger never talks to the catalog itself. A [`CatalogService`] resolves a
//! product id to the sizes and colors it comes in plus a suggested base price;
//! the order-entry controller runs those lookups and hands the results back to
//! the ledger.

use crate::error::{CatalogError, ConfigError};
use crate::numeric::{RawInput, normalize_price};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Sizes stocked when a catalog entry lists none
const DEFAULT_SIZES: [&str; 4] = ["S", "M", "L", "XL"];
/// Colors stocked when a catalog entry lists none
const DEFAULT_COLORS: [&str; 2] = ["Blanco", "Negro"];

/// What the catalog offers for one product
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductOptions {
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// Suggested unit price, if the catalog has a positive one
    pub base_price: Option<Decimal>,
}

impl ProductOptions {
    pub fn new(sizes: &[&str], colors: &[&str], base_price: Option<Decimal>) -> Self {
        ProductOptions {
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            colors: colors.iter().map(|c| c.to_string()).collect(),
            base_price,
        }
    }
}

/// Resolves product ids to their options
#[async_trait]
pub trait CatalogService: Send + Sync + 'static {
    async fn product_options(&self, product_id: &str) -> Result<ProductOptions, CatalogError>;
}

/// Body of the product-detail endpoint.
/// Older pages read `tallas`/`colores`, the server sends the `_disponibles` names.
#[derive(Deserialize)]
struct ProductDetailPayload {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "tallas")]
    tallas_disponibles: Option<Vec<String>>,
    #[serde(default, alias = "colores")]
    colores_disponibles: Option<Vec<String>>,
    #[serde(default)]
    precio_base: Option<Value>,
}

/// Parse a product-detail response body
///
/// # Arguments
/// * `body` - JSON text returned by the catalog service
///
/// # Returns
/// * `Result<ProductOptions, CatalogError>` - The offered options, `Rejected`
///   when the body carries `success: false` or an `error`, `Malformed` when it
///   is not the expected JSON
pub fn parse_product_detail(body: &str) -> Result<ProductOptions, CatalogError> {
    let payload: ProductDetailPayload =
        serde_json::from_str(body).map_err(|e| CatalogError::Malformed(e.to_string()))?;

    if payload.success == Some(false) || payload.error.is_some() {
        return Err(CatalogError::Rejected(
            payload
                .error
                .unwrap_or_else(|| "unsuccessful response".to_string()),
        ));
    }

    Ok(ProductOptions {
        sizes: payload.tallas_disponibles.unwrap_or_default(),
        colors: payload.colores_disponibles.unwrap_or_default(),
        base_price: base_price_from_json(payload.precio_base.as_ref()),
    })
}

fn base_price_from_json(value: Option<&Value>) -> Option<Decimal> {
    let price = match value? {
        Value::Number(number) => {
            let text = number.to_string();
            let parsed = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()?;
            normalize_price(RawInput::Decimal(parsed))
        }
        Value::String(text) => normalize_price(RawInput::Text(text)),
        _ => return None,
    };

    if price > Decimal::ZERO { Some(price) } else { None }
}

/// One product in a catalog file
#[derive(Deserialize)]
struct CatalogEntry {
    id: String,
    #[serde(default)]
    precio_base: Option<Value>,
    #[serde(default)]
    tallas_disponibles: Option<Vec<String>>,
    #[serde(default)]
    colores_disponibles: Option<Vec<String>>,
}

/// In-memory catalog
///
/// Used when the order page runs without the backend, and by tests.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: HashMap<String, ProductOptions>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product_id: &str, options: ProductOptions) -> Self {
        self.insert(product_id, options);
        self
    }

    pub fn insert(&mut self, product_id: &str, options: ProductOptions) {
        self.products.insert(product_id.to_string(), options);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load a catalog from a JSON array of products
    ///
    /// Each entry needs an `id`; `precio_base`, `tallas_disponibles` and
    /// `colores_disponibles` are optional. Missing size or color lists fall back
    /// to the stock defaults (S, M, L, XL / Blanco, Negro).
    ///
    /// # Examples
    /// ```no_run
    /// use order_ledger::catalog::StaticCatalog;
    ///
    /// match StaticCatalog::from_json_file("productos.json") {
    ///     Ok(catalog) => println!("Loaded {} products", catalog.len()),
    ///     Err(e) => eprintln!("Error loading catalog: {}", e),
    /// }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(text)?;
        let mut catalog = StaticCatalog::new();

        for entry in entries {
            let sizes = entry
                .tallas_disponibles
                .filter(|sizes| !sizes.is_empty())
                .unwrap_or_else(|| DEFAULT_SIZES.iter().map(|s| s.to_string()).collect());
            let colors = entry
                .colores_disponibles
                .filter(|colors| !colors.is_empty())
                .unwrap_or_else(|| DEFAULT_COLORS.iter().map(|c| c.to_string()).collect());

            catalog.insert(
                &entry.id,
                ProductOptions {
                    sizes,
                    colors,
                    base_price: base_price_from_json(entry.precio_base.as_ref()),
                },
            );
        }

        Ok(catalog)
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn product_options(&self, product_id: &str) -> Result<ProductOptions, CatalogError> {
        self.products
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(product_id.to_string()))
    }
}

#[cfg(feature = "http")]
pub use http::HttpCatalog;

#[cfg(feature = "http")]
mod http {
    use super::{CatalogService, ProductOptions, parse_product_detail};
    use crate::error::CatalogError;
    use async_trait::async_trait;
    use reqwest::{Client, StatusCode, Url, header};
    use std::time::Duration;

    /// Catalog backed by the order backend's product-detail endpoint
    /// (`GET {base_url}/{product_id}`)
    pub struct HttpCatalog {
        client: Client,
        base_url: Url,
        session_cookie: Option<String>,
    }

    impl HttpCatalog {
        /// # Arguments
        /// * `base_url` - Endpoint the product id is appended to
        /// * `timeout` - Upper bound for a whole lookup
        /// * `session_cookie` - Sent as the `Cookie` header when the backend requires a login
        pub fn new(
            base_url: &str,
            timeout: Duration,
            session_cookie: Option<String>,
        ) -> Result<Self, CatalogError> {
            let base_url = Url::parse(base_url)
                .map_err(|e| CatalogError::Transport(format!("invalid catalog url: {}", e)))?;
            if base_url.cannot_be_a_base() {
                return Err(CatalogError::Transport(format!(
                    "catalog url {} can not take a product path",
                    base_url
                )));
            }
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            Ok(Self {
                client,
                base_url,
                session_cookie,
            })
        }

        pub fn product_url(&self, product_id: &str) -> Url {
            let mut url = self.base_url.clone();
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(product_id);
            }
            url
        }
    }

    #[async_trait]
    impl CatalogService for HttpCatalog {
        async fn product_options(&self, product_id: &str) -> Result<ProductOptions, CatalogError> {
            let url = self.product_url(product_id);
            log::debug!("fetching product options from {}", url);

            let mut request = self
                .client
                .get(url)
                .header(header::ACCEPT, "application/json");
            if let Some(cookie) = &self.session_cookie {
                request = request.header(header::COOKIE, cookie.as_str());
            }

            let response = request
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            match response.status() {
                StatusCode::NOT_FOUND => return Err(CatalogError::NotFound(product_id.to_string())),
                status if !status.is_success() => {
                    return Err(CatalogError::Status(status.as_u16()));
                }
                _ => {}
            }

            let body = response
                .text()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;
            parse_product_detail(&body)
        }
    }

}
