use crate::error::ConfigError;
use crate::money::CurrencyFormat;
use crate::totals::TotalsPolicy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_CATALOG_URL: &str = "ORDER_LEDGER_CATALOG_URL";
const ENV_CATALOG_FILE: &str = "ORDER_LEDGER_CATALOG_FILE";
const ENV_FETCH_TIMEOUT_MS: &str = "ORDER_LEDGER_FETCH_TIMEOUT_MS";
const ENV_MAX_ROWS: &str = "ORDER_LEDGER_MAX_ROWS";

/// Settings for an order-entry session
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Product-detail endpoint; the product id is appended as a path segment
    pub catalog_url: String,

    /// JSON product list to use instead of the HTTP catalog
    pub catalog_file: Option<PathBuf>,

    /// `Cookie` header forwarded to the catalog service
    pub session_cookie: Option<String>,

    /// Catalog request timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Row cap for a single order, unlimited when absent
    pub max_rows: Option<usize>,

    pub tax_percent: Decimal,
    pub profit_percent: Decimal,

    pub currency: CurrencyFormat,
}

impl Default for OrderConfig {
    fn default() -> Self {
        let policy = TotalsPolicy::default();
        Self {
            catalog_url: "http://127.0.0.1:5000/pedidos/api/producto".to_string(),
            catalog_file: None,
            session_cookie: None,
            fetch_timeout_ms: 5000,
            max_rows: None,
            tax_percent: policy.tax_percent,
            profit_percent: policy.profit_percent,
            currency: CurrencyFormat::default(),
        }
    }
}

impl OrderConfig {
    /// Load configuration
    ///
    /// Reads the JSON file when a path is given (defaults otherwise), then applies
    /// `ORDER_LEDGER_*` environment overrides.
    ///
    /// # Arguments
    /// * `path` - Optional path to a JSON configuration file
    ///
    /// # Returns
    /// * `Result<OrderConfig, ConfigError>` - The merged configuration, or an
    ///   error if the file can not be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    /// Numeric values that do not parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog_url = url;
        }
        if let Some(file) = lookup(ENV_CATALOG_FILE) {
            self.catalog_file = Some(PathBuf::from(file));
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_MS) {
            match value.trim().parse() {
                Ok(ms) => self.fetch_timeout_ms = ms,
                Err(_) => log::warn!("ignoring {}={}: not a number", ENV_FETCH_TIMEOUT_MS, value),
            }
        }
        if let Some(value) = lookup(ENV_MAX_ROWS) {
            match value.trim().parse() {
                Ok(max) => self.max_rows = Some(max),
                Err(_) => log::warn!("ignoring {}={}: not a number", ENV_MAX_ROWS, value),
            }
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn totals_policy(&self) -> TotalsPolicy {
        TotalsPolicy {
            tax_percent: self.tax_percent,
            profit_percent: self.profit_percent,
        }
    }
}
