//! Reference datasets served alongside the engines
//!
//! - `FundamentalsBook`: per-ticker fundamentals and last price, the input of
//!   `GET /api/v1/dcf?ticker=...`
//! - `ProductCatalog`: elasticity estimates per SKU for the pricing dashboard
//!
//! Both are read once at startup from TOML files. Live market-data providers
//! plug in behind [`FundamentalsSource`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use valuation_core::dcf::Fundamentals;
use valuation_core::elasticity::{CategoryFilter, ElasticityProduct};

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn read_toml<T>(path: &Path) -> Result<T, DatasetError>
where
    T: for<'de> Deserialize<'de>,
{
    let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Normalise a ticker symbol the way lookups expect it.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Fundamentals and market quote for one listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerData {
    /// Last traded price
    pub price: f64,
    /// Quote currency
    #[serde(default = "default_currency")]
    pub currency: String,
    pub ebit: f64,
    pub tax_rate: f64,
    pub d_and_a: f64,
    /// As reported; usually negative
    pub capex: f64,
    #[serde(default)]
    pub change_nwc: f64,
    pub total_cash: f64,
    pub total_debt: f64,
    pub shares: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl TickerData {
    /// Fundamentals as consumed by the DCF engine.
    pub fn fundamentals(&self) -> Fundamentals {
        Fundamentals {
            ebit: self.ebit,
            tax_rate: self.tax_rate,
            d_and_a: self.d_and_a,
            capex: self.capex,
            change_nwc: self.change_nwc,
            total_cash: self.total_cash,
            total_debt: self.total_debt,
            shares: self.shares,
        }
    }
}

/// Source of raw company data for the DCF endpoint.
pub trait FundamentalsSource: Send + Sync {
    /// Look up a ticker; `None` when the source has no data for it.
    fn lookup(&self, ticker: &str) -> Option<TickerData>;

    /// Number of tickers held, when the source knows it up front.
    fn ticker_count(&self) -> Option<usize> {
        None
    }
}

/// In-memory fundamentals keyed by normalised ticker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundamentalsBook {
    #[serde(default)]
    tickers: HashMap<String, TickerData>,
}

impl FundamentalsBook {
    /// Load from a TOML file with one `[tickers.SYMBOL]` table per company.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let raw: FundamentalsBook = read_toml(path)?;
        Ok(raw.tickers.into_iter().collect())
    }

    /// Load from `path`, or start empty when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Insert or replace a ticker.
    pub fn insert(&mut self, ticker: &str, data: TickerData) {
        self.tickers.insert(normalize_ticker(ticker), data);
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl FromIterator<(String, TickerData)> for FundamentalsBook {
    fn from_iter<I: IntoIterator<Item = (String, TickerData)>>(iter: I) -> Self {
        let mut book = FundamentalsBook::default();
        for (ticker, data) in iter {
            book.insert(&ticker, data);
        }
        book
    }
}

impl FundamentalsSource for FundamentalsBook {
    fn lookup(&self, ticker: &str) -> Option<TickerData> {
        self.tickers.get(&normalize_ticker(ticker)).cloned()
    }

    fn ticker_count(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// Elasticity estimates for the product range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    products: Vec<ElasticityProduct>,
}

impl ProductCatalog {
    pub fn new(products: Vec<ElasticityProduct>) -> Self {
        Self { products }
    }

    /// Load from a TOML file with one `[[products]]` entry per SKU.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        read_toml(path)
    }

    /// Load from `path`, or start empty when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Products matching `filter`, in catalog order.
    pub fn filter<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a ElasticityProduct> + 'a {
        self.products.iter().filter(move |p| filter.matches(p))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
