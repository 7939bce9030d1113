//! Securities and their price series

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::SecurityId;

/// Shared handle to a security. Membership in the ledger is decided by
/// handle identity, never by comparing fields.
pub type SecurityRef = Arc<Security>;

/// A single historical quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPrice {
    pub date: NaiveDate,
    pub value: BigDecimal,
}

impl SecurityPrice {
    pub fn new(date: NaiveDate, value: BigDecimal) -> Self {
        Self { date, value }
    }
}

/// A tradable instrument
#[derive(Debug)]
pub struct Security {
    pub id: SecurityId,
    pub name: String,
    pub isin: Option<String>,
    pub ticker_symbol: Option<String>,
    pub currency_code: String,
    prices: RwLock<Vec<SecurityPrice>>,
}

impl Security {
    pub fn new(name: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            id: SecurityId::new(),
            name: name.into(),
            isin: None,
            ticker_symbol: None,
            currency_code: currency_code.into(),
            prices: RwLock::new(Vec::new()),
        }
    }

    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    pub fn with_ticker_symbol(mut self, ticker_symbol: impl Into<String>) -> Self {
        self.ticker_symbol = Some(ticker_symbol.into());
        self
    }

    /// Add a price to the series, keeping it sorted by date.
    ///
    /// A price for a date that already has one replaces it. Returns `true`
    /// when the series grew.
    pub fn add_price(&self, price: SecurityPrice) -> bool {
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        match prices.binary_search_by(|p| p.date.cmp(&price.date)) {
            Ok(index) => {
                prices[index] = price;
                false
            }
            Err(index) => {
                prices.insert(index, price);
                true
            }
        }
    }

    /// Snapshot of the price series in date order
    pub fn prices(&self) -> Vec<SecurityPrice> {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn latest_price(&self) -> Option<SecurityPrice> {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

/// Identity comparison of two optional security handles.
///
/// Two `None`s are not the same security, and neither is one `None`.
pub fn same_security(a: Option<&SecurityRef>, b: Option<&SecurityRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}
