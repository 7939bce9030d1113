//! # Portfolio Ledger Core
//!
//! Insertion and reconciliation engine that merges imported transactions
//! into a portfolio ledger of securities, cash accounts, portfolios and
//! investment plans.
//!
//! ## Features
//!
//! - **Security registry**: every security referenced by a committed transaction is part of the ledger
//! - **Cross entries**: trades and transfers are committed as two linked halves or not at all
//! - **Investment plan reconciliation**: imported plan executions update the generated transaction
//! - **Import policies**: dividend removal and buy/sell to delivery conversion
//! - **Batch reports**: per-record failures are collected instead of aborting the import
//!
//! ## Quick Start
//!
//! ```rust
//! use portfolio_ledger_core::{Account, Client, ImportItem, ImportPolicy, InsertAction, Security};
//! use std::sync::Arc;
//!
//! let mut client = Client::new("EUR");
//! let _cash = client.add_account(Account::new("Cash", "EUR"));
//!
//! let action = InsertAction::new(ImportPolicy::default().with_remove_dividends(true));
//! let security = Arc::new(Security::new("ACME Corp", "EUR"));
//! let report = action
//!     .process_all(&mut client, vec![ImportItem::Security(security)])
//!     .unwrap();
//! assert_eq!(report.securities_registered, 1);
//! ```

pub mod import;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use import::*;
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
