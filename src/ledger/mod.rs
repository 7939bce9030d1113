//! Ledger model: securities, accounts, portfolios, plans and cross entries

pub mod account;
pub mod client;
pub mod cross_entry;
pub mod plan;
pub mod portfolio;
pub mod security;
pub mod transaction;

pub use account::*;
pub use client::*;
pub use cross_entry::*;
pub use plan::*;
pub use portfolio::*;
pub use security::*;
pub use transaction::*;
