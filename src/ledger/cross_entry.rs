//! Cross entries: two transactions that form one economic event
//!
//! Uncommitted entries ([`BuySellEntry`], [`AccountTransferEntry`],
//! [`PortfolioTransferEntry`]) own both halves. Binding moves the halves
//! into their account/portfolio and leaves a [`CrossEntry`] on the client
//! that refers to them by handle; each half points back at it by id.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ledger::{AccountTransaction, Client, PortfolioTransaction, SecurityRef};
use crate::types::*;
use crate::utils::validation;

/// A committed pair of linked transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossEntry {
    /// Security leg plus cash leg of a trade
    BuySell {
        portfolio: TransactionRef,
        account: TransactionRef,
    },
    AccountTransfer {
        source: TransactionRef,
        target: TransactionRef,
    },
    PortfolioTransfer {
        source: TransactionRef,
        target: TransactionRef,
    },
}

impl CrossEntry {
    /// Both halves, security/source side first
    pub fn halves(&self) -> (TransactionRef, TransactionRef) {
        match *self {
            CrossEntry::BuySell { portfolio, account } => (portfolio, account),
            CrossEntry::AccountTransfer { source, target }
            | CrossEntry::PortfolioTransfer { source, target } => (source, target),
        }
    }

    /// The other half of the pair, if `transaction` is one of its halves
    pub fn cross_transaction(&self, transaction: TransactionId) -> Option<TransactionRef> {
        let (a, b) = self.halves();
        if a.transaction == transaction {
            Some(b)
        } else if b.transaction == transaction {
            Some(a)
        } else {
            None
        }
    }
}

/// Uncommitted purchase or sale: security leg plus cash leg
#[derive(Debug, Clone)]
pub struct BuySellEntry {
    pub portfolio_transaction: PortfolioTransaction,
    pub account_transaction: AccountTransaction,
}

impl BuySellEntry {
    /// Create a trade. `buy` selects between a purchase and a sale.
    pub fn new(
        buy: bool,
        date_time: NaiveDateTime,
        security: SecurityRef,
        amount: Money,
        shares: BigDecimal,
    ) -> Self {
        let (portfolio_type, account_type) = if buy {
            (PortfolioTransactionType::Buy, AccountTransactionType::Buy)
        } else {
            (PortfolioTransactionType::Sell, AccountTransactionType::Sell)
        };

        Self {
            portfolio_transaction: PortfolioTransaction::new(
                date_time,
                portfolio_type,
                amount.clone(),
                shares,
                security.clone(),
            ),
            account_transaction: AccountTransaction::new(date_time, account_type, amount)
                .with_security(security),
        }
    }

    /// Set the note on both legs
    pub fn set_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.account_transaction.note = Some(note.clone());
        self.portfolio_transaction.note = Some(note);
    }

    /// Fees, taxes and gross value live on the security leg
    pub fn add_unit(&mut self, unit: TransactionUnit) {
        self.portfolio_transaction.units.push(unit);
    }
}

/// Uncommitted cash transfer between two accounts
#[derive(Debug, Clone)]
pub struct AccountTransferEntry {
    pub source_transaction: AccountTransaction,
    pub target_transaction: AccountTransaction,
}

impl AccountTransferEntry {
    pub fn new(date_time: NaiveDateTime, amount: Money) -> Self {
        Self {
            source_transaction: AccountTransaction::new(
                date_time,
                AccountTransactionType::TransferOut,
                amount.clone(),
            ),
            target_transaction: AccountTransaction::new(
                date_time,
                AccountTransactionType::TransferIn,
                amount,
            ),
        }
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.source_transaction.note = Some(note.clone());
        self.target_transaction.note = Some(note);
    }
}

/// Uncommitted share transfer between two portfolios
#[derive(Debug, Clone)]
pub struct PortfolioTransferEntry {
    pub source_transaction: PortfolioTransaction,
    pub target_transaction: PortfolioTransaction,
}

impl PortfolioTransferEntry {
    pub fn new(
        date_time: NaiveDateTime,
        security: SecurityRef,
        amount: Money,
        shares: BigDecimal,
    ) -> Self {
        Self {
            source_transaction: PortfolioTransaction::new(
                date_time,
                PortfolioTransactionType::TransferOut,
                amount.clone(),
                shares.clone(),
                security.clone(),
            ),
            target_transaction: PortfolioTransaction::new(
                date_time,
                PortfolioTransactionType::TransferIn,
                amount,
                shares,
                security,
            ),
        }
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.source_transaction.note = Some(note.clone());
        self.target_transaction.note = Some(note);
    }
}

/// Commit a trade into `account` and `portfolio` as one cross entry.
///
/// Nothing is appended unless both owners exist and the legs agree.
pub fn bind_buy_sell(
    client: &mut Client,
    entry: BuySellEntry,
    account: AccountId,
    portfolio: PortfolioId,
) -> LedgerResult<CrossEntryId> {
    validation::validate_buy_sell_entry(&entry)?;

    let BuySellEntry {
        mut portfolio_transaction,
        mut account_transaction,
    } = entry;

    let id = CrossEntryId::new();
    portfolio_transaction.cross_entry = Some(id);
    account_transaction.cross_entry = Some(id);

    let cross_entry = CrossEntry::BuySell {
        portfolio: TransactionRef::portfolio(portfolio, portfolio_transaction.id),
        account: TransactionRef::account(account, account_transaction.id),
    };

    client.commit_pair(
        id,
        cross_entry,
        Half::Portfolio(portfolio, portfolio_transaction),
        Half::Account(account, account_transaction),
    )?;
    Ok(id)
}

/// Commit a cash transfer from `source` to `target` as one cross entry.
pub fn bind_account_transfer(
    client: &mut Client,
    entry: AccountTransferEntry,
    source: AccountId,
    target: AccountId,
) -> LedgerResult<CrossEntryId> {
    validation::validate_account_transfer(&entry, source, target)?;

    let AccountTransferEntry {
        mut source_transaction,
        mut target_transaction,
    } = entry;

    let id = CrossEntryId::new();
    source_transaction.cross_entry = Some(id);
    target_transaction.cross_entry = Some(id);

    let cross_entry = CrossEntry::AccountTransfer {
        source: TransactionRef::account(source, source_transaction.id),
        target: TransactionRef::account(target, target_transaction.id),
    };

    client.commit_pair(
        id,
        cross_entry,
        Half::Account(source, source_transaction),
        Half::Account(target, target_transaction),
    )?;
    Ok(id)
}

/// Commit a share transfer from `source` to `target` as one cross entry.
pub fn bind_portfolio_transfer(
    client: &mut Client,
    entry: PortfolioTransferEntry,
    source: PortfolioId,
    target: PortfolioId,
) -> LedgerResult<CrossEntryId> {
    validation::validate_portfolio_transfer(&entry, source, target)?;

    let PortfolioTransferEntry {
        mut source_transaction,
        mut target_transaction,
    } = entry;

    let id = CrossEntryId::new();
    source_transaction.cross_entry = Some(id);
    target_transaction.cross_entry = Some(id);

    let cross_entry = CrossEntry::PortfolioTransfer {
        source: TransactionRef::portfolio(source, source_transaction.id),
        target: TransactionRef::portfolio(target, target_transaction.id),
    };

    client.commit_pair(
        id,
        cross_entry,
        Half::Portfolio(source, source_transaction),
        Half::Portfolio(target, target_transaction),
    )?;
    Ok(id)
}

/// One half of a pair on its way into the ledger
pub(crate) enum Half {
    Account(AccountId, AccountTransaction),
    Portfolio(PortfolioId, PortfolioTransaction),
}

impl Half {
    pub(crate) fn reference(&self) -> TransactionRef {
        match self {
            Half::Account(account, t) => TransactionRef::account(*account, t.id),
            Half::Portfolio(portfolio, t) => TransactionRef::portfolio(*portfolio, t.id),
        }
    }
}
