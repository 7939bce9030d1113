//! Insert action: commits imported records into a client

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::import::policy::{self, ImportPolicy};
use crate::import::registry::ensure_registered;
use crate::ledger::{
    bind_account_transfer, bind_buy_sell, bind_portfolio_transfer, AccountTransaction,
    AccountTransferEntry, BuySellEntry, Client, PortfolioTransaction, PortfolioTransferEntry,
    SecurityPrice, SecurityRef,
};
use crate::reconciliation::{PlanReconciler, Reconciliation};
use crate::traits::PlanTransactionMatcher;
use crate::types::*;
use crate::utils::validation;

/// One record produced by the extraction stage, with its target owners
#[derive(Debug, Clone)]
pub enum ImportItem {
    Security(SecurityRef),
    SecurityPrice {
        security: SecurityRef,
        price: SecurityPrice,
    },
    AccountTransaction {
        transaction: AccountTransaction,
        account: AccountId,
    },
    PortfolioTransaction {
        transaction: PortfolioTransaction,
        portfolio: PortfolioId,
    },
    BuySell {
        entry: BuySellEntry,
        account: AccountId,
        portfolio: PortfolioId,
    },
    AccountTransfer {
        entry: AccountTransferEntry,
        source: AccountId,
        target: AccountId,
    },
    PortfolioTransfer {
        entry: PortfolioTransferEntry,
        source: PortfolioId,
        target: PortfolioId,
    },
}

impl ImportItem {
    pub fn kind(&self) -> &'static str {
        match self {
            ImportItem::Security(_) => "security",
            ImportItem::SecurityPrice { .. } => "security_price",
            ImportItem::AccountTransaction { .. } => "account_transaction",
            ImportItem::PortfolioTransaction { .. } => "portfolio_transaction",
            ImportItem::BuySell { .. } => "buy_sell",
            ImportItem::AccountTransfer { .. } => "account_transfer",
            ImportItem::PortfolioTransfer { .. } => "portfolio_transfer",
        }
    }
}

/// What processing a single record did to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// `newly_added` is false when the security was already known
    Registered { newly_added: bool },
    /// `new_date` is false when an existing quote was replaced
    PriceAdded { new_date: bool },
    Inserted(TransactionRef),
    InsertedWithRemoval {
        dividend: TransactionRef,
        removal: TransactionRef,
    },
    Linked(CrossEntryId),
    Reconciled {
        plan: PlanId,
        transaction: TransactionRef,
    },
    ConvertedToDelivery(TransactionRef),
}

/// Applies import records to a client under a fixed [`ImportPolicy`]
pub struct InsertAction {
    policy: ImportPolicy,
    reconciler: PlanReconciler,
}

impl InsertAction {
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            policy,
            reconciler: PlanReconciler::new(),
        }
    }

    /// Use a custom matcher for investment plan reconciliation
    pub fn with_matcher(policy: ImportPolicy, matcher: Box<dyn PlanTransactionMatcher>) -> Self {
        Self {
            policy,
            reconciler: PlanReconciler::with_matcher(matcher),
        }
    }

    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    /// Process one record
    pub fn process(&self, client: &mut Client, item: ImportItem) -> LedgerResult<InsertOutcome> {
        debug!(kind = item.kind(), "Processing import item");

        match item {
            ImportItem::Security(security) => Ok(self.insert_security(client, &security)),
            ImportItem::SecurityPrice { security, price } => {
                Ok(self.insert_price(&security, price))
            }
            ImportItem::AccountTransaction {
                transaction,
                account,
            } => self.insert_account_transaction(client, transaction, account),
            ImportItem::PortfolioTransaction {
                transaction,
                portfolio,
            } => self.insert_portfolio_transaction(client, transaction, portfolio),
            ImportItem::BuySell {
                entry,
                account,
                portfolio,
            } => self.insert_buy_sell(client, entry, account, portfolio),
            ImportItem::AccountTransfer {
                entry,
                source,
                target,
            } => self.insert_account_transfer(client, entry, source, target),
            ImportItem::PortfolioTransfer {
                entry,
                source,
                target,
            } => self.insert_portfolio_transfer(client, entry, source, target),
        }
    }

    /// Process records in order.
    ///
    /// Record level failures are collected in the report. A contract
    /// violation aborts the batch; changes already applied stay on the
    /// client, which the caller is expected to discard.
    ///
    /// Prices live on the shared [`SecurityRef`], not on the client.
    /// Restoring a `client.clone()` taken before the batch does not remove
    /// prices the batch added.
    pub fn process_all<I>(&self, client: &mut Client, items: I) -> LedgerResult<ImportReport>
    where
        I: IntoIterator<Item = ImportItem>,
    {
        let mut report = ImportReport::default();

        for (index, item) in items.into_iter().enumerate() {
            let kind = item.kind();
            report.processed += 1;

            match self.process(client, item) {
                Ok(outcome) => report.record(outcome),
                Err(err) if err.is_contract_violation() => {
                    warn!(index, kind, error = %err, "Aborting import batch");
                    return Err(err);
                }
                Err(err) => {
                    warn!(index, kind, error = %err, "Skipping import item");
                    report.failures.push(ImportFailure {
                        index,
                        kind: kind.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            failed = report.failures.len(),
            "Import batch finished"
        );
        Ok(report)
    }

    pub fn insert_security(&self, client: &mut Client, security: &SecurityRef) -> InsertOutcome {
        InsertOutcome::Registered {
            newly_added: ensure_registered(client, Some(security)),
        }
    }

    /// Add a quote to the security's own series.
    ///
    /// The security does not need to be registered yet; a later
    /// transaction will register it.
    pub fn insert_price(&self, security: &SecurityRef, price: SecurityPrice) -> InsertOutcome {
        debug!(security = %security.id, date = %price.date, "Adding security price");
        InsertOutcome::PriceAdded {
            new_date: security.add_price(price),
        }
    }

    pub fn insert_account_transaction(
        &self,
        client: &mut Client,
        transaction: AccountTransaction,
        account: AccountId,
    ) -> LedgerResult<InsertOutcome> {
        client.require_account(account)?;
        ensure_registered(client, transaction.security.as_ref());

        let removal = if self.policy.remove_dividends {
            policy::dividend_removal(&transaction)
        } else {
            None
        };

        let dividend = client.append_account_transaction(account, transaction)?;

        match removal {
            Some(removal) => {
                let removal = client.append_account_transaction(account, removal)?;
                info!(account = %account, "Added removal for imported dividend");
                Ok(InsertOutcome::InsertedWithRemoval { dividend, removal })
            }
            None => Ok(InsertOutcome::Inserted(dividend)),
        }
    }

    pub fn insert_portfolio_transaction(
        &self,
        client: &mut Client,
        transaction: PortfolioTransaction,
        portfolio: PortfolioId,
    ) -> LedgerResult<InsertOutcome> {
        let reference = self.append_portfolio_transaction(client, transaction, portfolio)?;
        Ok(InsertOutcome::Inserted(reference))
    }

    fn append_portfolio_transaction(
        &self,
        client: &mut Client,
        transaction: PortfolioTransaction,
        portfolio: PortfolioId,
    ) -> LedgerResult<TransactionRef> {
        validation::validate_portfolio_transaction(&transaction)?;
        client.require_portfolio(portfolio)?;
        ensure_registered(client, transaction.security.as_ref());

        client.append_portfolio_transaction(portfolio, transaction)
    }

    /// Insert a trade.
    ///
    /// With `investment_plan_item` a matching plan execution is updated
    /// instead. Otherwise, with `convert_buy_sell_to_delivery`, the trade is
    /// booked as a delivery without its cash leg.
    pub fn insert_buy_sell(
        &self,
        client: &mut Client,
        entry: BuySellEntry,
        account: AccountId,
        portfolio: PortfolioId,
    ) -> LedgerResult<InsertOutcome> {
        validation::validate_buy_sell_entry(&entry)?;
        client.require_account(account)?;
        client.require_portfolio(portfolio)?;
        ensure_registered(client, entry.portfolio_transaction.security.as_ref());

        if self.policy.investment_plan_item {
            if let Reconciliation::Matched { plan, transaction } = self
                .reconciler
                .reconcile(client, &entry.portfolio_transaction)
            {
                return Ok(InsertOutcome::Reconciled { plan, transaction });
            }
        }

        if self.policy.convert_buy_sell_to_delivery {
            let delivery = policy::convert_to_delivery(entry);
            info!(
                transaction = %delivery.id,
                transaction_type = ?delivery.transaction_type,
                "Converted trade to delivery"
            );
            let reference = self.append_portfolio_transaction(client, delivery, portfolio)?;
            return Ok(InsertOutcome::ConvertedToDelivery(reference));
        }

        let id = bind_buy_sell(client, entry, account, portfolio)?;
        Ok(InsertOutcome::Linked(id))
    }

    pub fn insert_account_transfer(
        &self,
        client: &mut Client,
        entry: AccountTransferEntry,
        source: AccountId,
        target: AccountId,
    ) -> LedgerResult<InsertOutcome> {
        let id = bind_account_transfer(client, entry, source, target)?;
        Ok(InsertOutcome::Linked(id))
    }

    pub fn insert_portfolio_transfer(
        &self,
        client: &mut Client,
        entry: PortfolioTransferEntry,
        source: PortfolioId,
        target: PortfolioId,
    ) -> LedgerResult<InsertOutcome> {
        validation::validate_portfolio_transfer(&entry, source, target)?;
        client.require_portfolio(source)?;
        client.require_portfolio(target)?;
        ensure_registered(client, entry.source_transaction.security.as_ref());

        let id = bind_portfolio_transfer(client, entry, source, target)?;
        Ok(InsertOutcome::Linked(id))
    }
}

/// A record that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Position of the record in the batch
    pub index: usize,
    pub kind: String,
    pub message: String,
}

/// Summary of one [`InsertAction::process_all`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub processed: usize,
    pub securities_registered: usize,
    pub prices_added: usize,
    pub transactions_inserted: usize,
    pub cross_entries_linked: usize,
    pub removals_added: usize,
    pub plan_transactions_updated: usize,
    pub deliveries_converted: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Registered { newly_added } => {
                if newly_added {
                    self.securities_registered += 1;
                }
            }
            InsertOutcome::PriceAdded { .. } => self.prices_added += 1,
            InsertOutcome::Inserted(_) => self.transactions_inserted += 1,
            InsertOutcome::InsertedWithRemoval { .. } => {
                self.transactions_inserted += 1;
                self.removals_added += 1;
            }
            InsertOutcome::Linked(_) => self.cross_entries_linked += 1,
            InsertOutcome::Reconciled { .. } => self.plan_transactions_updated += 1,
            InsertOutcome::ConvertedToDelivery(_) => self.deliveries_converted += 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
