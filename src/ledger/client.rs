//! The client: aggregate root owning every security, account, portfolio,
//! investment plan and cross entry of one ledger

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ledger::cross_entry::Half;
use crate::ledger::{
    Account, AccountTransaction, CrossEntry, InvestmentPlan, Portfolio, PortfolioTransaction,
    SecurityRef,
};
use crate::traits::Transaction;
use crate::types::*;

/// Root of one loaded ledger. All mutation goes through it.
#[derive(Debug, Clone)]
pub struct Client {
    pub base_currency: String,
    securities: Vec<SecurityRef>,
    accounts: Vec<Account>,
    portfolios: Vec<Portfolio>,
    plans: Vec<InvestmentPlan>,
    cross_entries: HashMap<CrossEntryId, CrossEntry>,
}

impl Client {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            securities: Vec::new(),
            accounts: Vec::new(),
            portfolios: Vec::new(),
            plans: Vec::new(),
            cross_entries: HashMap::new(),
        }
    }

    // Securities

    pub fn securities(&self) -> &[SecurityRef] {
        &self.securities
    }

    /// Membership by handle identity
    pub fn contains_security(&self, security: &SecurityRef) -> bool {
        self.securities.iter().any(|s| Arc::ptr_eq(s, security))
    }

    /// Add a security without checking membership; see
    /// [`crate::import::ensure_registered`] for the idempotent variant
    pub fn add_security(&mut self, security: SecurityRef) {
        self.securities.push(security);
    }

    pub fn find_security(&self, id: SecurityId) -> Option<&SecurityRef> {
        self.securities.iter().find(|s| s.id == id)
    }

    pub fn require_security(&self, id: SecurityId) -> LedgerResult<&SecurityRef> {
        self.find_security(id)
            .ok_or_else(|| LedgerError::SecurityNotFound(id.to_string()))
    }

    // Accounts and portfolios

    pub fn add_account(&mut self, account: Account) -> AccountId {
        let id = account.id;
        self.accounts.push(account);
        id
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn account_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    pub fn add_portfolio(&mut self, portfolio: Portfolio) -> PortfolioId {
        let id = portfolio.id;
        self.portfolios.push(portfolio);
        id
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn portfolio(&self, id: PortfolioId) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == id)
    }

    fn portfolio_mut(&mut self, id: PortfolioId) -> Option<&mut Portfolio> {
        self.portfolios.iter_mut().find(|p| p.id == id)
    }

    pub(crate) fn require_account(&self, id: AccountId) -> LedgerResult<()> {
        self.account(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    pub(crate) fn require_portfolio(&self, id: PortfolioId) -> LedgerResult<()> {
        self.portfolio(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::PortfolioNotFound(id.to_string()))
    }

    // Investment plans

    pub fn add_plan(&mut self, plan: InvestmentPlan) -> PlanId {
        let id = plan.id;
        self.plans.push(plan);
        id
    }

    /// Plans in list order; reconciliation scans them in this order
    pub fn plans(&self) -> &[InvestmentPlan] {
        &self.plans
    }

    pub fn plan_mut(&mut self, id: PlanId) -> Option<&mut InvestmentPlan> {
        self.plans.iter_mut().find(|p| p.id == id)
    }

    // Transactions

    /// Resolve a transaction handle
    pub fn transaction(&self, reference: TransactionRef) -> Option<&dyn Transaction> {
        match reference.owner {
            Owner::Account(account) => self
                .account(account)?
                .find_transaction(reference.transaction)
                .map(|t| t as &dyn Transaction),
            Owner::Portfolio(portfolio) => self
                .portfolio(portfolio)?
                .find_transaction(reference.transaction)
                .map(|t| t as &dyn Transaction),
        }
    }

    /// Resolve a transaction handle, failing when it dangles
    pub fn require_transaction(
        &self,
        reference: TransactionRef,
    ) -> LedgerResult<&dyn Transaction> {
        self.transaction(reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.transaction.to_string()))
    }

    pub(crate) fn transaction_mut(
        &mut self,
        reference: TransactionRef,
    ) -> Option<&mut dyn Transaction> {
        match reference.owner {
            Owner::Account(account) => self
                .account_mut(account)?
                .find_transaction_mut(reference.transaction)
                .map(|t| t as &mut dyn Transaction),
            Owner::Portfolio(portfolio) => self
                .portfolio_mut(portfolio)?
                .find_transaction_mut(reference.transaction)
                .map(|t| t as &mut dyn Transaction),
        }
    }

    pub(crate) fn append_account_transaction(
        &mut self,
        account: AccountId,
        transaction: AccountTransaction,
    ) -> LedgerResult<TransactionRef> {
        let target = self
            .account_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;
        if target.find_transaction(transaction.id).is_some() {
            return Err(duplicate(transaction.id, &target.name));
        }
        let reference = TransactionRef::account(account, transaction.id);
        target.add_transaction(transaction);
        Ok(reference)
    }

    pub(crate) fn append_portfolio_transaction(
        &mut self,
        portfolio: PortfolioId,
        transaction: PortfolioTransaction,
    ) -> LedgerResult<TransactionRef> {
        let target = self
            .portfolio_mut(portfolio)
            .ok_or_else(|| LedgerError::PortfolioNotFound(portfolio.to_string()))?;
        if target.find_transaction(transaction.id).is_some() {
            return Err(duplicate(transaction.id, &target.name));
        }
        let reference = TransactionRef::portfolio(portfolio, transaction.id);
        target.add_transaction(transaction);
        Ok(reference)
    }

    // Cross entries

    pub fn cross_entry(&self, id: CrossEntryId) -> Option<&CrossEntry> {
        self.cross_entries.get(&id)
    }

    pub fn cross_entries(&self) -> impl Iterator<Item = (&CrossEntryId, &CrossEntry)> {
        self.cross_entries.iter()
    }

    /// Append both halves and register the entry as one step.
    ///
    /// Owners and transaction ids are checked before anything is touched.
    pub(crate) fn commit_pair(
        &mut self,
        id: CrossEntryId,
        cross_entry: CrossEntry,
        first: Half,
        second: Half,
    ) -> LedgerResult<()> {
        self.require_slot(&first)?;
        self.require_slot(&second)?;
        if first.reference() == second.reference() {
            return Err(LedgerError::DuplicateTransaction(format!(
                "Both halves of cross entry {} are transaction {}",
                id,
                first.reference().transaction
            )));
        }

        self.append_half(first)?;
        self.append_half(second)?;
        self.cross_entries.insert(id, cross_entry);
        Ok(())
    }

    /// The owner must exist and must not hold the half's id yet
    fn require_slot(&self, half: &Half) -> LedgerResult<()> {
        match half {
            Half::Account(account, transaction) => {
                let owner = self
                    .account(*account)
                    .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;
                match owner.find_transaction(transaction.id) {
                    Some(_) => Err(duplicate(transaction.id, &owner.name)),
                    None => Ok(()),
                }
            }
            Half::Portfolio(portfolio, transaction) => {
                let owner = self
                    .portfolio(*portfolio)
                    .ok_or_else(|| LedgerError::PortfolioNotFound(portfolio.to_string()))?;
                match owner.find_transaction(transaction.id) {
                    Some(_) => Err(duplicate(transaction.id, &owner.name)),
                    None => Ok(()),
                }
            }
        }
    }

    fn append_half(&mut self, half: Half) -> LedgerResult<TransactionRef> {
        match half {
            Half::Account(account, transaction) => {
                self.append_account_transaction(account, transaction)
            }
            Half::Portfolio(portfolio, transaction) => {
                self.append_portfolio_transaction(portfolio, transaction)
            }
        }
    }

    /// Check that every referenced security is registered and every cross
    /// entry is complete and linked back from both halves
    pub fn validate_integrity(&self) -> IntegrityReport {
        let mut issues = Vec::new();

        for account in &self.accounts {
            for t in account.transactions() {
                self.check_transaction(t, &mut issues);
            }
        }

        for portfolio in &self.portfolios {
            for t in portfolio.transactions() {
                if t.security.is_none() {
                    issues.push(format!(
                        "Portfolio transaction {} in '{}' has no security",
                        t.id, portfolio.name
                    ));
                }
                self.check_transaction(t, &mut issues);
            }
        }

        for (id, cross_entry) in &self.cross_entries {
            let (a, b) = cross_entry.halves();
            for half in [a, b] {
                match self.transaction(half) {
                    Some(t) if t.cross_entry() == Some(*id) => {}
                    Some(t) => issues.push(format!(
                        "Transaction {} does not link back to cross entry {}",
                        t.id(),
                        id
                    )),
                    None => issues.push(format!(
                        "Cross entry {} is missing transaction {}",
                        id, half.transaction
                    )),
                }
            }
        }

        IntegrityReport {
            is_valid: issues.is_empty(),
            security_count: self.securities.len(),
            cross_entry_count: self.cross_entries.len(),
            issues,
        }
    }

    fn check_transaction(&self, t: &dyn Transaction, issues: &mut Vec<String>) {
        if let Some(security) = t.security() {
            if !self.contains_security(security) {
                issues.push(format!(
                    "Transaction {} references unregistered security '{}'",
                    t.id(),
                    security.name
                ));
            }
        }

        if let Some(id) = t.cross_entry() {
            if !self.cross_entries.contains_key(&id) {
                issues.push(format!(
                    "Transaction {} links to unknown cross entry {}",
                    t.id(),
                    id
                ));
            }
        }
    }
}

fn duplicate(id: TransactionId, owner: &str) -> LedgerError {
    LedgerError::DuplicateTransaction(format!("{} already exists in '{}'", id, owner))
}

impl Default for Client {
    fn default() -> Self {
        Self::new("EUR")
    }
}

/// Result of [`Client::validate_integrity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub security_count: usize,
    pub cross_entry_count: usize,
}
