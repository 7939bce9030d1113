//! Investment plans (recurring purchase schedules)

use chrono::NaiveDate;

use crate::ledger::SecurityRef;
use crate::types::*;

/// A recurring schedule and the transactions it has generated so far
#[derive(Debug, Clone)]
pub struct InvestmentPlan {
    pub id: PlanId,
    pub name: String,
    pub security: Option<SecurityRef>,
    pub portfolio: Option<PortfolioId>,
    pub account: Option<AccountId>,
    pub amount: Money,
    pub start: NaiveDate,
    /// Interval between executions in months
    pub interval_months: u32,
    pub note: Option<String>,
    transactions: Vec<TransactionRef>,
}

impl InvestmentPlan {
    pub fn new(name: impl Into<String>, amount: Money, start: NaiveDate) -> Self {
        Self {
            id: PlanId::new(),
            name: name.into(),
            security: None,
            portfolio: None,
            account: None,
            amount,
            start,
            interval_months: 1,
            note: None,
            transactions: Vec::new(),
        }
    }

    pub fn with_security(mut self, security: SecurityRef) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_portfolio(mut self, portfolio: PortfolioId) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn with_account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    /// References to generated transactions, oldest first
    pub fn transactions(&self) -> &[TransactionRef] {
        &self.transactions
    }

    /// Remember a transaction this plan generated
    pub fn record_transaction(&mut self, transaction: TransactionRef) {
        self.transactions.push(transaction);
    }
}
