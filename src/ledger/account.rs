//! Cash accounts

use bigdecimal::BigDecimal;

use crate::ledger::AccountTransaction;
use crate::types::*;

/// A cash account holding an ordered list of account transactions
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub currency_code: String,
    pub is_retired: bool,
    pub note: Option<String>,
    transactions: Vec<AccountTransaction>,
}

impl Account {
    /// Create a new, empty account
    pub fn new(name: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            currency_code: currency_code.into(),
            is_retired: false,
            note: None,
            transactions: Vec::new(),
        }
    }

    /// Transactions in insertion order
    pub fn transactions(&self) -> &[AccountTransaction] {
        &self.transactions
    }

    pub fn find_transaction(&self, id: TransactionId) -> Option<&AccountTransaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub(crate) fn find_transaction_mut(
        &mut self,
        id: TransactionId,
    ) -> Option<&mut AccountTransaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    pub(crate) fn add_transaction(&mut self, transaction: AccountTransaction) {
        self.transactions.push(transaction);
    }

    /// Cash balance over all transactions, credits minus debits
    pub fn balance(&self) -> BigDecimal {
        self.transactions
            .iter()
            .fold(BigDecimal::from(0), |balance, t| {
                if t.transaction_type.is_credit() {
                    balance + &t.amount.amount
                } else {
                    balance - &t.amount.amount
                }
            })
    }
}
