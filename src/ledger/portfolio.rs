//! Securities portfolios

use bigdecimal::BigDecimal;
use std::collections::HashMap;

use crate::ledger::PortfolioTransaction;
use crate::types::*;

/// A securities portfolio (depot)
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub name: String,
    /// Cash account used for settlements
    pub reference_account: Option<AccountId>,
    pub is_retired: bool,
    pub note: Option<String>,
    transactions: Vec<PortfolioTransaction>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PortfolioId::new(),
            name: name.into(),
            reference_account: None,
            is_retired: false,
            note: None,
            transactions: Vec::new(),
        }
    }

    pub fn with_reference_account(mut self, account: AccountId) -> Self {
        self.reference_account = Some(account);
        self
    }

    pub fn transactions(&self) -> &[PortfolioTransaction] {
        &self.transactions
    }

    pub fn find_transaction(&self, id: TransactionId) -> Option<&PortfolioTransaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub(crate) fn find_transaction_mut(
        &mut self,
        id: TransactionId,
    ) -> Option<&mut PortfolioTransaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    pub(crate) fn add_transaction(&mut self, transaction: PortfolioTransaction) {
        self.transactions.push(transaction);
    }

    /// Net shares held per security
    pub fn holdings(&self) -> HashMap<SecurityId, BigDecimal> {
        let mut holdings: HashMap<SecurityId, BigDecimal> = HashMap::new();

        for tx in &self.transactions {
            if let Some(security) = &tx.security {
                let entry = holdings.entry(security.id).or_default();
                if tx.transaction_type.is_purchase() {
                    *entry += &tx.shares;
                } else {
                    *entry -= &tx.shares;
                }
            }
        }

        holdings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Security, SecurityRef};
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_holdings_net_out_sales() {
        let date_time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let security: SecurityRef = Arc::new(Security::new("ACME", "EUR"));
        let amount = Money::new(BigDecimal::from(100), "EUR");
        let mut portfolio = Portfolio::new("Depot");

        portfolio.add_transaction(PortfolioTransaction::new(
            date_time,
            PortfolioTransactionType::Buy,
            amount.clone(),
            BigDecimal::from(10),
            security.clone(),
        ));
        portfolio.add_transaction(PortfolioTransaction::new(
            date_time,
            PortfolioTransactionType::DeliveryOutbound,
            amount,
            BigDecimal::from(4),
            security.clone(),
        ));

        let holdings = portfolio.holdings();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[&security.id], BigDecimal::from(6));
    }
}
