//! Account and portfolio transactions
//!
//! Transactions belong either to an account (cash movements) or to a
//! portfolio (share movements). Both share the [`Transaction`] capability
//! and only differ in their type tag and whether a security is mandatory.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::ledger::SecurityRef;
use crate::traits::Transaction;
use crate::types::*;

/// Cash transaction booked on an account
#[derive(Debug, Clone)]
pub struct AccountTransaction {
    pub id: TransactionId,
    pub date_time: NaiveDateTime,
    pub transaction_type: AccountTransactionType,
    pub amount: Money,
    /// Shares the payment relates to (dividends), zero otherwise
    pub shares: BigDecimal,
    pub security: Option<SecurityRef>,
    pub units: Vec<TransactionUnit>,
    pub note: Option<String>,
    /// Source document reference
    pub source: Option<String>,
    pub(crate) cross_entry: Option<CrossEntryId>,
}

impl AccountTransaction {
    pub fn new(
        date_time: NaiveDateTime,
        transaction_type: AccountTransactionType,
        amount: Money,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            date_time,
            transaction_type,
            amount,
            shares: BigDecimal::from(0),
            security: None,
            units: Vec::new(),
            note: None,
            source: None,
            cross_entry: None,
        }
    }

    pub fn with_security(mut self, security: SecurityRef) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_shares(mut self, shares: BigDecimal) -> Self {
        self.shares = shares;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_unit(mut self, unit: TransactionUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Sum of all units of the given kind
    pub fn total_of(&self, unit_type: UnitType) -> BigDecimal {
        sum_units(&self.units, unit_type)
    }
}

/// Share movement booked on a portfolio
#[derive(Debug, Clone)]
pub struct PortfolioTransaction {
    pub id: TransactionId,
    pub date_time: NaiveDateTime,
    pub transaction_type: PortfolioTransactionType,
    pub amount: Money,
    pub shares: BigDecimal,
    /// Always set for committed portfolio transactions
    pub security: Option<SecurityRef>,
    pub units: Vec<TransactionUnit>,
    pub note: Option<String>,
    pub source: Option<String>,
    pub(crate) cross_entry: Option<CrossEntryId>,
}

impl PortfolioTransaction {
    pub fn new(
        date_time: NaiveDateTime,
        transaction_type: PortfolioTransactionType,
        amount: Money,
        shares: BigDecimal,
        security: SecurityRef,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            date_time,
            transaction_type,
            amount,
            shares,
            security: Some(security),
            units: Vec::new(),
            note: None,
            source: None,
            cross_entry: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_unit(mut self, unit: TransactionUnit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn total_of(&self, unit_type: UnitType) -> BigDecimal {
        sum_units(&self.units, unit_type)
    }

    /// Rewrite this buy or sell as a delivery of the same shares.
    ///
    /// Everything but the id, the type and the cross entry link is carried
    /// over unchanged.
    pub fn to_delivery(&self) -> PortfolioTransaction {
        PortfolioTransaction {
            id: TransactionId::new(),
            date_time: self.date_time,
            transaction_type: self.transaction_type.as_delivery(),
            amount: self.amount.clone(),
            shares: self.shares.clone(),
            security: self.security.clone(),
            units: self.units.clone(),
            note: self.note.clone(),
            source: self.source.clone(),
            cross_entry: None,
        }
    }
}

fn sum_units(units: &[TransactionUnit], unit_type: UnitType) -> BigDecimal {
    units
        .iter()
        .filter(|u| u.unit_type == unit_type)
        .map(|u| &u.amount.amount)
        .sum()
}

macro_rules! impl_transaction {
    ($ty:ty) => {
        impl Transaction for $ty {
            fn id(&self) -> TransactionId {
                self.id
            }

            fn date_time(&self) -> NaiveDateTime {
                self.date_time
            }

            fn set_date_time(&mut self, date_time: NaiveDateTime) {
                self.date_time = date_time;
            }

            fn amount(&self) -> &Money {
                &self.amount
            }

            fn note(&self) -> Option<&str> {
                self.note.as_deref()
            }

            fn set_note(&mut self, note: Option<String>) {
                self.note = note;
            }

            fn security(&self) -> Option<&SecurityRef> {
                self.security.as_ref()
            }

            fn shares(&self) -> &BigDecimal {
                &self.shares
            }

            fn set_shares(&mut self, shares: BigDecimal) {
                self.shares = shares;
            }

            fn units(&self) -> &[TransactionUnit] {
                &self.units
            }

            fn clear_units(&mut self) {
                self.units.clear();
            }

            fn add_unit(&mut self, unit: TransactionUnit) {
                self.units.push(unit);
            }

            fn cross_entry(&self) -> Option<CrossEntryId> {
                self.cross_entry
            }
        }
    };
}

impl_transaction!(AccountTransaction);
impl_transaction!(PortfolioTransaction);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Security;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn eur(amount: i64) -> Money {
        Money::new(BigDecimal::from(amount), "EUR")
    }

    #[test]
    fn test_unit_totals() {
        let date_time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let security = Arc::new(Security::new("ACME", "EUR"));
        let tx = PortfolioTransaction::new(
            date_time,
            PortfolioTransactionType::Buy,
            eur(1000),
            BigDecimal::from(10),
            security,
        )
        .with_unit(TransactionUnit::fee(eur(5)))
        .with_unit(TransactionUnit::fee(eur(2)))
        .with_unit(TransactionUnit::tax(eur(3)));

        assert_eq!(tx.total_of(UnitType::Fee), BigDecimal::from(7));
        assert_eq!(tx.total_of(UnitType::Tax), BigDecimal::from(3));
        assert_eq!(tx.total_of(UnitType::GrossValue), BigDecimal::from(0));
    }

    #[test]
    fn test_to_delivery_keeps_everything_but_type() {
        let date_time = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let security = Arc::new(Security::new("ACME", "EUR"));
        let sell = PortfolioTransaction::new(
            date_time,
            PortfolioTransactionType::Sell,
            eur(500),
            BigDecimal::from(4),
            security.clone(),
        )
        .with_note("partial exit")
        .with_unit(TransactionUnit::fee(eur(1)));

        let delivery = sell.to_delivery();

        assert_eq!(
            delivery.transaction_type,
            PortfolioTransactionType::DeliveryOutbound
        );
        assert_ne!(delivery.id, sell.id);
        assert_eq!(delivery.date_time, sell.date_time);
        assert_eq!(delivery.amount, sell.amount);
        assert_eq!(delivery.shares, sell.shares);
        assert_eq!(delivery.units, sell.units);
        assert_eq!(delivery.note.as_deref(), Some("partial exit"));
        assert!(Arc::ptr_eq(delivery.security.as_ref().unwrap(), &security));
    }
}
