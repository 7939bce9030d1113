//! Traits shared by transaction kinds and the plan matching collaborator

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::ledger::{PortfolioTransaction, SecurityRef};
use crate::types::*;

/// Capabilities common to account and portfolio transactions
///
/// Reconciliation works on whatever kind of transaction an investment plan
/// generated, so it only ever talks to this trait.
pub trait Transaction {
    fn id(&self) -> TransactionId;

    fn date_time(&self) -> NaiveDateTime;

    fn set_date_time(&mut self, date_time: NaiveDateTime);

    fn amount(&self) -> &Money;

    fn currency_code(&self) -> &str {
        &self.amount().currency_code
    }

    fn note(&self) -> Option<&str>;

    fn set_note(&mut self, note: Option<String>);

    fn security(&self) -> Option<&SecurityRef>;

    fn shares(&self) -> &BigDecimal;

    fn set_shares(&mut self, shares: BigDecimal);

    fn units(&self) -> &[TransactionUnit];

    fn clear_units(&mut self);

    fn add_unit(&mut self, unit: TransactionUnit);

    /// The cross entry this transaction is one half of, if any
    fn cross_entry(&self) -> Option<CrossEntryId>;
}

/// Finds the plan-generated transaction an imported record corresponds to
///
/// Implementations receive the plan's transactions in plan order and return
/// the position of the match.
pub trait PlanTransactionMatcher: Send + Sync {
    fn find_match(
        &self,
        candidate: &PortfolioTransaction,
        transactions: &[&dyn Transaction],
    ) -> Option<usize>;
}

/// Default matcher: same security, date within a tolerance window
///
/// When several transactions fall into the window the closest date wins,
/// the earlier position on a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindowMatcher {
    pub tolerance_days: i64,
}

impl DateWindowMatcher {
    pub const DEFAULT_TOLERANCE_DAYS: i64 = 5;

    pub fn new(tolerance_days: i64) -> Self {
        Self { tolerance_days }
    }
}

impl Default for DateWindowMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOLERANCE_DAYS)
    }
}

impl PlanTransactionMatcher for DateWindowMatcher {
    fn find_match(
        &self,
        candidate: &PortfolioTransaction,
        transactions: &[&dyn Transaction],
    ) -> Option<usize> {
        let candidate_date = candidate.date_time.date();

        transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| crate::ledger::same_security(t.security(), candidate.security.as_ref()))
            .map(|(index, t)| {
                let distance = (t.date_time().date() - candidate_date).num_days().abs();
                (index, distance)
            })
            .filter(|(_, distance)| *distance <= self.tolerance_days)
            .min_by_key(|(index, distance)| (*distance, *index))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Security;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn buy(security: &SecurityRef, date_time: NaiveDateTime) -> PortfolioTransaction {
        PortfolioTransaction::new(
            date_time,
            PortfolioTransactionType::Buy,
            Money::new(BigDecimal::from(100), "EUR"),
            BigDecimal::from(1),
            security.clone(),
        )
    }

    #[test]
    fn test_matches_closest_date_in_window() {
        let security: SecurityRef = Arc::new(Security::new("ACME", "EUR"));
        let early = buy(&security, at(2024, 2, 27));
        let close = buy(&security, at(2024, 3, 2));
        let far = buy(&security, at(2024, 4, 1));
        let sequence: Vec<&dyn Transaction> = vec![&early, &close, &far];

        let candidate = buy(&security, at(2024, 3, 1));
        let matcher = DateWindowMatcher::default();

        assert_eq!(matcher.find_match(&candidate, &sequence), Some(1));
    }

    #[test]
    fn test_ignores_other_securities_and_distant_dates() {
        let security: SecurityRef = Arc::new(Security::new("ACME", "EUR"));
        let other: SecurityRef = Arc::new(Security::new("ACME", "EUR"));
        let same_day_other = buy(&other, at(2024, 3, 1));
        let distant = buy(&security, at(2024, 3, 20));
        let sequence: Vec<&dyn Transaction> = vec![&same_day_other, &distant];

        let candidate = buy(&security, at(2024, 3, 1));

        assert_eq!(
            DateWindowMatcher::default().find_match(&candidate, &sequence),
            None
        );
        assert_eq!(
            DateWindowMatcher::new(30).find_match(&candidate, &sequence),
            Some(1)
        );
    }
}
