//! Reconciliation of imported trades against investment plan executions
//!
//! A broker statement for a savings plan execution describes a transaction
//! the ledger already generated from the plan. Instead of inserting it a
//! second time, the generated transaction is updated with the booked values.

use tracing::{debug, info, warn};

use crate::ledger::{same_security, Client, PortfolioTransaction};
use crate::traits::{DateWindowMatcher, PlanTransactionMatcher, Transaction};
use crate::types::*;

/// Result of a reconciliation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// An existing plan transaction was updated; the candidate must not be inserted
    Matched {
        plan: PlanId,
        transaction: TransactionRef,
    },
    /// Nothing matched; insert the candidate normally
    NoMatch,
}

/// Searches investment plans for the execution an imported trade belongs to
pub struct PlanReconciler {
    matcher: Box<dyn PlanTransactionMatcher>,
}

impl Default for PlanReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanReconciler {
    /// Create a reconciler using [`DateWindowMatcher`]
    pub fn new() -> Self {
        Self::with_matcher(Box::new(DateWindowMatcher::default()))
    }

    pub fn with_matcher(matcher: Box<dyn PlanTransactionMatcher>) -> Self {
        Self { matcher }
    }

    /// Update the matching plan transaction in place, if there is one.
    ///
    /// Plans are scanned in list order and only plans for the candidate's
    /// security take part. The first plan that yields a match wins.
    pub fn reconcile(&self, client: &mut Client, candidate: &PortfolioTransaction) -> Reconciliation {
        let Some((plan, existing)) = self.find_existing(client, candidate) else {
            debug!(transaction = %candidate.id, "No investment plan transaction matches");
            return Reconciliation::NoMatch;
        };

        let Some(target) = client.transaction_mut(existing) else {
            // find_existing only returns handles it just resolved
            return Reconciliation::NoMatch;
        };

        target.set_date_time(candidate.date_time);
        target.set_note(candidate.note.clone());
        target.set_shares(candidate.shares.clone());
        target.clear_units();
        for unit in &candidate.units {
            target.add_unit(unit.clone());
        }
        let cross_entry = target.cross_entry();

        if let Some(cross_entry) = cross_entry {
            let paired = client
                .cross_entry(cross_entry)
                .and_then(|entry| entry.cross_transaction(existing.transaction));

            match paired.and_then(|paired| client.transaction_mut(paired)) {
                Some(paired) => {
                    paired.set_date_time(candidate.date_time);
                    paired.set_note(candidate.note.clone());
                }
                None => warn!(
                    cross_entry = %cross_entry,
                    "Paired half of plan transaction could not be resolved"
                ),
            }
        }

        info!(
            plan = %plan,
            transaction = %existing.transaction,
            date = %candidate.date_time,
            "Updated investment plan transaction from import"
        );

        Reconciliation::Matched {
            plan,
            transaction: existing,
        }
    }

    fn find_existing(
        &self,
        client: &Client,
        candidate: &PortfolioTransaction,
    ) -> Option<(PlanId, TransactionRef)> {
        let plans = client
            .plans()
            .iter()
            .filter(|plan| same_security(plan.security.as_ref(), candidate.security.as_ref()));

        for plan in plans {
            let mut references = Vec::with_capacity(plan.transactions().len());
            let mut transactions: Vec<&dyn Transaction> =
                Vec::with_capacity(plan.transactions().len());

            for reference in plan.transactions() {
                match client.require_transaction(*reference) {
                    Ok(t) => {
                        references.push(*reference);
                        transactions.push(t);
                    }
                    Err(err) => warn!(
                        plan = %plan.id,
                        error = %err,
                        "Skipping unresolvable investment plan transaction"
                    ),
                }
            }

            if let Some(index) = self.matcher.find_match(candidate, &transactions) {
                if let Some(reference) = references.get(index) {
                    return Some((plan.id, *reference));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        bind_buy_sell, Account, BuySellEntry, InvestmentPlan, Portfolio, Security, SecurityRef,
    };
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn eur(amount: i64) -> Money {
        Money::new(BigDecimal::from(amount), "EUR")
    }

    struct Fixture {
        client: Client,
        security: SecurityRef,
        generated: TransactionRef,
    }

    fn fixture() -> Fixture {
        let mut client = Client::new("EUR");
        let account = client.add_account(Account::new("Cash", "EUR"));
        let portfolio = client.add_portfolio(Portfolio::new("Depot"));
        let security: SecurityRef = Arc::new(Security::new("World ETF", "EUR"));
        client.add_security(security.clone());

        let mut generated = BuySellEntry::new(
            true,
            at(3, 1),
            security.clone(),
            eur(100),
            BigDecimal::from(1),
        );
        generated.set_note("plan execution");
        let portfolio_tx = generated.portfolio_transaction.id;
        bind_buy_sell(&mut client, generated, account, portfolio).unwrap();

        let generated = TransactionRef::portfolio(portfolio, portfolio_tx);
        let mut plan = InvestmentPlan::new("Monthly ETF", eur(100), at(1, 1).date())
            .with_security(security.clone());
        plan.record_transaction(generated);
        client.add_plan(plan);

        Fixture {
            client,
            security,
            generated,
        }
    }

    #[test]
    fn test_match_updates_transaction_and_cash_leg() {
        let Fixture {
            mut client,
            security,
            generated,
        } = fixture();

        let candidate = PortfolioTransaction::new(
            at(3, 3),
            PortfolioTransactionType::Buy,
            eur(100),
            BigDecimal::from(2),
            security,
        )
        .with_note("booked")
        .with_unit(TransactionUnit::fee(eur(1)));

        let outcome = PlanReconciler::new().reconcile(&mut client, &candidate);
        assert!(matches!(outcome, Reconciliation::Matched { transaction, .. } if transaction == generated));

        let updated = client.transaction(generated).unwrap();
        assert_eq!(updated.date_time(), at(3, 3));
        assert_eq!(updated.note(), Some("booked"));
        assert_eq!(updated.shares(), &BigDecimal::from(2));
        assert_eq!(updated.units(), candidate.units.as_slice());

        let cross_entry = client.cross_entry(updated.cross_entry().unwrap()).unwrap();
        let cash = cross_entry.cross_transaction(generated.transaction).unwrap();
        let cash = client.transaction(cash).unwrap();
        assert_eq!(cash.date_time(), at(3, 3));
        assert_eq!(cash.note(), Some("booked"));
    }

    #[test]
    fn test_other_security_never_matches() {
        let Fixture { mut client, .. } = fixture();
        let other: SecurityRef = Arc::new(Security::new("World ETF", "EUR"));

        let candidate = PortfolioTransaction::new(
            at(3, 1),
            PortfolioTransactionType::Buy,
            eur(100),
            BigDecimal::from(1),
            other,
        );

        assert_eq!(
            PlanReconciler::new().reconcile(&mut client, &candidate),
            Reconciliation::NoMatch
        );
    }

    #[test]
    fn test_dangling_plan_reference_is_skipped() {
        let Fixture {
            mut client,
            security,
            generated,
        } = fixture();
        let plan = client.plans()[0].id;
        if let Some(plan) = client.plan_mut(plan) {
            let dangling = TransactionRef::portfolio(PortfolioId::new(), TransactionId::new());
            plan.record_transaction(dangling);
        }

        let candidate = PortfolioTransaction::new(
            at(3, 2),
            PortfolioTransactionType::Buy,
            eur(100),
            BigDecimal::from(1),
            security,
        );

        let outcome = PlanReconciler::new().reconcile(&mut client, &candidate);
        assert!(matches!(outcome, Reconciliation::Matched { transaction, .. } if transaction == generated));
    }

    #[test]
    fn test_plan_without_security_never_matches() {
        let mut client = Client::new("EUR");
        client.add_plan(InvestmentPlan::new("Deposits", eur(50), at(1, 1).date()));
        let security: SecurityRef = Arc::new(Security::new("ACME", "EUR"));

        let candidate = PortfolioTransaction::new(
            at(3, 1),
            PortfolioTransactionType::Buy,
            eur(100),
            BigDecimal::from(1),
            security,
        );

        assert_eq!(
            PlanReconciler::new().reconcile(&mut client, &candidate),
            Reconciliation::NoMatch
        );
    }
}
