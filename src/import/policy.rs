//! Import policies and the rewrites they enable

use serde::{Deserialize, Serialize};

use crate::ledger::{AccountTransaction, BuySellEntry, PortfolioTransaction};
use crate::types::*;

/// Policy switches fixed for the duration of one import batch
///
/// Missing fields default to `false` when deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPolicy {
    /// Book trades as deliveries and drop their cash leg
    pub convert_buy_sell_to_delivery: bool,
    /// Follow every dividend with a removal of the same amount
    pub remove_dividends: bool,
    /// Trades are executions of investment plans already in the ledger
    pub investment_plan_item: bool,
}

impl ImportPolicy {
    pub fn with_convert_buy_sell_to_delivery(mut self, flag: bool) -> Self {
        self.convert_buy_sell_to_delivery = flag;
        self
    }

    pub fn with_remove_dividends(mut self, flag: bool) -> Self {
        self.remove_dividends = flag;
        self
    }

    pub fn with_investment_plan_item(mut self, flag: bool) -> Self {
        self.investment_plan_item = flag;
        self
    }
}

/// The removal that offsets a dividend, or `None` for any other type.
///
/// The removal is a pure cash movement and does not reference the security.
pub fn dividend_removal(dividend: &AccountTransaction) -> Option<AccountTransaction> {
    if dividend.transaction_type != AccountTransactionType::Dividends {
        return None;
    }

    let mut removal = AccountTransaction::new(
        dividend.date_time,
        AccountTransactionType::Removal,
        dividend.amount.clone(),
    );
    removal.note = dividend.note.clone();
    Some(removal)
}

/// Turn a trade into a delivery. The cash leg is dropped.
pub fn convert_to_delivery(entry: BuySellEntry) -> PortfolioTransaction {
    entry.portfolio_transaction.to_delivery()
}
