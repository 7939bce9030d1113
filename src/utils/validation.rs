//! Validation of candidate records before they touch the ledger

use bigdecimal::BigDecimal;

use crate::ledger::{
    same_security, AccountTransferEntry, BuySellEntry, PortfolioTransaction,
    PortfolioTransferEntry,
};
use crate::types::*;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &Money) -> LedgerResult<()> {
    if amount.amount < BigDecimal::from(0) {
        Err(LedgerError::Validation(format!(
            "Amount must not be negative, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// A portfolio transaction must always name its security
pub fn validate_portfolio_transaction(transaction: &PortfolioTransaction) -> LedgerResult<()> {
    if transaction.security.is_none() {
        return Err(LedgerError::MissingSecurity(format!(
            "Portfolio transaction {} has no security",
            transaction.id
        )));
    }

    validate_non_negative_amount(&transaction.amount)
}

/// The security leg must be a buy or sell and the cash leg must mirror it
pub fn validate_buy_sell_entry(entry: &BuySellEntry) -> LedgerResult<()> {
    validate_portfolio_transaction(&entry.portfolio_transaction)?;

    let expected = match entry.portfolio_transaction.transaction_type {
        PortfolioTransactionType::Buy => AccountTransactionType::Buy,
        PortfolioTransactionType::Sell => AccountTransactionType::Sell,
        other => {
            return Err(LedgerError::MismatchedCrossEntry(format!(
                "Buy/sell entry carries a {:?} portfolio transaction",
                other
            )))
        }
    };

    if entry.account_transaction.transaction_type != expected {
        return Err(LedgerError::MismatchedCrossEntry(format!(
            "Cash leg is {:?} but security leg is {:?}",
            entry.account_transaction.transaction_type,
            entry.portfolio_transaction.transaction_type
        )));
    }

    // The cash leg may omit the security but never name another one
    if entry.account_transaction.security.is_some()
        && !same_security(
            entry.account_transaction.security.as_ref(),
            entry.portfolio_transaction.security.as_ref(),
        )
    {
        return Err(LedgerError::MismatchedCrossEntry(format!(
            "Cash leg of trade {} references a different security",
            entry.portfolio_transaction.id
        )));
    }

    if entry.account_transaction.date_time != entry.portfolio_transaction.date_time
        || entry.account_transaction.amount != entry.portfolio_transaction.amount
    {
        return Err(LedgerError::MismatchedCrossEntry(format!(
            "Legs of trade {} disagree on date or amount",
            entry.portfolio_transaction.id
        )));
    }

    Ok(())
}

pub fn validate_account_transfer(
    entry: &AccountTransferEntry,
    source: AccountId,
    target: AccountId,
) -> LedgerResult<()> {
    if source == target {
        return Err(LedgerError::InconsistentOwners(format!(
            "Account transfer from account {} to itself",
            source
        )));
    }

    if entry.source_transaction.transaction_type != AccountTransactionType::TransferOut
        || entry.target_transaction.transaction_type != AccountTransactionType::TransferIn
    {
        return Err(LedgerError::MismatchedCrossEntry(
            "Account transfer halves must be TRANSFER_OUT and TRANSFER_IN".to_string(),
        ));
    }

    validate_non_negative_amount(&entry.source_transaction.amount)?;
    validate_non_negative_amount(&entry.target_transaction.amount)
}

pub fn validate_portfolio_transfer(
    entry: &PortfolioTransferEntry,
    source: PortfolioId,
    target: PortfolioId,
) -> LedgerResult<()> {
    if source == target {
        return Err(LedgerError::InconsistentOwners(format!(
            "Portfolio transfer from portfolio {} to itself",
            source
        )));
    }

    validate_portfolio_transaction(&entry.source_transaction)?;
    validate_portfolio_transaction(&entry.target_transaction)?;

    if entry.source_transaction.transaction_type != PortfolioTransactionType::TransferOut
        || entry.target_transaction.transaction_type != PortfolioTransactionType::TransferIn
    {
        return Err(LedgerError::MismatchedCrossEntry(
            "Portfolio transfer halves must be TRANSFER_OUT and TRANSFER_IN".to_string(),
        ));
    }

    if !same_security(
        entry.source_transaction.security.as_ref(),
        entry.target_transaction.security.as_ref(),
    ) {
        return Err(LedgerError::MismatchedCrossEntry(
            "Portfolio transfer halves reference different securities".to_string(),
        ));
    }

    Ok(())
}
