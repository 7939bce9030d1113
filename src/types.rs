//! Core value types shared by the ledger and the import pipeline

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(SecurityId, "Unique identifier for a security.");
typed_id!(AccountId, "Unique identifier for a cash account.");
typed_id!(PortfolioId, "Unique identifier for a securities portfolio.");
typed_id!(TransactionId, "Unique identifier for an account or portfolio transaction.");
typed_id!(CrossEntryId, "Unique identifier for a pair of linked transactions.");
typed_id!(PlanId, "Unique identifier for an investment plan.");

/// Monetary amount with currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount in the currency's major unit
    pub amount: BigDecimal,
    /// ISO 4217 currency code (e.g. "EUR", "USD")
    pub currency_code: String,
}

impl Money {
    /// Create a new amount
    pub fn new(amount: BigDecimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Create a zero amount in the given currency
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(BigDecimal::from(0), currency_code)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == BigDecimal::from(0)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency_code, self.amount)
    }
}

/// Kind of a transaction unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    /// Broker or transaction fee
    Fee,
    /// Withholding or capital gains tax
    Tax,
    /// Gross value before fees and taxes
    GrossValue,
}

/// Original-currency amount of a unit that was converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForexInfo {
    pub amount: Money,
    pub exchange_rate: BigDecimal,
}

/// A single component (fee, tax, gross value) of a transaction's amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionUnit {
    pub unit_type: UnitType,
    pub amount: Money,
    pub forex: Option<ForexInfo>,
}

impl TransactionUnit {
    pub fn new(unit_type: UnitType, amount: Money) -> Self {
        Self {
            unit_type,
            amount,
            forex: None,
        }
    }

    pub fn with_forex(mut self, forex: ForexInfo) -> Self {
        self.forex = Some(forex);
        self
    }

    /// Create a fee unit
    pub fn fee(amount: Money) -> Self {
        Self::new(UnitType::Fee, amount)
    }

    /// Create a tax unit
    pub fn tax(amount: Money) -> Self {
        Self::new(UnitType::Tax, amount)
    }

    /// Create a gross value unit
    pub fn gross_value(amount: Money) -> Self {
        Self::new(UnitType::GrossValue, amount)
    }
}

/// Account transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountTransactionType {
    Deposit,
    Removal,
    Interest,
    InterestCharge,
    Dividends,
    Fees,
    FeesRefund,
    Taxes,
    TaxRefund,
    /// Cash leg of a security purchase
    Buy,
    /// Cash leg of a security sale
    Sell,
    TransferIn,
    TransferOut,
}

impl AccountTransactionType {
    /// Is this a credit (money coming into the account)?
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            Self::Deposit
                | Self::Interest
                | Self::Dividends
                | Self::FeesRefund
                | Self::TaxRefund
                | Self::Sell
                | Self::TransferIn
        )
    }
}

/// Portfolio transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioTransactionType {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
    /// Shares entering the portfolio without a cash movement
    DeliveryInbound,
    /// Shares leaving the portfolio without a cash movement
    DeliveryOutbound,
}

impl PortfolioTransactionType {
    /// Is this a purchase (shares coming in)?
    pub fn is_purchase(&self) -> bool {
        matches!(self, Self::Buy | Self::TransferIn | Self::DeliveryInbound)
    }

    /// The delivery type that moves shares in the same direction
    pub fn as_delivery(&self) -> Self {
        if self.is_purchase() {
            Self::DeliveryInbound
        } else {
            Self::DeliveryOutbound
        }
    }
}

/// Owner of a committed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Account(AccountId),
    Portfolio(PortfolioId),
}

/// Handle to a committed transaction, resolved through the owning client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef {
    pub owner: Owner,
    pub transaction: TransactionId,
}

impl TransactionRef {
    pub fn account(account: AccountId, transaction: TransactionId) -> Self {
        Self {
            owner: Owner::Account(account),
            transaction,
        }
    }

    pub fn portfolio(portfolio: PortfolioId, transaction: TransactionId) -> Self {
        Self {
            owner: Owner::Portfolio(portfolio),
            transaction,
        }
    }
}

/// Errors that can occur while inserting into the ledger
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Security not found: {0}")]
    SecurityNotFound(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),
    #[error("Inconsistent owners: {0}")]
    InconsistentOwners(String),
    #[error("Missing security: {0}")]
    MissingSecurity(String),
    #[error("Mismatched cross entry: {0}")]
    MismatchedCrossEntry(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    /// Contract violations point at a bug in the caller and abort a batch.
    /// Every other error only fails the record at hand.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::MissingSecurity(_) | LedgerError::MismatchedCrossEntry(_)
        )
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
