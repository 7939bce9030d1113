//! Basic import example

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use portfolio_ledger_core::{
    Account, AccountTransaction, AccountTransactionType, BuySellEntry, Client, ImportItem,
    ImportPolicy, InsertAction, Money, Portfolio, Security, SecurityPrice, SecurityRef,
    TransactionUnit,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_ledger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    println!("📈 Portfolio Ledger Core - Basic Import Example\n");

    // 1. Set up a client with one cash account and one depot
    let mut client = Client::new("EUR");
    let cash = client.add_account(Account::new("Broker Cash", "EUR"));
    let depot = client.add_portfolio(Portfolio::new("Broker Depot").with_reference_account(cash));

    let etf: SecurityRef = Arc::new(
        Security::new("MSCI World ETF", "EUR")
            .with_isin("IE00B4L5Y983")
            .with_ticker_symbol("EUNL"),
    );

    // 2. Build a batch the way a statement parser would hand it over
    let day = |m: u32, d: u32| NaiveDate::from_ymd_opt(2024, m, d).unwrap();

    let mut buy = BuySellEntry::new(
        true,
        day(2, 1).and_hms_opt(9, 30, 0).unwrap(),
        etf.clone(),
        Money::new(BigDecimal::from(1001), "EUR"),
        BigDecimal::from(10),
    );
    buy.set_note("Order 4711");
    buy.add_unit(TransactionUnit::fee(Money::new(BigDecimal::from(1), "EUR")));

    let dividend = AccountTransaction::new(
        day(3, 15).and_hms_opt(0, 0, 0).unwrap(),
        AccountTransactionType::Dividends,
        Money::new("4.20".parse::<BigDecimal>()?, "EUR"),
    )
    .with_security(etf.clone())
    .with_note("Quarterly distribution");

    let items = vec![
        ImportItem::Security(etf.clone()),
        ImportItem::SecurityPrice {
            security: etf.clone(),
            price: SecurityPrice::new(day(2, 1), "100.10".parse()?),
        },
        ImportItem::BuySell {
            entry: buy,
            account: cash,
            portfolio: depot,
        },
        ImportItem::AccountTransaction {
            transaction: dividend,
            account: cash,
        },
    ];

    // 3. Run the batch
    let policy = ImportPolicy::default().with_remove_dividends(true);
    let action = InsertAction::new(policy);
    let report = action.process_all(&mut client, items)?;

    println!("📊 Import Report:");
    println!("  Processed:            {}", report.processed);
    println!("  Securities registered: {}", report.securities_registered);
    println!("  Prices added:          {}", report.prices_added);
    println!("  Cross entries linked:  {}", report.cross_entries_linked);
    println!("  Transactions inserted: {}", report.transactions_inserted);
    println!("  Removals added:        {}", report.removals_added);
    for failure in &report.failures {
        println!("  ✗ #{} {}: {}", failure.index, failure.kind, failure.message);
    }
    println!();

    // 4. Inspect the resulting ledger
    println!("💰 Accounts:");
    for account in client.accounts() {
        println!("  {} ({}): balance {}", account.name, account.currency_code, account.balance());
        for transaction in account.transactions() {
            println!(
                "    {} {:?} {}",
                transaction.date_time.date(),
                transaction.transaction_type,
                transaction.amount
            );
        }
    }

    println!("\n📦 Holdings:");
    for portfolio in client.portfolios() {
        for (security, shares) in portfolio.holdings() {
            let security = client.require_security(security)?;
            println!("  {}: {} x {}", portfolio.name, shares, security.name);
        }
    }

    let integrity = client.validate_integrity();
    println!(
        "\n✅ Integrity: {} ({} securities, {} cross entries)",
        if integrity.is_valid { "valid" } else { "INVALID" },
        integrity.security_count,
        integrity.cross_entry_count
    );
    for issue in &integrity.issues {
        println!("  ⚠ {issue}");
    }

    Ok(())
}
