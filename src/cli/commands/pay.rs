use anyhow::{Context, Result, bail};
use client::CreateTransactionRequest;
use model::transaction::TransactionType;
use rust_decimal::Decimal;

use crate::app::Session;

pub async fn pay(session: &Session, amount: f64, account: &str) -> Result<()> {
    let amount = Decimal::try_from(amount).context("amount is not representable")?;
    let active = session.active_household().await?;
    let Some(household_id) = active.id() else {
        bail!("no active household; run `hearth switch <id>` first");
    };

    let request = CreateTransactionRequest {
        household_id: household_id.to_string(),
        transaction_type: TransactionType::Expense,
        amount,
        account_id: Some(account.to_string()),
        from_account_id: None,
        to_account_id: None,
        is_split: false,
        splits: Vec::new(),
        paid: true,
    };
    let transaction = session.create_transaction(request).await?;
    println!(
        "Recorded expense {} of {} against {}.",
        transaction.id, transaction.amount, account
    );
    Ok(())
}
