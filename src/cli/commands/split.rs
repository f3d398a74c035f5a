use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::app::Session;

pub async fn split(session: &Session, amount: f64) -> Result<()> {
    let amount = Decimal::try_from(amount).context("amount is not representable")?;
    let splits = session.preview_split(amount).await?;

    println!("Splitting {amount} across {} member(s):", splits.len());
    for share in &splits {
        println!("  {}  {}", share.user_id, share.amount);
    }
    let sum: Decimal = splits.iter().map(|s| s.amount).sum();
    println!("  total {sum}");
    Ok(())
}
