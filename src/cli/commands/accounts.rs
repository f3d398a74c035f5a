use anyhow::Result;
use compute::permission::AccountContext;

use crate::app::Session;

pub async fn accounts(session: &Session, investments: bool) -> Result<()> {
    let context = if investments {
        AccountContext::InvestmentFlow
    } else {
        AccountContext::TransactionEntry
    };
    let accounts = session.available_accounts(context).await?;
    if accounts.is_empty() {
        println!("No usable accounts in the active household.");
        return Ok(());
    }
    for account in &accounts {
        let ownership = if account.is_personal {
            account
                .account_owner_id
                .as_deref()
                .map(|owner| format!("personal, owner {owner}"))
                .unwrap_or_else(|| "personal".to_string())
        } else {
            "household".to_string()
        };
        println!(
            "{}  {}  {:?}  available {}  ({ownership})",
            account.id,
            account.name,
            account.account_type,
            account.available_balance()
        );
    }
    Ok(())
}
