use anyhow::Result;
use session::ActiveHousehold;
use tracing::info;

use crate::app::Session;

/// Prints the household list with the active selection marked.
pub async fn households(session: &Session) -> Result<()> {
    let active = session.active_household().await?;
    let active_id = active.id().map(str::to_owned);

    let list = session.coherence().households().await?;
    if list.is_empty() {
        println!("You do not belong to any household yet.");
        return Ok(());
    }

    for household in &list {
        let marker = if Some(household.id.as_str()) == active_id.as_deref() {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {}  ({:?}, created {})",
            household.id,
            household.name,
            household.role,
            household.created_at.date_naive()
        );
    }
    if let ActiveHousehold::Degraded(record) = &active {
        println!(
            "! active household {} ({}) was not found on the server",
            record.id, record.name
        );
    }
    Ok(())
}

/// Explicit switch action; the single interactive writer of the selection.
pub async fn switch(session: &Session, id: &str) -> Result<()> {
    let household = session.switch_household(id).await?;
    info!(id = %household.id, "switched household");
    println!("Now acting in {} ({})", household.name, household.id);
    Ok(())
}
