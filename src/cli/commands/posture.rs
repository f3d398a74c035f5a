use anyhow::Result;

use crate::app::Session;

pub async fn posture(
    session: &Session,
    allow: Option<bool>,
    share: Option<Vec<String>>,
) -> Result<()> {
    if allow.is_none() && share.is_none() {
        let members = session.members().await?;
        for member in &members {
            println!(
                "{}  {:?}  access={}  shares=[{}]",
                member
                    .user
                    .as_ref()
                    .map(|u| u.email.as_str())
                    .unwrap_or(member.user_id.as_str()),
                member.role,
                member.allow_personal_account_access,
                member.shared_account_ids.join(", ")
            );
        }
        return Ok(());
    }

    if let Some(allow) = allow {
        session.set_personal_account_access(allow).await?;
        println!("Personal account access set to {allow}.");
    }
    if let Some(account_ids) = share {
        session.set_shared_account_ids(account_ids.clone()).await?;
        println!("Shared accounts set to [{}].", account_ids.join(", "));
    }
    Ok(())
}
