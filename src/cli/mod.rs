use anyhow::Result;
use clap::{Parser, Subcommand};
use model::user::User;

pub mod commands;

use commands::{accounts, households, pay, posture, split, switch};

use crate::app::Session;
use crate::config;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Household finance context, permissions and settlement tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the households you belong to and the active selection
    Households,
    /// Switch the active household
    Switch {
        /// Household id to act in
        id: String,
    },
    /// List accounts usable for a transaction in the active household
    Accounts {
        /// Include investment accounts (explicit investment flow)
        #[arg(long)]
        investments: bool,
    },
    /// Preview an equal split of an expense across the active household
    Split {
        /// Expense amount, e.g. 100.00
        amount: f64,
    },
    /// Update your sharing posture in the active household
    Posture {
        /// Allow other members to use your shared personal accounts
        #[arg(long)]
        allow: Option<bool>,
        /// Comma-separated personal account ids to expose
        #[arg(long, value_delimiter = ',')]
        share: Option<Vec<String>>,
    },
    /// Record a paid expense against an account in the active household
    Pay {
        /// Expense amount, e.g. 42.50
        amount: f64,
        /// Account id to settle against
        #[arg(long)]
        account: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = config::load();
        let session = Session::new(&config)?;

        if let (Some(id), Some(email)) = (&config.user_id, &config.user_email) {
            session.sign_in(User::new(id.clone(), email.clone()));
        }

        match self.command {
            Commands::Households => households(&session).await?,
            Commands::Switch { id } => switch(&session, &id).await?,
            Commands::Accounts { investments } => accounts(&session, investments).await?,
            Commands::Split { amount } => split(&session, amount).await?,
            Commands::Posture { allow, share } => posture(&session, allow, share).await?,
            Commands::Pay { amount, account } => pay(&session, amount, &account).await?,
        }
        Ok(())
    }
}
