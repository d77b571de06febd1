use clap::Parser;

use super::{Error, Session, StdinConfirm};
use crate::{
    actions::{Confirm, RegisterForm},
    display::{contract_details, contract_line},
    models::{Chain, Network},
    views::RemoveOutcome,
};

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// On-chain contract hash or address.
    #[arg(long)]
    hash: Option<String>,
    /// Owner email for notifications.
    #[arg(long)]
    email: Option<String>,
    /// ABI or manifest JSON.
    #[arg(long)]
    abi: Option<String>,
    /// Pre-signed transaction to broadcast after registration.
    #[arg(long = "raw-tx")]
    raw_tx: Option<String>,
    /// Chain family.
    #[arg(long, default_value_t = Chain::Neo)]
    chain: Chain,
    /// Deployment network.
    #[arg(long, default_value_t = Network::Testnet)]
    network: Network,
}

impl RegisterArgs {
    pub(super) fn into_form(self) -> RegisterForm {
        RegisterForm {
            contract_hash: self.hash.unwrap_or_default(),
            owner_email: self.email.unwrap_or_default(),
            abi: self.abi.unwrap_or_default(),
            raw_tx_hex: self.raw_tx.unwrap_or_default(),
            network: self.network,
            chain: self.chain,
        }
    }
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Contract id.
    pub id: String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct AlertArgs {
    /// Contract id.
    pub id: String,
    /// Alert text.
    #[arg(short, long)]
    pub message: String,
    /// Do not synthesize a voice message.
    #[arg(long)]
    pub no_voice: bool,
}

impl AlertArgs {
    pub(super) fn voice(&self) -> bool {
        !self.no_voice
    }
}

pub(super) async fn list(session: &Session) -> Result<(), Error> {
    session.orchestrator.registry().refresh().await?;
    let contracts = session.orchestrator.registry().contracts().await;
    if contracts.is_empty() {
        println!("No contracts registered");
    }
    for contract in &contracts {
        println!("{}", contract_line(contract));
        for line in contract_details(contract) {
            println!("{line}");
        }
    }
    Ok(())
}

pub(super) async fn register(session: &Session, args: RegisterArgs) -> Result<(), Error> {
    let response = session.orchestrator.register(&args.into_form()).await?;
    if let Some(contract) = &response.contract {
        println!("{}", contract_line(contract));
    }
    if !response.analysis.is_null() {
        println!("analysis:\n{}", serde_json::to_string_pretty(&response.analysis)?);
    }
    if let Some(exit) = &response.exit_broadcast {
        println!("exit broadcast:\n{}", serde_json::to_string_pretty(exit)?);
    }
    Ok(())
}

pub(super) async fn set_active(session: &Session, id: &str, active: bool) -> Result<(), Error> {
    session.orchestrator.set_active(id, active).await?;
    if let Some(contract) = session.orchestrator.registry().get(id).await {
        println!("{}", contract_line(&contract));
    }
    Ok(())
}

pub(super) async fn delete(session: &Session, args: DeleteArgs) -> Result<(), Error> {
    let skip_prompt = |_: &str| true;
    let confirm: &dyn Confirm = if args.yes { &skip_prompt } else { &StdinConfirm };
    if session.orchestrator.delete(&args.id, confirm).await? == RemoveOutcome::Cancelled {
        println!("Nothing deleted");
    }
    Ok(())
}

pub(super) async fn alert(session: &Session, args: AlertArgs) -> Result<(), Error> {
    let voice = args.voice();
    session.orchestrator.send_alert(&args.id, &args.message, voice).await?;
    Ok(())
}
