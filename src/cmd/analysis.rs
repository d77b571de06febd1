use clap::Parser;
use serde_json::Value;

use super::{Error, Session};

#[derive(Parser, Debug)]
pub struct AbiArgs {
    /// ABI or manifest JSON. Invalid JSON is analyzed as an empty ABI.
    #[arg(long)]
    pub abi: String,
}

#[derive(Parser, Debug)]
pub struct LegalArgs {
    /// ABI or manifest JSON. Invalid JSON is analyzed as an empty ABI.
    #[arg(long)]
    pub abi: String,
    /// Also synthesize a voice summary.
    #[arg(long)]
    pub voice: bool,
}

#[derive(Parser, Debug)]
pub struct ExitArgs {
    /// Signed transaction, hex encoded.
    #[arg(long = "raw-tx")]
    pub raw_tx: String,
}

fn print_json(value: &Value) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) async fn analyze_abi(session: &Session, args: AbiArgs) -> Result<(), Error> {
    let response = session.orchestrator.analyze_abi(&args.abi).await?;
    print_json(response.get("analysis").unwrap_or(&response))
}

pub(super) async fn legal(session: &Session, args: LegalArgs) -> Result<(), Error> {
    let response = session.orchestrator.analyze_legal(&args.abi, args.voice).await?;
    print_json(&response)
}

pub(super) async fn exit(session: &Session, args: ExitArgs) -> Result<(), Error> {
    let response = session.orchestrator.exit_broadcast(&args.raw_tx).await?;
    print_json(&response)
}
