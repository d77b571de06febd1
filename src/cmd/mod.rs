//! The `thorax` command line.

mod analysis;
mod contracts;
mod events;
mod logs;
mod prompt;
mod status;

use std::sync::Arc;

use clap::Subcommand;
use thiserror::Error;
use tokio::sync::mpsc;

pub use analysis::{AbiArgs, ExitArgs, LegalArgs};
pub use contracts::{AlertArgs, DeleteArgs, RegisterArgs};
pub use events::EventsArgs;
pub use logs::LogsArgs;
pub use prompt::StdinConfirm;

use crate::{
    actions::{ActionError, ActionOrchestrator, Notice},
    config::AppConfig,
    transport::{RestBackend, TransportError},
};

/// Failures of a command.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Action(#[from] ActionError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Subcommands of `thorax`.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Shows which backend integrations are configured.
    Health,
    /// Shows the backend's operational counters.
    Metrics,
    /// Lists registered contracts.
    Contracts,
    /// Lists events across all contracts or for one contract.
    Events(EventsArgs),
    /// Registers a contract for monitoring.
    Register(RegisterArgs),
    /// Enables monitoring of a contract.
    Activate {
        /// Contract id.
        id: String,
    },
    /// Disables monitoring of a contract.
    Deactivate {
        /// Contract id.
        id: String,
    },
    /// Deletes a contract and its events.
    Delete(DeleteArgs),
    /// Sends a manual alert to a contract's owner.
    Alert(AlertArgs),
    /// Triggers one scan cycle.
    MonitorOnce,
    /// Runs the ABI risk analysis.
    AnalyzeAbi(AbiArgs),
    /// Runs the legal analysis.
    Legal(LegalArgs),
    /// Broadcasts a pre-signed exit transaction.
    Exit(ExitArgs),
    /// Tails the live log stream.
    Logs(LogsArgs),
}

/// Backend clients and views shared by one command invocation.
pub(crate) struct Session {
    backend: Arc<RestBackend>,
    orchestrator: ActionOrchestrator,
    notices: mpsc::UnboundedReceiver<Notice>,
}

impl Session {
    fn new(config: &AppConfig) -> Result<Self, Error> {
        let backend = Arc::new(RestBackend::from_config(config)?);
        let (notices_tx, notices) = mpsc::unbounded_channel();
        let orchestrator = ActionOrchestrator::new(backend.clone(), Arc::new(notices_tx));
        Ok(Self { backend, orchestrator, notices })
    }

    /// Prints queued notices to stderr.
    fn report_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            eprintln!("{notice}");
        }
    }
}

/// Runs one command against the configured backend. Action outcomes are
/// printed to stderr as notices.
pub async fn execute(command: Command, config: AppConfig) -> Result<(), Error> {
    tracing::debug!(backend_url = %config.backend_url, ?command, "Executing command");
    let mut session = Session::new(&config)?;

    let result = match command {
        Command::Health => status::health(&session).await,
        Command::Metrics => status::metrics(&session).await,
        Command::Contracts => contracts::list(&session).await,
        Command::Events(args) => events::execute(&session, args).await,
        Command::Register(args) => contracts::register(&session, args).await,
        Command::Activate { id } => contracts::set_active(&session, &id, true).await,
        Command::Deactivate { id } => contracts::set_active(&session, &id, false).await,
        Command::Delete(args) => contracts::delete(&session, args).await,
        Command::Alert(args) => contracts::alert(&session, args).await,
        Command::MonitorOnce => status::monitor_once(&session).await,
        Command::AnalyzeAbi(args) => analysis::analyze_abi(&session, args).await,
        Command::Legal(args) => analysis::legal(&session, args).await,
        Command::Exit(args) => analysis::exit(&session, args).await,
        Command::Logs(args) => logs::execute(session.backend.clone(), config.log_tail, args).await,
    };

    session.report_notices();
    result
}
