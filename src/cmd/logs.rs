use std::{sync::Arc, time::Duration};

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;

use super::Error;
use crate::{
    config::LogTailConfig,
    transport::RestBackend,
    views::LogTail,
};

#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Stop after this many entries.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,
}

/// Prints live log entries until interrupted, the limit is reached, or the
/// tail gives up reconnecting.
pub(super) async fn execute(
    backend: Arc<RestBackend>,
    config: LogTailConfig,
    args: LogsArgs,
) -> Result<(), Error> {
    let handle = LogTail::mount(backend, config);
    let mut entries = handle.entries();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut printed = 0u64;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("Interrupted");
                break;
            }
            entry = entries.recv() => match entry {
                Ok(entry) => {
                    println!("{entry}");
                    printed += 1;
                    if args.limit.is_some_and(|limit| printed >= limit) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Log output fell behind"),
                Err(RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                if handle.is_finished() {
                    eprintln!("Log stream disconnected");
                    break;
                }
            }
        }
    }

    handle.close().await;
    Ok(())
}
