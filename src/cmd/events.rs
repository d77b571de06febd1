use clap::Parser;

use super::{Error, Session};
use crate::{
    display::event_lines,
    models::{EventScope, RangePreset},
};

#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Only show events of this contract.
    #[arg(short, long)]
    pub contract: Option<String>,
    /// Time window: 1w, 1m or 3m. All-time when omitted.
    #[arg(short, long, requires = "contract")]
    pub range: Option<RangePreset>,
}

impl EventsArgs {
    fn scope(&self) -> EventScope {
        match &self.contract {
            Some(id) => EventScope::contract(id.clone(), self.range),
            None => EventScope::All,
        }
    }
}

pub(super) async fn execute(session: &Session, args: EventsArgs) -> Result<(), Error> {
    let scope = args.scope();
    session.orchestrator.select_events(scope.clone()).await?;

    let snapshot = session.orchestrator.feed().snapshot().await;
    if snapshot.events.is_empty() {
        println!("No events for {scope}");
        return Ok(());
    }
    for event in &snapshot.events {
        for line in event_lines(event) {
            println!("{line}");
        }
    }
    Ok(())
}
