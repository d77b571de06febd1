use super::{Error, Session};

pub(super) async fn health(session: &Session) -> Result<(), Error> {
    let health = session.orchestrator.status().refresh_health().await?;
    for (label, available) in health.integrations() {
        let state = if available { "available" } else { "not configured" };
        println!("{label:<12} {state}");
    }
    Ok(())
}

pub(super) async fn metrics(session: &Session) -> Result<(), Error> {
    let metrics = session.orchestrator.status().refresh_metrics().await?;
    if metrics.is_empty() {
        println!("No metrics reported");
    }
    for (name, value) in &metrics {
        println!("{name}: {value}");
    }
    Ok(())
}

pub(super) async fn monitor_once(session: &Session) -> Result<(), Error> {
    let response = session.orchestrator.monitor_once().await?;
    if let Some(stats) = response.monitoring {
        println!("scanned blocks:  {}", stats.scanned_blocks);
        println!("events recorded: {}", stats.events_recorded);
    }
    for (name, value) in &session.orchestrator.status().metrics().await {
        println!("{name}: {value}");
    }
    Ok(())
}
