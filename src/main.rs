use clap::Parser;
use thorax::{
    cmd::{self, Command},
    config::AppConfig,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    /// Overrides the configured backend address.
    #[arg(long, global = true)]
    backend_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    tracing::debug!("Loading application configuration...");
    let mut config = AppConfig::new(cli.config_dir.as_deref())?;
    if let Some(backend_url) = cli.backend_url {
        config = config.with_backend_url(backend_url);
    }
    tracing::debug!(backend_url = %config.backend_url, "Configuration loaded.");

    cmd::execute(cli.command, config).await?;

    Ok(())
}
