use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunefm_lastfm_client::LastfmClient;
use tunefm_shared_config::LastfmConfig;

mod cli;
mod commands;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunefm=info,tunefm_lastfm_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match LastfmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Some(name) = e.variable() {
                anyhow::bail!("{} (set {} in the environment or .env)", e, name);
            }
            return Err(e.into());
        }
    };
    tracing::debug!(?config, "Loaded configuration");

    let client = LastfmClient::from_config(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Auth => {
            let stdin = std::io::stdin();
            commands::auth(&client, &mut stdin.lock(), &mut out)?;
        }
        Command::ArtistTags(args) => commands::artist_tags(&client, &args, &mut out)?,
    }

    Ok(())
}
