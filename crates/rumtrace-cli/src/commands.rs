use super::args::{Cli, Commands};
use super::handlers;
use super::logging;
use anyhow::{Context, Result};
use rumtrace_runtime::{Config, resolve_config_path};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config_path = resolve_config_path(cli.config.as_deref())?;
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::Replay {
            file,
            format,
            timeout_secs,
            track_background_events,
        } => {
            if let Some(secs) = timeout_secs {
                config.session_timeout_secs = secs;
            }
            if track_background_events {
                config.track_background_events = true;
            }
            config.validate()?;

            handlers::replay::handle(&config, &file, format)
        }

        Commands::Config { command } => handlers::config::handle(command, &config, &config_path),
    }
}
