use crate::args::ConfigCommand;
use anyhow::{Result, bail};
use rumtrace_runtime::Config;
use std::path::PathBuf;

pub fn handle(command: ConfigCommand, config: &Config, config_path: &PathBuf) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save_to(config_path)?;
            println!("Wrote {}", config_path.display());
        }
    }
    Ok(())
}
