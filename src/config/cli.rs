use crate::config::EtlConfig;
use crate::domain::model::LoadFailurePolicy;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "neo-etl")]
#[command(about = "Load the NASA near-Earth-object feed into PostgreSQL")]
pub struct CliArgs {
    #[arg(
        long,
        help = "TOML configuration file; environment variables are used when omitted"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "First day of the feed window (YYYY-MM-DD), defaults to today")]
    pub start_date: Option<String>,

    #[arg(long, help = "Append rows to this CSV file instead of PostgreSQL")]
    pub csv_output: Option<PathBuf>,

    #[arg(long, help = "What to do when the load step fails: swallow or fail")]
    pub on_load_failure: Option<LoadFailurePolicy>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log per-phase timings and process stats")]
    pub monitor: bool,
}

impl CliArgs {
    /// Resolve the configuration once: TOML file or environment, then flag overrides.
    pub fn load_config(&self) -> Result<EtlConfig> {
        let mut config = match &self.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::from_env()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut EtlConfig) {
        if let Some(start_date) = &self.start_date {
            config.start_date = start_date.clone();
        }
        if let Some(path) = &self.csv_output {
            config.load.csv_output = Some(path.clone());
        }
        if let Some(policy) = self.on_load_failure {
            config.load.on_failure = policy;
        }
    }
}
