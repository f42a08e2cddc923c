//! `sidenav cloud-url` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use sidenav_config::{CloudConfig, Config};
use sidenav_core::{CloudUrl, IdentityProvider};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the cloud-url command.
#[derive(Args)]
pub(crate) struct CloudUrlArgs {
    /// Analytics distinct id of the visitor (default: none, base URL is kept).
    #[arg(long, env = "SIDENAV_DISTINCT_ID")]
    distinct_id: Option<String>,

    /// Path to configuration file (default: auto-discover sidenav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show lookup attempts).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CloudUrlArgs {
    /// Execute the cloud-url command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let id = self.distinct_id;
        let url = resolve(&config.cloud, &|| id.clone());
        output.result(&url)?;
        Ok(())
    }
}

/// Run the lookup schedule to completion and return the final URL.
///
/// Attempts are driven at their due times, so no real waiting happens.
fn resolve(cloud: &CloudConfig, identity: &dyn IdentityProvider) -> String {
    let mut url = CloudUrl::new(
        cloud.url.clone(),
        cloud.max_attempts,
        cloud.interval(),
        Instant::now(),
    );
    while let Some(due) = url.next_due() {
        if url.poll(due, identity) {
            tracing::info!(url = url.url(), "Cloud URL resolved");
        }
    }
    url.url().to_owned()
}
