//! `sidenav check` command implementation.

use std::path::PathBuf;

use clap::Args;
use sidenav_core::{Tree, TreeStats};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Generated sidebar JSON file.
    #[arg(short, long)]
    sidebar: PathBuf,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid sidebar.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let tree = Tree::from_json(&std::fs::read_to_string(&self.sidebar)?)?;
        let stats = tree.stats();

        output.heading(&self.sidebar.display().to_string());
        for line in summary(&stats) {
            output.info(&line);
        }
        if stats.empty_categories > 0 {
            output.warning(&format!(
                "{} empty categories will not be rendered",
                stats.empty_categories
            ));
        }
        output.success("Sidebar is valid");
        Ok(())
    }
}

fn summary(stats: &TreeStats) -> Vec<String> {
    vec![
        format!("  links:      {}", stats.links),
        format!("  categories: {}", stats.categories),
        format!("  max depth:  {}", stats.max_depth),
    ]
}
