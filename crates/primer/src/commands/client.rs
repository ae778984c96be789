//! `primer client` commands.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use primer_repo::{LeadRecord, ensure_client_repo};

use crate::error::CliError;
use crate::output::Output;

/// Client repository commands.
#[derive(Subcommand)]
pub(crate) enum ClientCommand {
    /// Create the repository layout for a client.
    Init(InitArgs),
}

impl ClientCommand {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Init(args) => args.execute(output),
        }
    }
}

/// Arguments for `client init`.
#[derive(Args)]
pub(crate) struct InitArgs {
    /// Base directory holding client repositories.
    #[arg(env = "PRIMER_CLIENTS_DIR")]
    pub(crate) base_dir: PathBuf,

    /// Company name; its sanitized form becomes the folder name.
    pub(crate) company_name: String,
}

impl InitArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let repo = ensure_client_repo(&self.base_dir, &self.company_name)?;

        // Seed the dossier with a starter lead record; an existing record
        // is the client's data and stays untouched.
        if !repo.lead_input_path.exists() {
            let record = LeadRecord::for_company(self.company_name.trim());
            let mut json = serde_json::to_string_pretty(&record)?;
            json.push('\n');
            fs::write(&repo.lead_input_path, json)?;
        }

        output.success(&format!("Client repo ready: {}", repo.root.display()));
        output.info(&format!("  dossier: {}", repo.dossier_dir.display()));
        output.info(&format!("  latest:  {}", repo.latest_dir.display()));
        output.info(&format!("  runs:    {}", repo.runs_dir.display()));
        Ok(())
    }
}
