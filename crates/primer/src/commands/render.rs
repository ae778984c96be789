//! `primer render` command.

use std::path::PathBuf;

use clap::Args;
use primer_render::render_primer;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the `render` command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown source file.
    pub(crate) markdown: PathBuf,

    /// Output document path.
    pub(crate) output: PathBuf,

    /// Template document. Synthesized with default placeholders when the
    /// path does not exist yet.
    #[arg(long, env = "PRIMER_TEMPLATE")]
    pub(crate) template: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        render_primer(&self.markdown, &self.output, self.template.as_deref())?;
        output.success(&format!("Rendered {}", self.output.display()));
        Ok(())
    }
}
