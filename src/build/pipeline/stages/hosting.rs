//! Hosting configuration stage.

use crate::build::BuildPhase;
use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError};

/// Writes the `CNAME` file used by the static host to bind the custom
/// domain. The file holds the configured domain and nothing else.
pub struct HostingFileStage;

impl FinalizeStage for HostingFileStage {
    fn name(&self) -> &'static str {
        "cname"
    }

    fn phase(&self) -> BuildPhase {
        BuildPhase::WritingHostingFile
    }

    fn finalize(&self, ctx: &PipelineContext) -> Result<usize, PipelineError> {
        let path = ctx.output_dir.join(PipelineContext::HOSTING_FILE);
        std::fs::write(&path, ctx.domain.trim()).map_err(|e| PipelineError::io(&path, e))?;

        log::info!("wrote {} for {}", path.display(), ctx.domain.trim());
        Ok(1)
    }
}
