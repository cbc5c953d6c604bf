//! File writing stage.
//!
//! Writes the final HTML output to the filesystem.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that writes rendered documents to `<output>/<slug>.html`.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let html = doc.output_html.as_ref().ok_or_else(|| {
            PipelineError::stage(
                "write",
                format!(
                    "document '{}' has no output HTML (was template stage run?)",
                    doc.slug()
                ),
            )
        })?;

        let output_path = ctx.output_dir.join(doc.source.output_file_name());
        std::fs::write(&output_path, html).map_err(|e| PipelineError::io(&output_path, e))?;

        log::info!("  wrote {}", output_path.display());
        Ok(())
    }
}
