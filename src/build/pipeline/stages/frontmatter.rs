//! Front matter extraction stage.

use crate::build::document::{FrontMatter, parse_front_matter};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that splits the raw document into metadata and markdown body.
///
/// Malformed YAML fails the document (and with it the build) instead of
/// silently rendering the page without its metadata.
pub struct FrontMatterStage;

impl Stage for FrontMatterStage {
    fn name(&self) -> &'static str {
        "frontmatter"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let error = |source| PipelineError::FrontMatter {
            document: doc.source.source_path.display().to_string(),
            source,
        };

        let parsed = parse_front_matter(&doc.content).map_err(error)?;
        let front_matter = FrontMatter::from_metadata(&parsed.metadata).map_err(error)?;

        doc.metadata = parsed.metadata;
        doc.front_matter = front_matter;
        doc.content = parsed.body;
        Ok(())
    }
}
