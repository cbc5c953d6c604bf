//! Build pipeline for document processing.
//!
//! Each document runs through a series of stages before the next document
//! starts:
//! 1. Front matter extraction
//! 2. Markdown rendering
//! 3. Landing page validation
//! 4. Template rendering
//! 5. File writing
//!
//! Build-wide stages run once after every document has been written
//! (static asset copy, `CNAME`).

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::ProcessingDocument;
pub use error::PipelineError;

use stages::{
    FrontMatterStage, HostingFileStage, MarkdownStage, StaticAssetsStage, TemplateStage,
    ValidateStage, WriteStage,
};

use super::BuildPhase;
use super::document::SourceDocument;

/// A stage in the document processing pipeline.
///
/// Stages transform one document at a time, in place, before handing it to
/// the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage (used in logs and errors).
    fn name(&self) -> &'static str;

    /// Process a single document.
    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// A stage that runs once after all documents are processed.
pub trait FinalizeStage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// The build phase this stage represents.
    fn phase(&self) -> BuildPhase;

    /// Run after all documents are processed and written. Returns the number
    /// of files written.
    fn finalize(&self, ctx: &PipelineContext) -> Result<usize, PipelineError>;
}

/// The document processing pipeline.
pub struct Pipeline {
    /// Document processing stages (run for each document)
    stages: Vec<Box<dyn Stage>>,
    /// Build-wide stages (run once after all documents)
    finalize_stages: Vec<Box<dyn FinalizeStage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            finalize_stages: Vec::new(),
        }
    }

    /// Create the default pipeline.
    ///
    /// Stages: frontmatter → markdown → validate → template → write,
    /// then static → cname.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(FrontMatterStage)
            .add_stage(MarkdownStage)
            .add_stage(ValidateStage)
            .add_stage(TemplateStage)
            .add_stage(WriteStage)
            .add_finalize_stage(StaticAssetsStage)
            .add_finalize_stage(HostingFileStage);
        pipeline
    }

    /// Pipeline that stops before producing output: parse and validate only.
    pub fn check_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(FrontMatterStage)
            .add_stage(ValidateStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a finalize stage (runs after all documents are processed).
    pub fn add_finalize_stage<S: FinalizeStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.finalize_stages.push(Box::new(stage));
        self
    }

    /// Run every document stage on one document.
    pub fn process(
        &self,
        source: SourceDocument,
        ctx: &PipelineContext,
    ) -> Result<ProcessingDocument, PipelineError> {
        let mut doc = ProcessingDocument::new(source);
        for stage in &self.stages {
            log::trace!("{}: stage '{}'", doc.slug(), stage.name());
            stage.process(&mut doc, ctx)?;
        }
        Ok(doc)
    }

    /// Build-wide stages, in order.
    pub fn finalize_stages(&self) -> impl Iterator<Item = &dyn FinalizeStage> {
        self.finalize_stages.iter().map(|s| s.as_ref())
    }

    /// Get the names of all document stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_order() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.stage_names(),
            vec!["frontmatter", "markdown", "validate", "template", "write"]
        );
        let phases: Vec<_> = pipeline.finalize_stages().map(|s| s.phase()).collect();
        assert_eq!(
            phases,
            vec![BuildPhase::CopyingAssets, BuildPhase::WritingHostingFile]
        );
    }

    #[test]
    fn test_check_pipeline_writes_nothing() {
        let pipeline = Pipeline::check_pipeline();
        assert_eq!(pipeline.stage_names(), vec!["frontmatter", "validate"]);
        assert_eq!(pipeline.finalize_stages().count(), 0);
    }
}
