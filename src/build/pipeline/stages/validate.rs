//! Landing page validation stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::validate::{ValidationError, validate_document};

/// Stage that rejects a landing page missing any of its required fields.
///
/// All violations are collected before failing, so one run reports the
/// complete list. Documents other than the root landing page pass through.
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let violations = validate_document(doc.slug(), &doc.metadata);
        if violations.is_empty() {
            return Ok(());
        }

        Err(ValidationError {
            document: doc.slug().to_string(),
            violations,
        }
        .into())
    }
}
