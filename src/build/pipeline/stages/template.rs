//! Page template rendering stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::render::{PageContext, PageInfo};

/// Stage that renders the page through the template named in its front
/// matter (`page` by default).
///
/// After this stage, `doc.output_html` contains the complete HTML page.
pub struct TemplateStage;

impl Stage for TemplateStage {
    fn name(&self) -> &'static str {
        "template"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let page = PageInfo::new(
            &doc.source,
            &doc.front_matter,
            std::mem::take(&mut doc.content),
            &ctx.global.site,
        );
        let template = page.template.clone();

        let page_context = PageContext {
            global: ctx.global.clone(),
            page,
        };

        let html = ctx
            .renderer
            .render(&template, &page_context)
            .map_err(|source| PipelineError::Render {
                document: doc.source.slug.clone(),
                source,
            })?;

        doc.output_html = Some(html);
        Ok(())
    }
}
