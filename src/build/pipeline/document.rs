//! Document types for pipeline processing.

use crate::build::document::{FrontMatter, Metadata, SourceDocument};

/// A document being processed through the pipeline.
///
/// Wraps the `SourceDocument` with state that evolves through the stages:
///
/// 1. Initially: `content` = raw text, metadata empty
/// 2. After frontmatter: `metadata` and `front_matter` set, `content` = markdown body
/// 3. After markdown: `content` = HTML fragment
/// 4. After template: `output_html` = final page HTML
#[derive(Debug)]
pub struct ProcessingDocument {
    /// The document as read from disk
    pub source: SourceDocument,

    /// Raw front matter mapping
    pub metadata: Metadata,

    /// Typed view over `metadata`
    pub front_matter: FrontMatter,

    /// Content being processed.
    pub content: String,

    /// Final HTML output after template rendering.
    ///
    /// None until the template stage populates it.
    pub output_html: Option<String>,
}

impl ProcessingDocument {
    pub fn new(source: SourceDocument) -> Self {
        let content = source.raw.clone();
        Self {
            source,
            metadata: Metadata::new(),
            front_matter: FrontMatter::default(),
            content,
            output_html: None,
        }
    }

    pub fn slug(&self) -> &str {
        &self.source.slug
    }
}
