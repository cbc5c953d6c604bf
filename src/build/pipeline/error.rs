//! Pipeline error types.

use std::path::PathBuf;

use crate::build::document::FrontMatterError;
use crate::build::markdown::MarkdownError;
use crate::build::render::RenderError;
use crate::build::validate::ValidationError;

/// Errors that can occur during pipeline processing.
///
/// Every variant names the document or path it came from.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("{document}: {source}")]
    FrontMatter {
        document: String,
        #[source]
        source: FrontMatterError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{document}: {source}")]
    Render {
        document: String,
        #[source]
        source: RenderError,
    },

    #[error("{document}: markdown rendering error: {source}")]
    Markdown {
        document: String,
        #[source]
        source: MarkdownError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
