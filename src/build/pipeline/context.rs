//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::highlight::SyntaxHighlighter;
use crate::build::render::{GlobalContext, Renderer};
use crate::config::MarkdownConfig;

/// Shared, read-only context for pipeline stages.
///
/// Contains all resources and configuration needed by stages during
/// processing. Nothing in it changes while a build runs.
pub struct PipelineContext<'a> {
    // === Output configuration ===
    /// Directory where output files are written
    pub output_dir: &'a Path,

    /// Static asset source tree (may not exist)
    pub static_dir: &'a Path,

    /// Domain written to the `CNAME` file
    pub domain: &'a str,

    // === Site-level data ===
    /// Template values shared by every page
    pub global: &'a GlobalContext,

    /// Markdown processing configuration
    pub markdown_config: &'a MarkdownConfig,

    // === Services ===
    /// Syntax highlighter for code blocks
    pub highlighter: &'a SyntaxHighlighter,

    /// Template renderer
    pub renderer: &'a Renderer,
}

impl PipelineContext<'_> {
    /// Subdirectory of the output root that receives the static tree.
    pub const STATIC_OUTPUT_DIR: &'static str = "static";

    /// Name of the hosting configuration file at the output root.
    pub const HOSTING_FILE: &'static str = "CNAME";
}
