//! Default pipeline stages.
//!
//! The standard document processing pipeline consists of:
//!
//! 1. **FrontMatterStage** - Split YAML front matter from the markdown body
//! 2. **MarkdownStage** - Convert markdown to HTML with syntax highlighting
//! 3. **ValidateStage** - Check the landing page's required shape
//! 4. **TemplateStage** - Render the page through its template
//! 5. **WriteStage** - Write final HTML to the output directory
//!
//! Followed by the build-wide stages:
//!
//! - **StaticAssetsStage** - Copy the static tree into the output
//! - **HostingFileStage** - Write the `CNAME` file

mod assets;
mod frontmatter;
mod hosting;
mod markdown;
mod template;
mod validate;
mod write;

pub use assets::StaticAssetsStage;
pub use frontmatter::FrontMatterStage;
pub use hosting::HostingFileStage;
pub use markdown::MarkdownStage;
pub use template::TemplateStage;
pub use validate::ValidateStage;
pub use write::WriteStage;
