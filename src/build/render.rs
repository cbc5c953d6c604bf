use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use super::document::{FrontMatter, SourceDocument};
use crate::config::{Config, LinksConfig};

/// Template used when front matter does not name one.
pub const DEFAULT_TEMPLATE: &str = "page";

/// Page keys computed by the builder; front matter cannot override them.
const RESERVED_PAGE_KEYS: &[&str] = &["slug", "url", "content"];

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("templates directory not found: {}", .0.display())]
    TemplatesNotFound(PathBuf),

    #[error("template '{name}' not found (available: {})", .available.join(", "))]
    TemplateNotFound {
        name: String,
        available: Vec<String>,
    },
}

/// Normalize a template reference: `None` means the default template and
/// the `.html` suffix is added when missing.
/// None -> "page.html", "landing" -> "landing.html"
pub fn template_file_name(template: Option<&str>) -> String {
    let name = template.unwrap_or(DEFAULT_TEMPLATE);
    if name.ends_with(".html") {
        name.to_string()
    } else {
        format!("{name}.html")
    }
}

/// The template renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load every `*.html` template under `templates_path`.
    pub fn new(templates_path: &Path) -> Result<Self, RenderError> {
        if !templates_path.is_dir() {
            return Err(RenderError::TemplatesNotFound(templates_path.to_path_buf()));
        }

        let glob = templates_path.join("**/*.html");
        let glob_str = glob.to_string_lossy();
        let tera = Tera::new(&glob_str)?;

        Ok(Self { tera })
    }

    /// Whether a template with this file name was loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render the named template with a page context.
    pub fn render(&self, template: &str, context: &PageContext) -> Result<String, RenderError> {
        if !self.has_template(template) {
            let mut available: Vec<String> =
                self.tera.get_template_names().map(str::to_string).collect();
            available.sort();
            return Err(RenderError::TemplateNotFound {
                name: template.to_string(),
                available,
            });
        }

        let tera_context = Context::from_serialize(context)?;
        Ok(self.tera.render(template, &tera_context)?)
    }

    #[cfg(test)]
    pub fn from_templates(templates: &[(&str, &str)]) -> Self {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .expect("test templates must parse");
        Self { tera }
    }
}

// =============================================================================
// Template context
// =============================================================================

/// Everything a template can see while rendering one page.
///
/// Site-wide values sit at the top level; the current document lives under
/// `page`. The struct is built once per document and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    #[serde(flatten)]
    pub global: GlobalContext,
    pub page: PageInfo,
}

/// Site-wide template values, shared by every page of a build.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalContext {
    pub site: SiteContext,
    pub contact_email: String,
    pub links: LinksConfig,
    pub analytics: AnalyticsContext,
    /// Design tokens from config, passed through untouched
    pub tokens: serde_json::Value,
    pub current_year: i32,
    /// Stylesheet matching the highlighted code blocks
    pub highlight_css: String,
    pub dev: DevContext,
}

impl GlobalContext {
    pub fn new(config: &Config, highlight_css: String, current_year: i32, dev: DevContext) -> Self {
        Self {
            site: SiteContext {
                name: config.site.name.clone(),
                tagline: config.site.tagline.clone(),
                description: config.site.description.clone(),
                domain: config.site.domain.clone(),
            },
            contact_email: config.site.contact_email.clone(),
            links: config.links.clone(),
            analytics: AnalyticsContext {
                website_id: config.analytics.website_id.clone(),
                script_url: config.analytics.script_url.clone(),
                enabled: config.analytics.is_enabled(),
            },
            tokens: config.tokens.clone(),
            current_year,
            highlight_css,
            dev,
        }
    }
}

/// Site-level information.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsContext {
    pub website_id: String,
    pub script_url: String,
    pub enabled: bool,
}

/// Development server state (dev mode, live reload, version).
#[derive(Debug, Clone, Default, Serialize)]
pub struct DevContext {
    pub enabled: bool,
    pub live_reload: bool,
    pub version: String,
}

impl DevContext {
    pub fn new(enabled: bool, live_reload: bool) -> Self {
        Self {
            enabled,
            live_reload: enabled && live_reload,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Information about the current page.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub slug: String,
    pub url: String,
    /// Resolved template file name, e.g. `landing.html`
    pub template: String,
    pub title: String,
    pub description: String,
    /// Rendered body HTML
    pub content: String,
    /// Custom front matter fields (flattened, e.g. `page.features`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PageInfo {
    /// Merge a document's front matter with its rendered body.
    ///
    /// Missing title and description fall back to the site's name and
    /// description. Front matter keys that collide with computed keys are
    /// dropped.
    pub fn new(
        doc: &SourceDocument,
        front_matter: &FrontMatter,
        content: String,
        site: &SiteContext,
    ) -> Self {
        let mut extra = front_matter.extra.clone();
        for key in RESERVED_PAGE_KEYS {
            if extra.remove(*key).is_some() {
                log::debug!("{}: front matter key '{}' is reserved, ignoring it", doc.slug, key);
            }
        }

        Self {
            slug: doc.slug.clone(),
            url: doc.url(),
            template: template_file_name(front_matter.template.as_deref()),
            title: front_matter
                .title
                .clone()
                .unwrap_or_else(|| site.name.clone()),
            description: front_matter
                .description
                .clone()
                .unwrap_or_else(|| site.description.clone()),
            content,
            extra,
        }
    }
}
