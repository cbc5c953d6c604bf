//! Configuration type definitions.
//!
//! This module contains all the data structures used in `landfall.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// The complete site configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    /// Design tokens, passed to templates untouched as `tokens.*`
    #[serde(default)]
    pub tokens: serde_json::Value,
    /// Development-specific settings (watch mode, etc.)
    #[serde(default)]
    pub dev: DevConfig,
}

// =============================================================================
// Site metadata
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    /// Custom domain, written verbatim to the `CNAME` file
    pub domain: String,
    #[serde(default)]
    pub contact_email: String,
}

/// App store and download links shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_link")]
    pub testflight: String,
    #[serde(default = "default_link")]
    pub macos_download: String,
}

fn default_link() -> String {
    "#".to_string()
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            testflight: default_link(),
            macos_download: default_link(),
        }
    }
}

/// Umami analytics settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub website_id: String,
    #[serde(default)]
    pub script_url: String,
    /// Explicit switch. When unset, analytics is on iff both the website id
    /// and the script url are configured.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl AnalyticsConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
            .unwrap_or(!self.website_id.is_empty() && !self.script_url.is_empty())
    }
}

// =============================================================================
// Directory layout
// =============================================================================

/// Input and output directories, relative to the config file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_content")]
    pub content: PathBuf,
    #[serde(default = "default_templates")]
    pub templates: PathBuf,
    #[serde(default = "default_static")]
    pub r#static: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_content() -> PathBuf {
    PathBuf::from("content")
}

fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}

fn default_static() -> PathBuf {
    PathBuf::from("static")
}

fn default_output() -> PathBuf {
    PathBuf::from("docs")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            templates: default_templates(),
            r#static: default_static(),
            output: default_output(),
        }
    }
}

impl PathsConfig {
    /// Resolve every directory against `base_path`, leaving absolute paths alone.
    pub fn resolve(&self, base_path: &Path) -> ResolvedPaths {
        let resolve = |p: &PathBuf| {
            if p.is_relative() {
                base_path.join(p)
            } else {
                p.clone()
            }
        };
        ResolvedPaths {
            content: resolve(&self.content),
            templates: resolve(&self.templates),
            r#static: resolve(&self.r#static),
            output: resolve(&self.output),
        }
    }
}

/// Absolute (or base-relative) directories used by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub content: PathBuf,
    pub templates: PathBuf,
    pub r#static: PathBuf,
    pub output: PathBuf,
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
    /// Theme used for fenced code block highlighting
    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

fn default_highlight_theme() -> String {
    "github-dark".to_string()
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
            highlight_theme: default_highlight_theme(),
        }
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change (default: true)
    #[serde(default = "default_live_reload")]
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

fn default_live_reload() -> bool {
    true
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems and Docker volumes.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window trigger a single rebuild.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config: Config =
            serde_yaml::from_str("site:\n  name: Summarum\n  domain: summarum.app\n").unwrap();

        assert_eq!(config.site.name, "Summarum");
        assert_eq!(config.site.tagline, "");
        assert_eq!(config.links.testflight, "#");
        assert_eq!(config.paths.output, PathBuf::from("docs"));
        assert_eq!(config.dev.watch.debounce_ms, 1000);
        assert!(config.tokens.is_null());
        assert!(!config.analytics.is_enabled());
    }

    #[test]
    fn test_analytics_enabled_from_ids() {
        let analytics = AnalyticsConfig {
            website_id: "abc".to_string(),
            script_url: "https://umami.example/script.js".to_string(),
            enabled: None,
        };
        assert!(analytics.is_enabled());

        let forced_off = AnalyticsConfig {
            enabled: Some(false),
            ..analytics
        };
        assert!(!forced_off.is_enabled());
    }

    #[test]
    fn test_paths_resolve_relative_and_absolute() {
        let paths = PathsConfig {
            output: PathBuf::from("/srv/site"),
            ..PathsConfig::default()
        };
        let resolved = paths.resolve(Path::new("/project"));

        assert_eq!(resolved.content, PathBuf::from("/project/content"));
        assert_eq!(resolved.r#static, PathBuf::from("/project/static"));
        assert_eq!(resolved.output, PathBuf::from("/srv/site"));
    }

    #[test]
    fn test_tokens_are_opaque() {
        let yaml = r##"
site:
  name: Summarum
  domain: summarum.app
tokens:
  brand_colors:
    orange: "#f4a261"
  spacing: [1, 2, 4]
"##;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tokens["brand_colors"]["orange"], "#f4a261");
        assert_eq!(config.tokens["spacing"][2], 4);
    }
}
