use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

/// Slug of the site root page.
pub const ROOT_SLUG: &str = "index";

/// Raw front matter: an ordered YAML mapping with arbitrary values.
pub type Metadata = serde_yaml::Mapping;

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("malformed YAML front matter: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[error("front matter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),

    #[error("front matter field '{key}' must be a string, found {found}")]
    Field {
        key: &'static str,
        found: &'static str,
    },
}

// =============================================================================
// Source documents
// =============================================================================

/// A content document as read from the content directory.
///
/// Documents are read once per build, never modified, and dropped when the
/// build finishes.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File stem; `index` is the site root
    pub slug: String,
    /// Full path of the markdown file
    pub source_path: PathBuf,
    /// File contents, front matter included
    pub raw: String,
}

impl SourceDocument {
    /// Read a document from disk, deriving its slug from the file stem.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            slug,
            source_path: path.to_path_buf(),
            raw,
        })
    }

    /// Name of the output file, relative to the output root.
    pub fn output_file_name(&self) -> String {
        format!("{}.html", self.slug)
    }

    /// URL the page is served at.
    /// "index" -> "/", "privacy" -> "/privacy.html"
    pub fn url(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("/{}", self.output_file_name())
        }
    }

    pub fn is_root(&self) -> bool {
        self.slug == ROOT_SLUG
    }
}

/// Find every markdown document directly inside `content_dir`.
///
/// Hidden files are skipped. The result is sorted by path so builds visit
/// documents in a stable order.
pub fn discover_documents(content_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(content_dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden || !path.is_file() {
            continue;
        }
        if path.extension().is_some_and(|e| e == "md") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

// =============================================================================
// Front matter
// =============================================================================

/// Typed view over the well-known front matter keys.
///
/// Everything else lands in `extra` and is passed through to templates
/// untouched (e.g. `page.features` on the landing page).
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    /// Page title (falls back to the site name)
    pub title: Option<String>,
    /// Page description for SEO/previews (falls back to the site description)
    pub description: Option<String>,
    /// Template name, with or without the `.html` suffix
    pub template: Option<String>,
    /// Remaining keys, with scalar keys rendered as strings
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Read the well-known keys out of `metadata`.
    ///
    /// Scalar titles and descriptions are stringified (`title: 1984` is the
    /// title "1984"). Any other shape is ignored so the site fallback
    /// applies. `template` must be a string.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, FrontMatterError> {
        let mut front_matter = FrontMatter::default();

        for (key, value) in metadata {
            let Some(key) = scalar_to_string(key) else {
                log::debug!("ignoring front matter key of type {}", yaml_kind(key));
                continue;
            };

            match key.as_str() {
                "title" => front_matter.title = text_field("title", value),
                "description" => front_matter.description = text_field("description", value),
                "template" => {
                    front_matter.template = match value {
                        Value::Null => None,
                        Value::String(name) => Some(name.clone()),
                        other => {
                            return Err(FrontMatterError::Field {
                                key: "template",
                                found: yaml_kind(other),
                            });
                        }
                    }
                }
                _ => {
                    front_matter.extra.insert(key, value.clone());
                }
            }
        }

        Ok(front_matter)
    }
}

fn text_field(key: &str, value: &Value) -> Option<String> {
    let text = scalar_to_string(value);
    if text.is_none() && !value.is_null() {
        log::warn!(
            "front matter '{key}' is {}, using the site default",
            yaml_kind(value)
        );
    }
    text
}

/// String form of a scalar YAML value; `None` for null, lists and mappings.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Result of splitting a document into metadata and body.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub metadata: Metadata,
    /// The markdown body without the front matter block
    pub body: String,
}

/// Parse front matter from markdown content.
///
/// Front matter is a YAML block delimited by `---` lines at the very start
/// of the file:
///
/// ```markdown
/// ---
/// title: Privacy
/// template: page
/// ---
///
/// # Privacy Policy
/// ```
///
/// Content that does not start with a delimiter line, or that never closes
/// the block, has no front matter and is used as the body in full.
pub fn parse_front_matter(content: &str) -> Result<ParsedContent, FrontMatterError> {
    let Some((yaml, body)) = split_front_matter(content) else {
        return Ok(ParsedContent {
            metadata: Metadata::new(),
            body: content.to_string(),
        });
    };

    let metadata = if yaml.trim().is_empty() {
        Metadata::new()
    } else {
        match serde_yaml::from_str(yaml).map_err(FrontMatterError::Yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Metadata::new(),
            other => return Err(FrontMatterError::NotAMapping(yaml_kind(&other))),
        }
    };

    Ok(ParsedContent {
        metadata,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
    })
}

/// Split off the YAML region between the opening and closing `---` lines.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let (first_line, rest) = content.split_once('\n')?;
    if first_line.trim_end() != "---" {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Human-readable name of a YAML value's kind, for error messages.
pub fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter_basic() {
        let content = r#"---
title: My Page
description: A test page
---

# Hello World
"#;
        let parsed = parse_front_matter(content).unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.title, Some("My Page".to_string()));
        assert_eq!(fm.description, Some("A test page".to_string()));
        assert_eq!(parsed.body.trim(), "# Hello World");
    }

    #[test]
    fn test_parse_front_matter_with_custom_fields() {
        let content = r#"---
template: landing
tagline: Simple
features:
  - title: Fast
    icon: bolt
---
Body
"#;
        let parsed = parse_front_matter(content).unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.template.as_deref(), Some("landing"));
        assert!(fm.extra.contains_key("tagline"));
        assert!(fm.extra["features"].is_sequence());
        assert!(!fm.extra.contains_key("template"));
    }

    #[test]
    fn test_no_front_matter_keeps_whole_text() {
        let content = "# Just Markdown\n\nNo front matter here.\n---\nstill body\n";
        let parsed = parse_front_matter(content).unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let content = "---\ntitle: dangling\n\n# Heading\n";
        let parsed = parse_front_matter(content).unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_empty_front_matter() {
        let parsed = parse_front_matter("---\n---\n\n# Content").unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, "# Content");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let err = parse_front_matter("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_non_mapping_front_matter_is_an_error() {
        let err = parse_front_matter("---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::NotAMapping("a list")));
    }

    #[test]
    fn test_scalar_title_is_stringified() {
        let parsed = parse_front_matter("---\ntitle: 1984\ndescription: true\n---\nbody").unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
        assert_eq!(fm.description.as_deref(), Some("true"));
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_structured_title_falls_back() {
        let parsed = parse_front_matter("---\ntitle:\n  - a\n  - b\n---\nbody").unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.title, None);
        assert!(!fm.extra.contains_key("title"));
    }

    #[test]
    fn test_integer_keys_become_strings() {
        let parsed = parse_front_matter("---\n2024: launched\ntrue: yes\n---\nbody").unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.extra["2024"], Value::String("launched".to_string()));
        assert!(fm.extra.contains_key("true"));
    }

    #[test]
    fn test_template_must_be_a_string() {
        let parsed = parse_front_matter("---\ntemplate: [a, b]\n---\nbody").unwrap();
        let err = FrontMatter::from_metadata(&parsed.metadata).unwrap_err();
        assert!(matches!(
            err,
            FrontMatterError::Field {
                key: "template",
                found: "a list"
            }
        ));
    }

    #[test]
    fn test_crlf_delimiters() {
        let parsed = parse_front_matter("---\r\ntitle: Windows\r\n---\r\nBody\r\n").unwrap();
        let fm = FrontMatter::from_metadata(&parsed.metadata).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(parsed.body, "Body\r\n");
    }

    #[test]
    fn test_metadata_round_trips() {
        let yaml = "tagline: Simple\ncount: 3\nenabled: true\ncta_buttons:\n- label: Get\n  url: '#'\ncontact_section:\n  email: a@b.c\n";
        let parsed = parse_front_matter(&format!("---\n{yaml}---\nbody")).unwrap();

        let emitted = serde_yaml::to_string(&parsed.metadata).unwrap();
        let reparsed: Metadata = serde_yaml::from_str(&emitted).unwrap();
        let original: Metadata = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(reparsed, original);
        assert_eq!(parsed.metadata, original);
    }

    #[test]
    fn test_source_document_slug_and_url() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.md");
        let privacy = dir.path().join("privacy.md");
        std::fs::write(&index, "# Home").unwrap();
        std::fs::write(&privacy, "# Privacy").unwrap();

        let index = SourceDocument::load(&index).unwrap();
        let privacy = SourceDocument::load(&privacy).unwrap();
        assert!(index.is_root());
        assert_eq!(index.url(), "/");
        assert_eq!(index.output_file_name(), "index.html");
        assert_eq!(privacy.slug, "privacy");
        assert_eq!(privacy.url(), "/privacy.html");
    }

    #[test]
    fn test_discover_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["privacy.md", "index.md", ".draft.md", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.md")).unwrap();

        let found = discover_documents(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["index.md", "privacy.md"]);
    }
}
