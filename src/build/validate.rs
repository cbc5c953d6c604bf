//! Structural validation for the landing page.
//!
//! The root document rendered with the `landing` template drives the site's
//! calls to action, so its front matter must have a fixed shape. Validation
//! is a single pass that returns every [`Violation`] it finds; callers decide
//! whether to abort or report.

use std::fmt;

use serde_yaml::Value;

use super::document::{Metadata, ROOT_SLUG, yaml_kind};

/// Template name that turns on landing page validation.
pub const LANDING_TEMPLATE: &str = "landing";

const REQUIRED_KEYS: &[&str] = &[
    "tagline",
    "hero_description",
    "cta_buttons",
    "features",
    "screenshots",
    "contact_section",
];

/// Required shape of a list-valued key: every element must be a mapping
/// with these fields.
struct ListRule {
    key: &'static str,
    fields: &'static [&'static str],
}

const LIST_RULES: &[ListRule] = &[
    ListRule {
        key: "cta_buttons",
        fields: &["label", "url", "color", "icon"],
    },
    ListRule {
        key: "features",
        fields: &["title", "description", "icon", "color"],
    },
    ListRule {
        key: "screenshots",
        fields: &["image", "alt"],
    },
];

const CONTACT_KEY: &str = "contact_section";
const CONTACT_FIELDS: &[&str] = &["title", "description", "email"];

/// A single problem found in landing page front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the problem is, e.g. `cta_buttons[0]`; empty for the top level
    pub path: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingField(String),
    NotAList { found: &'static str },
    NotAMapping { found: &'static str },
    EmptyList,
}

impl Violation {
    fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Dotted location of the offending value, e.g. `cta_buttons[0].icon`.
    pub fn location(&self) -> String {
        match &self.kind {
            ViolationKind::MissingField(field) if self.path.is_empty() => field.clone(),
            ViolationKind::MissingField(field) => format!("{}.{}", self.path, field),
            _ => self.path.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path)?;
        }
        match &self.kind {
            ViolationKind::MissingField(field) => write!(f, "missing required field '{field}'"),
            ViolationKind::NotAList { found } => write!(f, "must be a list, found {found}"),
            ViolationKind::NotAMapping { found } => write!(f, "must be a mapping, found {found}"),
            ViolationKind::EmptyList => write!(f, "must not be empty"),
        }
    }
}

/// A landing page that failed validation, with every violation found.
#[derive(thiserror::Error, Debug)]
#[error("landing page '{document}' has {} schema violation(s):\n{}", .violations.len(), format_violations(.violations))]
pub struct ValidationError {
    pub document: String,
    pub violations: Vec<Violation>,
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether a document is subject to landing page validation.
///
/// Only the root document using the landing template is checked; every
/// other document is accepted as-is.
pub fn applies_to(slug: &str, template: Option<&str>) -> bool {
    slug == ROOT_SLUG && template.is_some_and(|t| t == LANDING_TEMPLATE)
}

/// Validate a document's metadata, returning nothing for documents the
/// landing rules do not apply to.
pub fn validate_document(slug: &str, metadata: &Metadata) -> Vec<Violation> {
    let template = metadata.get("template").and_then(Value::as_str);
    if !applies_to(slug, template) {
        return Vec::new();
    }
    validate_landing(metadata)
}

/// Check landing page metadata against the required shape.
///
/// Violations come back in a fixed order: missing top-level keys first,
/// then the list rules, then the contact section.
pub fn validate_landing(metadata: &Metadata) -> Vec<Violation> {
    let mut violations = Vec::new();

    for key in REQUIRED_KEYS {
        if !metadata.contains_key(*key) {
            violations.push(Violation::new("", ViolationKind::MissingField(key.to_string())));
        }
    }

    for rule in LIST_RULES {
        if let Some(value) = metadata.get(rule.key) {
            check_list(rule, value, &mut violations);
        }
    }

    if let Some(contact) = metadata.get(CONTACT_KEY) {
        match contact.as_mapping() {
            Some(mapping) => check_fields(CONTACT_KEY, mapping, CONTACT_FIELDS, &mut violations),
            None => violations.push(Violation::new(
                CONTACT_KEY,
                ViolationKind::NotAMapping {
                    found: yaml_kind(contact),
                },
            )),
        }
    }

    violations
}

fn check_list(rule: &ListRule, value: &Value, violations: &mut Vec<Violation>) {
    let Some(items) = value.as_sequence() else {
        violations.push(Violation::new(
            rule.key,
            ViolationKind::NotAList {
                found: yaml_kind(value),
            },
        ));
        return;
    };

    if items.is_empty() {
        violations.push(Violation::new(rule.key, ViolationKind::EmptyList));
        return;
    }

    for (index, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", rule.key, index);
        match item.as_mapping() {
            Some(mapping) => check_fields(&path, mapping, rule.fields, violations),
            None => violations.push(Violation::new(
                path,
                ViolationKind::NotAMapping {
                    found: yaml_kind(item),
                },
            )),
        }
    }
}

fn check_fields(
    path: &str,
    mapping: &serde_yaml::Mapping,
    fields: &[&str],
    violations: &mut Vec<Violation>,
) {
    for field in fields {
        if !mapping.contains_key(*field) {
            violations.push(Violation::new(
                path,
                ViolationKind::MissingField(field.to_string()),
            ));
        }
    }
}
