//! Markdown rendering with syntax-highlighted code blocks.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use super::highlight::SyntaxHighlighter;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Translate configured extension names into parser options.
fn parser_options(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "smart_punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// Render markdown to HTML using pulldown-cmark.
///
/// Fenced and indented code blocks are replaced by the highlighter's output;
/// everything else goes through pulldown-cmark's HTML writer unchanged.
pub fn render_markdown(
    markdown: &str,
    highlighter: &SyntaxHighlighter,
    markdown_config: &MarkdownConfig,
) -> Result<String, MarkdownError> {
    let options = parser_options(markdown_config)?;
    let parser = Parser::new_ext(markdown, options);

    let mut code: Option<(String, String)> = None;

    let events = parser.filter_map(|event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                // Only the first word of the info string names the language
                CodeBlockKind::Fenced(info) => {
                    info.split_whitespace().next().unwrap_or_default().to_string()
                }
                CodeBlockKind::Indented => String::new(),
            };
            code = Some((language, String::new()));
            None
        }
        Event::End(TagEnd::CodeBlock) => code
            .take()
            .map(|(language, source)| Event::Html(highlighter.highlight(&source, &language).into())),
        Event::Text(text) => match code.as_mut() {
            Some((_, source)) => {
                source.push_str(&text);
                None
            }
            None => Some(Event::Text(text)),
        },
        other => Some(other),
    });

    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, events);
    Ok(html_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        render_markdown(markdown, &SyntaxHighlighter::default(), &MarkdownConfig::default())
            .unwrap()
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Hello\n\nSome *emphasis* and `code`.\n\n- one\n- two\n");

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_render_table() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_render_fenced_code_block() {
        let html = render("```rust\nlet x = 1;\n```\n");
        assert!(html.contains("<pre"));
        assert!(html.contains("let"));
    }

    #[test]
    fn test_unknown_language_is_escaped() {
        let html = render("```nosuchlang\na<b && c>d\n```\n");
        assert!(html.contains("a&lt;b &amp;&amp; c&gt;d"));
        assert!(html.contains("language-nosuchlang"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let source = "# Title\n\n```python\nprint('hi')\n```\n\n| x |\n|---|\n| y |\n";
        assert_eq!(render(source), render(source));
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
            ..MarkdownConfig::default()
        };

        let result = render_markdown("# Test", &SyntaxHighlighter::default(), &config);
        assert!(matches!(result, Err(MarkdownError::InvalidExtension(_))));
    }
}
