use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language, themes};

/// Highlights fenced code blocks with autumnus (tree-sitter based).
///
/// Output uses CSS classes; the matching stylesheet comes from
/// [`SyntaxHighlighter::stylesheet`] and is handed to templates as
/// `highlight_css`.
pub struct SyntaxHighlighter {
    theme_name: String,
}

impl SyntaxHighlighter {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme_name: theme_name.to_string(),
        }
    }

    /// Highlight `code`, falling back to an escaped `<pre><code>` block when
    /// the language is unknown or highlighting fails.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let lang = Language::guess(language, code);

        let unrecognized = matches!(lang, Language::PlainText)
            && !matches!(language, "" | "plaintext" | "text");
        if unrecognized {
            return plain_code_block(code, language);
        }

        let Ok(formatter) = HtmlLinkedBuilder::new().source(code).lang(lang).build() else {
            return plain_code_block(code, language);
        };

        let mut output: Vec<u8> = Vec::new();
        if formatter.format(&mut output).is_err() {
            return plain_code_block(code, language);
        }
        String::from_utf8(output).unwrap_or_else(|_| plain_code_block(code, language))
    }

    /// CSS for the configured theme, or an empty string if the theme is unknown.
    pub fn stylesheet(&self) -> String {
        match themes::get(&self.theme_name) {
            Ok(theme) => theme.css(false),
            Err(_) => {
                log::warn!(
                    "unknown highlight theme '{}', code blocks will be unstyled",
                    self.theme_name
                );
                String::new()
            }
        }
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("github-dark")
    }
}

fn plain_code_block(code: &str, language: &str) -> String {
    let escaped = tera::escape_html(code);
    if language.is_empty() {
        format!("<pre><code>{escaped}</code></pre>")
    } else {
        format!(
            "<pre><code class=\"language-{}\">{escaped}</code></pre>",
            tera::escape_html(language)
        )
    }
}
