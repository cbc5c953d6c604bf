use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::config::{Config, ResolvedPaths};

use super::document::{SourceDocument, discover_documents};
use super::highlight::SyntaxHighlighter;
use super::pipeline::{Pipeline, PipelineContext, PipelineError};
use super::render::{DevContext, GlobalContext, RenderError, Renderer, template_file_name};

/// States of a generation run.
///
/// `Init → Cleaning → Rendering → CopyingAssets → WritingHostingFile → Done`,
/// with `Failed` reachable from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Init,
    Cleaning,
    Rendering,
    CopyingAssets,
    WritingHostingFile,
    Done,
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::Init => "init",
            BuildPhase::Cleaning => "cleaning",
            BuildPhase::Rendering => "rendering",
            BuildPhase::CopyingAssets => "copying assets",
            BuildPhase::WritingHostingFile => "writing hosting file",
            BuildPhase::Done => "done",
            BuildPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to reset output directory {}: {source}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "output directory {} would delete {} when cleaned; choose an output path outside the site's inputs",
        .output.display(),
        .input.display()
    )]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },

    #[error("failed to read content directory {}: {source}", .path.display())]
    ReadContent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load templates: {0}")]
    Templates(#[from] RenderError),

    #[error("{phase} failed: {source}")]
    Pipeline {
        phase: BuildPhase,
        #[source]
        source: PipelineError,
    },
}

impl BuildError {
    /// The phase the run was in when it failed.
    pub fn phase(&self) -> BuildPhase {
        match self {
            BuildError::Clean { .. } | BuildError::OutputOverlapsInput { .. } => {
                BuildPhase::Cleaning
            }
            BuildError::ReadContent { .. } | BuildError::Templates(_) => BuildPhase::Rendering,
            BuildError::Pipeline { phase, .. } => *phase,
        }
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub documents: usize,
    pub static_files: usize,
    /// Every phase the run went through, in order
    pub phases: Vec<BuildPhase>,
}

/// A problem found by [`Builder::check`].
#[derive(Debug)]
pub struct Finding {
    pub document: String,
    pub message: String,
}

/// Outcome of a dry validation run.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub documents: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Records phase transitions for a single run.
struct PhaseTracker {
    history: Vec<BuildPhase>,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            history: vec![BuildPhase::Init],
        }
    }

    fn enter(&mut self, phase: BuildPhase) {
        log::debug!("build phase: {} -> {}", self.current(), phase);
        self.history.push(phase);
    }

    fn current(&self) -> BuildPhase {
        self.history.last().copied().unwrap_or(BuildPhase::Init)
    }

    fn fail(&mut self, error: BuildError) -> BuildError {
        log::debug!("build phase: {} -> {}", error.phase(), BuildPhase::Failed);
        self.history.push(BuildPhase::Failed);
        error
    }
}

/// Generates the site: the single entry point the CLI and dev server use.
pub struct Builder<'a> {
    config: &'a Config,
    /// Directory holding the config file
    base_path: PathBuf,
    /// Directories resolved against the config file's directory
    paths: ResolvedPaths,
    dev: DevContext,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a Config, base_path: &Path) -> Self {
        Self {
            config,
            base_path: base_path.to_path_buf(),
            paths: config.paths.resolve(base_path),
            dev: DevContext::default(),
        }
    }

    /// Mark the build as a dev-server build (exposed to templates as `dev`).
    pub fn with_dev_mode(mut self, enabled: bool, live_reload: bool) -> Self {
        self.dev = DevContext::new(enabled, live_reload);
        self
    }

    /// Generate the site from scratch.
    ///
    /// The output directory is deleted and recreated, every document is
    /// parsed, validated, rendered and written one at a time, then the static
    /// tree and `CNAME` file are written. The first error aborts the run;
    /// output written before it stays on disk.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let mut tracker = PhaseTracker::new();
        self.run(&mut tracker).map_err(|e| tracker.fail(e))
    }

    fn run(&self, tracker: &mut PhaseTracker) -> Result<BuildResult, BuildError> {
        log::info!("generating {}", self.config.site.name);

        tracker.enter(BuildPhase::Cleaning);
        let output_dir = self.paths.output.clone();
        self.ensure_output_is_disposable()?;
        reset_dir(&output_dir).map_err(|source| BuildError::Clean {
            path: output_dir.clone(),
            source,
        })?;

        tracker.enter(BuildPhase::Rendering);
        let sources = self.discover()?;
        log::info!(
            "found {} content file(s) in {}",
            sources.len(),
            self.paths.content.display()
        );

        let renderer = Renderer::new(&self.paths.templates)?;
        let highlighter = SyntaxHighlighter::new(&self.config.markdown.highlight_theme);
        let global = self.global_context(&highlighter);
        let ctx = self.pipeline_context(&output_dir, &global, &highlighter, &renderer);

        let pipeline = Pipeline::default_pipeline();
        log::debug!("document stages: {:?}", pipeline.stage_names());

        let documents = sources.len();
        for path in sources {
            log::info!("processing {}", path.display());
            let source = SourceDocument::load(&path).map_err(|e| BuildError::Pipeline {
                phase: BuildPhase::Rendering,
                source: PipelineError::io(&path, e),
            })?;
            pipeline
                .process(source, &ctx)
                .map_err(|source| BuildError::Pipeline {
                    phase: BuildPhase::Rendering,
                    source,
                })?;
        }

        let mut static_files = 0;
        for stage in pipeline.finalize_stages() {
            let phase = stage.phase();
            tracker.enter(phase);
            let written = stage
                .finalize(&ctx)
                .map_err(|source| BuildError::Pipeline { phase, source })?;
            if phase == BuildPhase::CopyingAssets {
                static_files += written;
            }
        }

        tracker.enter(BuildPhase::Done);
        log::info!("site generated in {}", output_dir.display());

        Ok(BuildResult {
            output_dir,
            documents,
            static_files,
            phases: tracker.history.clone(),
        })
    }

    /// Parse and validate every document without writing anything.
    ///
    /// Unlike [`Builder::build`], problems do not stop the run: every
    /// document is checked and every problem is reported.
    pub fn check(&self) -> Result<CheckReport, BuildError> {
        let sources = self.discover()?;
        let renderer = Renderer::new(&self.paths.templates)?;
        let highlighter = SyntaxHighlighter::new(&self.config.markdown.highlight_theme);
        let global = self.global_context(&highlighter);
        let ctx = self.pipeline_context(&self.paths.output, &global, &highlighter, &renderer);
        let pipeline = Pipeline::check_pipeline();

        let mut report = CheckReport {
            documents: sources.len(),
            findings: Vec::new(),
        };

        for path in sources {
            let document = path.display().to_string();
            let source = match SourceDocument::load(&path) {
                Ok(source) => source,
                Err(e) => {
                    report.findings.push(Finding {
                        document,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            match pipeline.process(source, &ctx) {
                Ok(doc) => {
                    let template = template_file_name(doc.front_matter.template.as_deref());
                    if !renderer.has_template(&template) {
                        report.findings.push(Finding {
                            document,
                            message: format!("template '{template}' not found"),
                        });
                    }
                }
                Err(PipelineError::Validation(err)) => {
                    report
                        .findings
                        .extend(err.violations.into_iter().map(|v| Finding {
                            document: document.clone(),
                            message: v.to_string(),
                        }));
                }
                Err(e) => report.findings.push(Finding {
                    document,
                    message: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    /// Refuse to clean an output directory that is, or contains, the config
    /// directory or one of the input directories.
    fn ensure_output_is_disposable(&self) -> Result<(), BuildError> {
        let output = canonical(&self.paths.output);
        let inputs = [
            &self.base_path,
            &self.paths.content,
            &self.paths.templates,
            &self.paths.r#static,
        ];
        for input in inputs {
            if canonical(input).starts_with(&output) {
                return Err(BuildError::OutputOverlapsInput {
                    output: self.paths.output.clone(),
                    input: input.clone(),
                });
            }
        }
        Ok(())
    }

    fn discover(&self) -> Result<Vec<PathBuf>, BuildError> {
        discover_documents(&self.paths.content).map_err(|source| BuildError::ReadContent {
            path: self.paths.content.clone(),
            source,
        })
    }

    fn global_context(&self, highlighter: &SyntaxHighlighter) -> GlobalContext {
        GlobalContext::new(
            self.config,
            highlighter.stylesheet(),
            chrono::Local::now().year(),
            self.dev.clone(),
        )
    }

    fn pipeline_context<'c>(
        &'c self,
        output_dir: &'c Path,
        global: &'c GlobalContext,
        highlighter: &'c SyntaxHighlighter,
        renderer: &'c Renderer,
    ) -> PipelineContext<'c> {
        PipelineContext {
            output_dir,
            static_dir: &self.paths.r#static,
            domain: &self.config.site.domain,
            global,
            markdown_config: &self.config.markdown,
            highlighter,
            renderer,
        }
    }
}

/// Resolve symlinks and `.`/`..` when the path exists.
fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Delete `dir` if it exists and recreate it empty.
fn reset_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::validate::ViolationKind;

    const CONFIG: &str = r##"
site:
  name: Summarum
  tagline: Your Financial Overview, Simplified
  description: Keep track of your wealth.
  domain: summarum.app
  contact_email: hello@summarum.app
tokens:
  brand_colors:
    orange: "#f4a261"
"##;

    const LANDING_TEMPLATE: &str = r#"<!doctype html>
<title>{{ page.title }} | {{ site.name }}</title>
<h1>{{ page.tagline }}</h1>
<p>{{ page.hero_description }}</p>
{% for button in page.cta_buttons %}<a href="{{ button.url }}" style="color: {{ tokens.brand_colors[button.color] }}">{{ button.label }}</a>{% endfor %}
{% for feature in page.features %}<h3>{{ feature.title }}</h3>{% endfor %}
{{ page.content | safe }}
<footer>&copy; {{ current_year }} {{ contact_email }}</footer>
"#;

    const VALID_INDEX: &str = r##"---
template: landing
title: Summarum
tagline: Your Financial Overview, Simplified
hero_description: Track every account in one place.
cta_buttons:
  - label: Join the beta
    url: "#"
    color: orange
    icon: apple
features:
  - title: Manual updates
    description: No bank logins.
    icon: pencil
    color: yellow
screenshots:
  - image: static/img/overview.png
    alt: Overview screen
contact_section:
  title: Get in touch
  description: We read every email.
  email: hello@summarum.app
---

## Why Summarum

| Account | Balance |
|---------|---------|
| Savings | 100     |
"##;

    struct Site {
        dir: tempfile::TempDir,
        config: Config,
    }

    impl Site {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            for sub in ["content", "templates"] {
                std::fs::create_dir(dir.path().join(sub)).unwrap();
            }
            std::fs::write(dir.path().join("templates/landing.html"), LANDING_TEMPLATE).unwrap();
            std::fs::write(
                dir.path().join("templates/page.html"),
                "<title>{{ page.title }}</title>{{ page.content | safe }}",
            )
            .unwrap();

            Self {
                dir,
                config: Config::from_yaml(CONFIG).unwrap(),
            }
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }

        fn builder(&self) -> Builder<'_> {
            Builder::new(&self.config, self.dir.path())
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("docs")
        }

        fn read_output(&self, relative: &str) -> String {
            std::fs::read_to_string(self.output().join(relative)).unwrap()
        }

        fn output_files(&self) -> Vec<String> {
            let mut files = Vec::new();
            collect_files(&self.output(), &self.output(), &mut files);
            files.sort();
            files
        }
    }

    fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                collect_files(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                files.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    #[test]
    fn test_build_landing_site() {
        let site = Site::new();
        site.write("content/index.md", VALID_INDEX);

        let result = site.builder().build().unwrap();

        assert_eq!(result.documents, 1);
        assert_eq!(result.static_files, 0);
        assert_eq!(site.output_files(), vec!["CNAME", "index.html"]);
        assert_eq!(site.read_output("CNAME"), "summarum.app");

        let html = site.read_output("index.html");
        assert!(html.contains("<title>Summarum | Summarum</title>"));
        assert!(html.contains("<h1>Your Financial Overview, Simplified</h1>"));
        assert!(html.contains("style=\"color: #f4a261\""));
        assert!(html.contains("<h3>Manual updates</h3>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("hello@summarum.app"));
    }

    #[test]
    fn test_build_phases() {
        let site = Site::new();
        site.write("content/index.md", VALID_INDEX);

        let result = site.builder().build().unwrap();
        assert_eq!(
            result.phases,
            vec![
                BuildPhase::Init,
                BuildPhase::Cleaning,
                BuildPhase::Rendering,
                BuildPhase::CopyingAssets,
                BuildPhase::WritingHostingFile,
                BuildPhase::Done,
            ]
        );
    }

    #[test]
    fn test_build_copies_static_tree() {
        let site = Site::new();
        site.write("content/index.md", VALID_INDEX);
        site.write("static/css/site.css", "body { color: black; }");
        site.write("static/img/logo.svg", "<svg/>");

        let result = site.builder().build().unwrap();

        assert_eq!(result.static_files, 2);
        assert_eq!(
            site.output_files(),
            vec![
                "CNAME",
                "index.html",
                "static/css/site.css",
                "static/img/logo.svg"
            ]
        );
        assert_eq!(
            site.read_output("static/css/site.css"),
            "body { color: black; }"
        );
    }

    #[test]
    fn test_rebuild_is_identical_and_removes_stale_files() {
        let site = Site::new();
        site.write("content/index.md", VALID_INDEX);
        site.write("content/privacy.md", "---\ntitle: Privacy\n---\n# Privacy\n");
        site.write("static/app.js", "console.log(1)");

        site.builder().build().unwrap();
        let first: Vec<_> = site
            .output_files()
            .into_iter()
            .map(|f| (site.read_output(&f), f))
            .collect();

        std::fs::write(site.output().join("stale.html"), "old").unwrap();

        site.builder().build().unwrap();
        let second: Vec<_> = site
            .output_files()
            .into_iter()
            .map(|f| (site.read_output(&f), f))
            .collect();

        assert_eq!(first, second);
        assert!(!site.output().join("stale.html").exists());
    }

    #[test]
    fn test_plain_pages_use_default_template_and_site_fallbacks() {
        let site = Site::new();
        site.write("content/about.md", "# About us\n");

        site.builder().build().unwrap();

        let html = site.read_output("about.html");
        assert!(html.starts_with("<title>Summarum</title>"));
        assert!(html.contains("<h1>About us</h1>"));
    }

    #[test]
    fn test_empty_features_aborts_build() {
        let site = Site::new();
        let broken = VALID_INDEX.replace(
            "features:\n  - title: Manual updates\n    description: No bank logins.\n    icon: pencil\n    color: yellow\n",
            "features: []\n",
        );
        site.write("content/index.md", &broken);

        let err = site.builder().build().unwrap_err();
        assert_eq!(err.phase(), BuildPhase::Rendering);
        match err {
            BuildError::Pipeline {
                source: PipelineError::Validation(validation),
                ..
            } => {
                assert_eq!(validation.document, "index");
                assert_eq!(validation.violations.len(), 1);
                assert_eq!(validation.violations[0].path, "features");
                assert_eq!(validation.violations[0].kind, ViolationKind::EmptyList);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!site.output().join("CNAME").exists());
    }

    #[test]
    fn test_landing_rules_only_apply_to_index() {
        let site = Site::new();
        site.write(
            "templates/landing.html",
            "<title>{{ page.title }}</title>{{ page.content | safe }}",
        );
        let incomplete = "---\ntemplate: landing\ntitle: Promo\n---\nbody\n";
        site.write("content/promo.md", incomplete);

        let result = site.builder().build();
        assert!(result.is_ok(), "unexpected error: {:?}", result.err());
        assert!(site.read_output("promo.html").starts_with("<title>Promo</title>"));
        assert!(site.builder().check().unwrap().is_clean());

        site.write("content/index.md", incomplete);
        let err = site.builder().build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Pipeline {
                source: PipelineError::Validation(_),
                ..
            }
        ));
    }

    #[test]
    fn test_non_string_front_matter_values_render() {
        let site = Site::new();
        site.write(
            "content/novel.md",
            "---\ntitle: 1984\n2024: launched\nprice: 4.5\n---\nbody\n",
        );

        site.builder().build().unwrap();
        assert!(site.read_output("novel.html").starts_with("<title>1984</title>"));
    }

    #[test]
    fn test_output_cannot_contain_inputs() {
        for output in [".", "content", "templates"] {
            let mut site = Site::new();
            site.write("content/index.md", VALID_INDEX);
            site.config.paths.output = PathBuf::from(output);

            let err = site.builder().build().unwrap_err();
            assert!(
                matches!(err, BuildError::OutputOverlapsInput { .. }),
                "output '{output}': {err}"
            );
            assert_eq!(err.phase(), BuildPhase::Cleaning);
            assert!(site.dir.path().join("content/index.md").is_file());
            assert!(site.dir.path().join("templates/page.html").is_file());
        }
    }

    #[test]
    fn test_output_may_sit_beside_inputs() {
        let mut site = Site::new();
        site.write("content/index.md", VALID_INDEX);
        site.config.paths.output = PathBuf::from("public/site");

        let result = site.builder().build().unwrap();
        assert!(result.output_dir.join("index.html").is_file());
    }

    #[test]
    fn test_malformed_front_matter_aborts_build() {
        let site = Site::new();
        site.write("content/about.md", "---\ntitle: [oops\n---\nbody\n");

        let err = site.builder().build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Pipeline {
                source: PipelineError::FrontMatter { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("about.md"));
    }

    #[test]
    fn test_missing_template_aborts_build() {
        let site = Site::new();
        site.write("content/about.md", "---\ntemplate: blog\n---\nbody\n");

        let err = site.builder().build().unwrap_err();
        assert!(err.to_string().contains("blog.html"));
        assert!(matches!(
            err,
            BuildError::Pipeline {
                source: PipelineError::Render {
                    source: RenderError::TemplateNotFound { .. },
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_content_directory() {
        let site = Site::new();
        std::fs::remove_dir(site.dir.path().join("content")).unwrap();

        let err = site.builder().build().unwrap_err();
        assert!(matches!(err, BuildError::ReadContent { .. }));
    }

    #[test]
    fn test_check_reports_everything_without_writing() {
        let site = Site::new();
        site.write(
            "content/index.md",
            "---\ntemplate: landing\ntagline: x\ncta_buttons:\n  - label: Go\n---\n",
        );
        site.write("content/about.md", "---\ntemplate: blog\n---\n");
        site.write("content/broken.md", "---\n: : :\n  - [\n---\n");

        let report = site.builder().check().unwrap();

        assert_eq!(report.documents, 3);
        assert!(!report.is_clean());
        let messages: Vec<_> = report.findings.iter().map(|f| f.message.as_str()).collect();
        assert!(messages.contains(&"template 'blog.html' not found"));
        assert!(messages.contains(&"missing required field 'features'"));
        assert!(messages.contains(&"cta_buttons[0]: missing required field 'icon'"));
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.document.ends_with("broken.md"))
        );
        assert!(!site.output().exists());
    }

    #[test]
    fn test_base_path_from_config() {
        assert_eq!(
            base_path_from_config(Path::new("/site/landfall.yaml")),
            PathBuf::from("/site")
        );
    }
}
