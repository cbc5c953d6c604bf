//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the content, template and static
//! directories and the config file. Bursts of filesystem events inside the
//! debounce window arrive as a single [`WatchEvent::FilesChanged`].

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::WatchConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// What kind of input changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Content(PathBuf),
    Template(PathBuf),
    Static(PathBuf),
    Config,
}

impl ChangeKind {
    /// The changed file, if the change is tied to one input file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ChangeKind::Content(path) | ChangeKind::Template(path) | ChangeKind::Static(path) => {
                Some(path)
            }
            ChangeKind::Config => None,
        }
    }
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

// =============================================================================
// Path classification
// =============================================================================

/// Paths to watch for changes.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub content_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub config_path: PathBuf,
    /// Never reported, even when nested inside a watched directory
    pub output_dir: PathBuf,
}

/// Classifies file paths into change types.
#[derive(Clone)]
pub struct PathClassifier {
    paths: WatchPaths,
}

impl PathClassifier {
    pub fn new(paths: WatchPaths) -> Self {
        Self { paths }
    }

    /// Classify a changed path, or `None` if it cannot affect the build.
    pub fn classify(&self, path: &Path) -> Option<ChangeKind> {
        if path == self.paths.config_path {
            return Some(ChangeKind::Config);
        }

        if path.starts_with(&self.paths.output_dir) {
            return None;
        }

        if is_hidden_below(path, &self.paths.templates_dir) {
            return None;
        }
        if path.starts_with(&self.paths.templates_dir) {
            return has_extension(path, "html").then(|| ChangeKind::Template(path.to_path_buf()));
        }

        if is_hidden_below(path, &self.paths.content_dir) {
            return None;
        }
        if path.starts_with(&self.paths.content_dir) {
            return has_extension(path, "md").then(|| ChangeKind::Content(path.to_path_buf()));
        }

        if is_hidden_below(path, &self.paths.static_dir) {
            return None;
        }
        if path.starts_with(&self.paths.static_dir) {
            return Some(ChangeKind::Static(path.to_path_buf()));
        }

        None // Unknown path, ignore
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Whether any component of `path` below `root` is a dotfile (editor swap
/// files, `.DS_Store`, ...).
fn is_hidden_below(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root).is_ok_and(|relative| {
        relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    })
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    pub fn new(
        config: &WatchConfig,
        paths: &WatchPaths,
        classifier: PathClassifier,
    ) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);

        let (tx, rx) = mpsc::channel();

        // Convert notify events to our WatchEvent type
        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let mut changes: Vec<ChangeKind> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .flat_map(|event| event.paths.iter())
                    .filter_map(|path| classifier.classify(path))
                    .collect();
                changes.dedup();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

fn add_watch_paths_to_debouncer<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    paths: &WatchPaths,
) -> Result<(), WatchError> {
    for dir in [&paths.content_dir, &paths.templates_dir, &paths.static_dir] {
        if dir.exists() {
            log::info!("watching {}", dir.display());
            debouncer.watch(dir, RecursiveMode::Recursive)?;
        }
    }

    // Watch the config file's directory non-recursively to catch editors
    // that replace the file instead of writing in place
    if let Some(parent) = paths.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }

    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}
