mod builder;
mod document;
mod highlight;
mod markdown;
pub mod pipeline;
mod render;
mod validate;
mod watch;

pub use builder::{BuildPhase, BuildResult, Builder, base_path_from_config};
pub use watch::{ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths};
