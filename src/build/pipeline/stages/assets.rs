//! Static asset copy stage.

use std::path::Path;

use crate::build::BuildPhase;
use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError};

/// Copies the static source tree into `<output>/static`.
///
/// A missing static directory is not an error; the stage does nothing.
/// Any previous contents of the destination are removed first.
pub struct StaticAssetsStage;

impl FinalizeStage for StaticAssetsStage {
    fn name(&self) -> &'static str {
        "static"
    }

    fn phase(&self) -> BuildPhase {
        BuildPhase::CopyingAssets
    }

    fn finalize(&self, ctx: &PipelineContext) -> Result<usize, PipelineError> {
        if !ctx.static_dir.is_dir() {
            log::info!(
                "no static directory at {}, skipping asset copy",
                ctx.static_dir.display()
            );
            return Ok(0);
        }

        let destination = ctx.output_dir.join(PipelineContext::STATIC_OUTPUT_DIR);
        if destination.exists() {
            std::fs::remove_dir_all(&destination)
                .map_err(|e| PipelineError::io(&destination, e))?;
        }

        let copied = copy_tree(ctx.static_dir, &destination)?;
        log::info!("copied {} static file(s) to {}", copied, destination.display());
        Ok(copied)
    }
}

/// Recursively copy `source` into `destination`, returning the number of
/// files copied.
fn copy_tree(source: &Path, destination: &Path) -> Result<usize, PipelineError> {
    std::fs::create_dir_all(destination).map_err(|e| PipelineError::io(destination, e))?;

    let entries = std::fs::read_dir(source).map_err(|e| PipelineError::io(source, e))?;
    let mut copied = 0;
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(source, e))?;
        let path = entry.path();
        let target = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| PipelineError::io(&path, e))?;

        // Symlinked files are copied by content; symlinked directories are
        // never followed, which also rules out link cycles
        if file_type.is_symlink() && !path.is_file() {
            log::warn!("skipping symlinked directory {}", path.display());
            continue;
        }

        if file_type.is_dir() {
            copied += copy_tree(&path, &target)?;
        } else {
            std::fs::copy(&path, &target).map_err(|e| PipelineError::io(&path, e))?;
            log::debug!("  copied {}", target.display());
            copied += 1;
        }
    }
    Ok(copied)
}
