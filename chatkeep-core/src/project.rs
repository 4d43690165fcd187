//! Project-root resolution.

use std::path::Path;

use crate::error::{io_err, CoreError};
use crate::types::ProjectRoot;
use crate::vcs::Vcs;

/// Canonicalize `input` into the identity used for archives and registry
/// membership.
///
/// Relative inputs are joined onto `cwd`. The result must be an existing
/// directory. Inside a working tree the tree's top-level wins.
pub fn resolve_project_root(
    input: &Path,
    cwd: &Path,
    vcs: &dyn Vcs,
) -> Result<ProjectRoot, CoreError> {
    let joined = if input.is_absolute() {
        input.to_path_buf()
    } else {
        cwd.join(input)
    };
    if !joined.is_dir() {
        return Err(CoreError::NotADirectory { path: joined });
    }
    let absolute = joined.canonicalize().map_err(|e| io_err(&joined, e))?;

    match vcs.toplevel(&absolute) {
        Some(top) => {
            let top = top.canonicalize().unwrap_or(top);
            tracing::debug!("{} lies in working tree {}", absolute.display(), top.display());
            Ok(ProjectRoot(top))
        }
        None => Ok(ProjectRoot(absolute)),
    }
}
