use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use extract::Command;

use crate::render::render;

pub const DEFAULT_FILE_NAME: &str = "task.yaml";

/// Where the task file for `path` goes.
///
/// An existing directory, or a path spelled with a trailing separator, gets
/// `task.yaml` appended. Anything else is used as is.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    let spelled = path.to_string_lossy();
    if path.is_dir() || spelled.ends_with('/') || spelled.ends_with(MAIN_SEPARATOR) {
        path.join(DEFAULT_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Render `commands` and write them to the resolved form of `path`.
///
/// The descriptor is rendered fully before the file is created. Returns the
/// path that was written.
pub fn write_task_file(path: &Path, commands: &[Command]) -> io::Result<PathBuf> {
    let target = resolve_output_path(path);
    let contents = render(commands);
    std::fs::write(&target, contents)?;
    log::debug!("wrote {} command(s) to {}", commands.len(), target.display());
    Ok(target)
}
