//! File reading helpers shared by the builder.

use crate::log;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Read a whole text file, `None` if it cannot be read.
///
/// Templates and sources are optional at this level; callers decide whether
/// absence is fatal. Failures other than a missing file are logged so the
/// real cause is visible.
pub fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => {
            log!("error"; "cannot read {}: {err}", path.display());
            None
        }
    }
}

/// Regular files directly inside `dir`, sorted by file name.
///
/// Symlinks are followed, so a link to a file counts as a file. Subdirectories
/// are skipped, not descended into. Entries that cannot be resolved (dangling
/// links) are logged and skipped. A missing `dir` yields an empty list.
pub fn sorted_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(err) if err.depth() > 0 => {
                log!("error"; "{err}");
                None
            }
            Err(err) => Some(Err(io::Error::other(err))),
        })
        .collect()
}
