use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use walkdir::{DirEntry, WalkDir};

use crate::foundation::error::{ConvertError, ConvertResult};

const LOTTIE_SUFFIX: &[u8] = b".json";

/// An input path after canonicalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedInput {
    File(PathBuf),
    Directory(PathBuf),
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Directory(p) => p,
        }
    }
}

/// Whether a file name selects a Lottie file: a case-sensitive `.json` suffix after a
/// non-empty stem. Names are compared as bytes and need not be UTF-8.
pub fn is_lottie_name(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    bytes.len() > LOTTIE_SUFFIX.len() && bytes.ends_with(LOTTIE_SUFFIX)
}

pub fn is_lottie_path(path: &Path) -> bool {
    path.file_name().is_some_and(is_lottie_name)
}

/// Resolve `raw` to an absolute path with symlinks resolved, and classify it.
pub fn resolve_input(raw: &Path) -> ConvertResult<ResolvedInput> {
    let path = std::fs::canonicalize(raw).map_err(|e| {
        ConvertError::Io(std::io::Error::new(
            e.kind(),
            format!("invalid path '{}': {e}", raw.display()),
        ))
    })?;
    let meta = std::fs::metadata(&path)?;
    Ok(if meta.is_dir() {
        ResolvedInput::Directory(path)
    } else {
        ResolvedInput::File(path)
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

/// Every Lottie file below `dir`, in file-name order per directory.
///
/// Dot-prefixed files and directories are skipped and symlinked directories are not entered.
/// Entries that cannot be read are logged and skipped.
pub fn collect_lottie_files(dir: &Path) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "unreadable directory entry, skipped");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if is_lottie_path(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}
