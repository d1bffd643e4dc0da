//! Source discovery and output naming.
use std::{
    fs,
    path::{Path, PathBuf},
};

use jack::constants::{OUTPUT_EXTENSION, SOURCE_EXTENSION};

use crate::error::{CliError, ErrorKind};

pub fn is_jack_file(path: &Path) -> bool {
    path.extension().map(|ext| ext == SOURCE_EXTENSION).unwrap_or(false)
}

/// Source files named by a path.
///
/// A file is returned as is. A directory yields every `.jack`
/// file directly inside it, sorted by name. Subdirectories are
/// not searched.
pub fn collect_sources(path: &Path) -> Result<Vec<PathBuf>, CliError> {
    if path.is_dir() {
        let mut sources = vec![];
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_jack_file(&entry_path) {
                sources.push(entry_path);
            }
        }
        sources.sort();
        Ok(sources)
    } else if path.is_file() && is_jack_file(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(CliError {
            kind: ErrorKind::NotSource(path.to_path_buf()),
        })
    }
}

/// `Foo.jack` is compiled to a sibling `Foo.vm`.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXTENSION)
}
