//! Central database of all source files in a build invocation.

use crate::file_id::FileId;
use crate::kind::SourceKind;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::io;
use std::path::{Path, PathBuf};

/// The source database, owning all loaded source text and resolving
/// [`FileId`] + byte offsets to line/column coordinates for diagnostics.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Loads a source file from the filesystem and returns its [`FileId`].
    ///
    /// The [`SourceKind`] is derived from the file extension; unknown
    /// extensions are rejected with `InvalidInput`.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let kind = SourceKind::from_path(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unrecognized source kind: {}", path.display()),
            )
        })?;
        let content = std::fs::read_to_string(path)?;
        Ok(self.insert(path.to_path_buf(), kind, content))
    }

    /// Recursively walks a source tree, loading every file with a recognized
    /// extension. Files whose names appear in `skip_files` are ignored.
    ///
    /// Entries are visited in sorted order so file IDs are assigned
    /// deterministically regardless of filesystem iteration order.
    pub fn load_tree(&mut self, root: &Path, skip_files: &[String]) -> Result<Vec<FileId>, io::Error> {
        let mut paths = Vec::new();
        collect_files(root, skip_files, &mut paths)?;
        paths.sort();

        let mut ids = Vec::new();
        for path in paths {
            if SourceKind::from_path(&path).is_some() {
                ids.push(self.load_file(&path)?);
            }
        }
        Ok(ids)
    }

    /// Adds a source file from an in-memory string (useful for tests).
    ///
    /// The `name` parameter is used as the file path in diagnostics and must
    /// carry a recognized extension.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let path = name.into();
        let kind = SourceKind::from_path(&path)
            .unwrap_or(SourceKind::FortranFree);
        self.insert(path, kind, content)
    }

    fn insert(&mut self, path: PathBuf, kind: SourceKind, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, path, kind, content));
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the file with the given path, if loaded.
    pub fn find_by_path(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Iterates over all loaded files in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Returns the number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves a [`Span`] to human-readable line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_files(dir: &Path, skip_files: &[String], out: &mut Vec<PathBuf>) -> Result<(), io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, skip_files, out)?;
        } else {
            let name = entry.file_name();
            if skip_files.iter().any(|s| s.as_str() == name.to_string_lossy()) {
                continue;
            }
            out.push(path);
        }
    }
    Ok(())
}
