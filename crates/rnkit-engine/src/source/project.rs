//! Edit session over the files of one project.
//!
//! A [`Project`] tracks at most one [`SourceFile`] per path. Generators load,
//! create and edit files through it and write everything in a single
//! [`commit`](Project::commit) at the end, so a failure halfway through a run
//! never leaves a partially updated artifact on disk.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::diagnostic::EngineError;
use crate::format;
use super::file::{Origin, SourceFile};

/// An edit session rooted at a project directory.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    files: BTreeMap<PathBuf, SourceFile>,
}

impl Project {
    /// Creates an empty session for the project at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a project-relative (or absolute) path to the session key.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize_path(&self.root.join(path.as_ref()))
    }

    /// Path relative to the project root, for reporting.
    pub fn relative(&self, path: impl AsRef<Path>) -> PathBuf {
        let resolved = self.resolve(path);
        pathdiff::diff_paths(&resolved, &self.root).unwrap_or(resolved)
    }

    /// True if the file is tracked in the session or exists on disk.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let key = self.resolve(path);
        self.files.contains_key(&key) || key.exists()
    }

    /// Loads and parses a file, or returns the already tracked copy.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&mut SourceFile, EngineError> {
        let key = self.resolve(path);
        if !self.files.contains_key(&key) {
            let text = match std::fs::read_to_string(&key) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(EngineError::FileNotFound { path: key });
                }
                Err(e) => return Err(EngineError::io(&key, e.to_string())),
            };
            tracing::debug!(path = %key.display(), "loaded");
            let file = SourceFile::parse(key.clone(), text, Origin::Loaded)?;
            self.files.insert(key.clone(), file);
        }
        self.files
            .get_mut(&key)
            .ok_or(EngineError::UntrackedFile { path: key })
    }

    /// Like [`open`](Self::open) but a missing file is `None`.
    pub fn try_open(&mut self, path: impl AsRef<Path>) -> Result<Option<&mut SourceFile>, EngineError> {
        match self.open(path) {
            Ok(file) => Ok(Some(file)),
            Err(EngineError::FileNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Creates a new empty file. Fails if the path is tracked or exists on disk.
    pub fn create_empty(&mut self, path: impl AsRef<Path>) -> Result<&mut SourceFile, EngineError> {
        self.create(path, "")
    }

    /// Creates a new file with initial content (typically rendered boilerplate).
    pub fn create(&mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Result<&mut SourceFile, EngineError> {
        let key = self.resolve(path);
        if self.files.contains_key(&key) || key.exists() {
            return Err(EngineError::Conflict { path: key });
        }
        let file = SourceFile::parse(key.clone(), text, Origin::Created)?;
        tracing::debug!(path = %key.display(), "created");
        Ok(self.files.entry(key).or_insert(file))
    }

    /// A tracked file.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&SourceFile> {
        self.files.get(&self.resolve(path))
    }

    /// A tracked file, mutably.
    pub fn file_mut(&mut self, path: impl AsRef<Path>) -> Option<&mut SourceFile> {
        let key = self.resolve(path);
        self.files.get_mut(&key)
    }

    /// Tracked files with unsaved changes.
    pub fn dirty_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values().filter(|f| f.is_dirty())
    }

    /// Normalizes and writes one tracked file. Returns the written path.
    pub fn persist(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, EngineError> {
        let key = self.resolve(path);
        let file = self
            .files
            .get_mut(&key)
            .ok_or_else(|| EngineError::UntrackedFile { path: key.clone() })?;

        let text = format::normalize(file)?;
        write_file(&key, &text)?;
        file.replace_text(text)?;
        file.mark_clean();
        Ok(key)
    }

    /// Normalizes every dirty file, then writes them all. Each file is first
    /// written to a temporary sibling; the targets are replaced only once
    /// every file has been staged, so a failure while normalizing or
    /// staging leaves the project as it was.
    pub fn commit(&mut self) -> Result<Vec<PathBuf>, EngineError> {
        let mut normalized = Vec::new();
        for (path, file) in &self.files {
            if file.is_dirty() {
                normalized.push((path.clone(), format::normalize(file)?));
            }
        }

        let mut staged = Vec::with_capacity(normalized.len());
        for (path, text) in normalized {
            let temp = stage_file(&path, &text)?;
            staged.push((path, text, temp));
        }

        let mut written = Vec::new();
        for (path, text, temp) in staged {
            temp.persist(&path)
                .map_err(|e| EngineError::io(&path, e.error.to_string()))?;
            if let Some(file) = self.files.get_mut(&path) {
                file.replace_text(text)?;
                file.mark_clean();
            }
            tracing::info!(path = %path.display(), "written");
            written.push(path);
        }
        Ok(written)
    }

    /// Relative module specifier for importing `to` from `from`.
    pub fn module_specifier(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> String {
        module_specifier(&self.resolve(from), &self.resolve(to))
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e.to_string()))?;
    }
    std::fs::write(path, text).map_err(|e| EngineError::io(path, e.to_string()))
}

/// Writes `text` to a temporary file next to `path`. The file is removed
/// again if it is dropped without being persisted.
fn stage_file(path: &Path, text: &str) -> Result<NamedTempFile, EngineError> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e.to_string()))?;
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| EngineError::io(parent, e.to_string()))?;
    temp.write_all(text.as_bytes())
        .map_err(|e| EngineError::io(path, e.to_string()))?;
    Ok(temp)
}

/// Lexically normalizes a path: drops `.` and resolves `..` where possible.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Computes the import specifier for `to` as seen from the file `from`:
/// forward slashes, a leading `./` or `../`, no extension and no trailing
/// `index` segment.
pub fn module_specifier(from: &Path, to: &Path) -> String {
    let base = from.parent().unwrap_or(Path::new(""));
    let relative = pathdiff::diff_paths(to, base).unwrap_or_else(|| to.to_path_buf());

    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if let Some(last) = parts.last_mut() {
        for ext in [".tsx", ".ts", ".jsx", ".js"] {
            if let Some(stem) = last.strip_suffix(ext) {
                *last = stem.to_string();
                break;
            }
        }
    }
    if parts.last().map(|p| p == "index").unwrap_or(false) {
        parts.pop();
    }

    let joined = parts.join("/");
    if joined.is_empty() {
        ".".to_string()
    } else if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Normalizes an existing specifier the same way [`module_specifier`] does,
/// so `./props.ts`, `./props` and `./props/index` compare equal.
pub fn normalize_specifier(specifier: &str) -> String {
    if !specifier.starts_with('.') {
        return specifier.to_string();
    }
    let mut spec = specifier.to_string();
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stem) = spec.strip_suffix(ext) {
            spec = stem.to_string();
            break;
        }
    }
    if spec == "./index" {
        return ".".to_string();
    }
    if let Some(stem) = spec.strip_suffix("/index") {
        spec = stem.to_string();
    }
    if spec.is_empty() {
        ".".to_string()
    } else {
        spec
    }
}
