//! Content source abstraction for retrieving repository files.
//!
//! The scoring core never talks to a network or a disk layout directly. A
//! [`ContentSource`] supplies the raw files of one repository, reporting
//! per-file failures without aborting the batch, and a [`ContentCache`] may sit
//! in front of it. A cache hit is indistinguishable from a fresh fetch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use ignore::WalkBuilder;
use parking_lot::RwLock;

use super::{Error, Result};

/// A file as delivered by the retrieval layer, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// Undecoded content.
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Result of fetching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(RawFile),
    Failed { path: PathBuf, reason: String },
}

/// Trait for retrieving the files of one repository.
pub trait ContentSource: Send + Sync {
    /// Stable identifier of the repository (e.g. `owner/name` or a path).
    fn repository_id(&self) -> String;

    /// Content revision, if the source can name one cheaply.
    fn revision(&self) -> Option<String>;

    /// Fetch every file. Per-file failures are returned as
    /// [`FetchOutcome::Failed`]; `Err` means the repository itself is unreachable.
    fn fetch(&self) -> Result<Vec<FetchOutcome>>;
}

/// Reads files from a local checkout, honoring `.gitignore` and skipping
/// hidden entries.
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    /// Create a new filesystem source rooted at the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the checkout.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .build()
            .flatten()
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

impl ContentSource for FilesystemSource {
    fn repository_id(&self) -> String {
        self.root.to_string_lossy().to_string()
    }

    /// Digest of (path, size, mtime) for every file; changes whenever the
    /// checkout changes without reading file contents.
    fn revision(&self) -> Option<String> {
        let mut hasher = blake3::Hasher::new();
        for path in self.walk() {
            let meta = std::fs::metadata(&path).ok()?;
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            hasher.update(self.relative(&path).to_string_lossy().as_bytes());
            hasher.update(&meta.len().to_le_bytes());
            hasher.update(&mtime.to_le_bytes());
        }
        Some(hasher.finalize().to_hex().to_string())
    }

    fn fetch(&self) -> Result<Vec<FetchOutcome>> {
        if !self.root.exists() {
            return Err(Error::FileNotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(Error::fetch(self.repository_id(), "not a directory"));
        }
        let outcomes = self
            .walk()
            .into_iter()
            .map(|path| {
                let relative = self.relative(&path);
                match std::fs::read(&path) {
                    Ok(bytes) => FetchOutcome::Fetched(RawFile::new(relative, bytes)),
                    Err(e) => FetchOutcome::Failed {
                        path: relative,
                        reason: e.to_string(),
                    },
                }
            })
            .collect();
        Ok(outcomes)
    }
}

/// An in-memory source, used by tests and by callers that already hold the
/// file contents.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    id: String,
    files: Vec<RawFile>,
}

impl MemorySource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.push(RawFile::new(path, content));
        self
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.push(RawFile::new(path, content));
    }
}

impl ContentSource for MemorySource {
    fn repository_id(&self) -> String {
        self.id.clone()
    }

    fn revision(&self) -> Option<String> {
        let mut sorted: Vec<&RawFile> = self.files.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));
        let mut hasher = blake3::Hasher::new();
        for file in sorted {
            hasher.update(file.path.to_string_lossy().as_bytes());
            hasher.update(&file.bytes);
        }
        Some(hasher.finalize().to_hex().to_string())
    }

    fn fetch(&self) -> Result<Vec<FetchOutcome>> {
        Ok(self
            .files
            .iter()
            .cloned()
            .map(FetchOutcome::Fetched)
            .collect())
    }
}

/// Cache key: one repository at one content revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repository: String,
    pub revision: String,
}

/// Cache for fetched repository contents.
pub trait ContentCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<Vec<FetchOutcome>>>;
    fn put(&self, key: CacheKey, files: Arc<Vec<FetchOutcome>>);
    fn invalidate(&self, key: &CacheKey);
}

/// Run-scoped cache held in memory.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Arc<Vec<FetchOutcome>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ContentCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<Vec<FetchOutcome>>> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: CacheKey, files: Arc<Vec<FetchOutcome>>) {
        self.entries.write().insert(key, files);
    }

    fn invalidate(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }
}

/// Wraps a source with a cache. Sources that cannot name a revision are
/// never cached.
pub struct CachedSource<'a, S: ContentSource> {
    inner: S,
    cache: &'a dyn ContentCache,
}

impl<'a, S: ContentSource> CachedSource<'a, S> {
    pub fn new(inner: S, cache: &'a dyn ContentCache) -> Self {
        Self { inner, cache }
    }
}

impl<S: ContentSource> ContentSource for CachedSource<'_, S> {
    fn repository_id(&self) -> String {
        self.inner.repository_id()
    }

    fn revision(&self) -> Option<String> {
        self.inner.revision()
    }

    fn fetch(&self) -> Result<Vec<FetchOutcome>> {
        let Some(revision) = self.inner.revision() else {
            return self.inner.fetch();
        };
        let key = CacheKey {
            repository: self.inner.repository_id(),
            revision,
        };
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("cache hit for {}", key.repository);
            return Ok(hit.as_ref().clone());
        }
        let files = self.inner.fetch()?;
        self.cache.put(key, Arc::new(files.clone()));
        Ok(files)
    }
}
