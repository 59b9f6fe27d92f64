//! Asset sources
//!
//! The asset bundle is static and trusted, so sources do no caching or
//! retrying of their own. Callers cache the decoded records.

use super::AssetError;
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Asset loader collaborator: logical path in, raw bytes out
pub trait AssetSource: Send + Sync {
    fn load(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    fn exists(&self, path: &str) -> bool {
        self.load(path).is_ok()
    }
}

/// In-memory asset bundle (tests, tools, embedded bundles)
#[derive(Default, Clone)]
pub struct MemoryAssetSource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn load(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

/// Assets laid out as files under a root directory
#[derive(Debug, Clone)]
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl AssetSource for DirectoryAssetSource {
    fn load(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(path);
        match std::fs::read(&full) {
            Ok(bytes) => {
                log::debug!(
                    "[DirectoryAssetSource::load] {} ({} bytes)",
                    full.display(),
                    bytes.len()
                );
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AssetError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(AssetError::Io {
                path: path.to_string(),
                error: e.to_string(),
            }),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }
}
