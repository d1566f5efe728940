use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::application::sources::DataSource;
use crate::domain::{DomainError, NodeFactory, TreeNodeRef};

/// Files and folders below a path.
///
/// Folders are internal nodes holding their entries in file-name order,
/// regular files are leaves weighted by their size in bytes. Symlinks are
/// not followed; they count with the size of the link itself. An empty
/// folder becomes a leaf of weight 0.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn build_node(&self, path: &Path, factory: &mut NodeFactory) -> ApplicationResult<TreeNodeRef> {
        let label = node_label(path);
        let metadata = fs::symlink_metadata(path).with_path_context("read metadata", path)?;

        if !metadata.is_dir() {
            let weight = size_weight(&label, metadata.len())?;
            trace!(path = %path.display(), weight, "file");
            return Ok(factory.leaf(label, weight)?);
        }

        let mut children = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ApplicationError::OperationFailed {
                context: format!("scan directory: {}", path.display()),
                source: Box::new(e),
            })?;
            children.push(self.build_node(entry.path(), factory)?);
        }

        if children.is_empty() {
            debug!(path = %path.display(), "empty directory");
            return Ok(factory.leaf(label, 0)?);
        }
        Ok(factory.internal(label, children)?)
    }
}

/// File size as a weight; sizes past `i64::MAX` are rejected, not clamped.
fn size_weight(label: &str, len: u64) -> Result<i64, DomainError> {
    i64::try_from(len).map_err(|_| DomainError::WeightOverflow {
        label: label.to_string(),
    })
}

/// Last path component, or the whole path for roots like `/`.
fn node_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl DataSource for FileSystemSource {
    #[instrument(level = "debug", skip(factory))]
    fn build(&self, factory: &mut NodeFactory) -> ApplicationResult<TreeNodeRef> {
        if !self.root.exists() {
            return Err(ApplicationError::SourceNotFound(self.root.clone()));
        }
        // "." and ".." have no file name of their own
        let root = self
            .root
            .canonicalize()
            .with_path_context("resolve path", &self.root)?;
        self.build_node(&root, factory)
    }

    fn separator(&self) -> &str {
        MAIN_SEPARATOR_STR
    }
}
