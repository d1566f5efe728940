use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::application::sources::DataSource;
use crate::domain::{NodeFactory, TreeNodeRef};

/// One record of a dataset: a group with children, or a weighted entry.
#[derive(Debug, Clone, Deserialize)]
struct Record {
    name: String,
    weight: Option<i64>,
    #[serde(default)]
    children: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
struct Document {
    separator: Option<String>,
    #[serde(flatten)]
    root: Record,
}

/// Hierarchical dataset read from TOML, e.g. population by region and country.
///
/// ```toml
/// name = "World"
/// separator = " > "
///
/// [[children]]
/// name = "Oceania"
///
/// [[children.children]]
/// name = "Fiji"
/// weight = 889953
/// ```
///
/// Entries without children must carry a `weight`; a group's weight is
/// always the sum of its children.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    path: PathBuf,
    separator: String,
    root: Record,
}

impl DatasetSource {
    /// Read and parse a dataset file.
    ///
    /// `default_separator` applies unless the document sets its own.
    #[instrument(level = "debug")]
    pub fn load(path: &Path, default_separator: &str) -> ApplicationResult<Self> {
        if !path.exists() {
            return Err(ApplicationError::SourceNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).with_path_context("read dataset", path)?;
        Self::parse(&content, path, default_separator)
    }

    /// Parse dataset content; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path, default_separator: &str) -> ApplicationResult<Self> {
        let document: Document =
            toml::from_str(content).map_err(|e| ApplicationError::InvalidDataset {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let separator = document
            .separator
            .unwrap_or_else(|| default_separator.to_string());
        debug!(root = %document.root.name, separator, "dataset parsed");
        Ok(Self {
            path: path.to_path_buf(),
            separator,
            root: document.root,
        })
    }

    fn build_record(&self, record: &Record, factory: &mut NodeFactory) -> ApplicationResult<TreeNodeRef> {
        if record.children.is_empty() {
            let weight = record.weight.ok_or_else(|| ApplicationError::InvalidDataset {
                path: self.path.clone(),
                message: format!("entry without children needs a weight: {}", record.name),
            })?;
            return Ok(factory.leaf(record.name.clone(), weight)?);
        }

        if record.weight.is_some() {
            warn!(name = %record.name, "weight of a group is ignored");
        }
        let children = record
            .children
            .iter()
            .map(|child| self.build_record(child, factory))
            .collect::<ApplicationResult<Vec<_>>>()?;
        Ok(factory.internal(record.name.clone(), children)?)
    }
}

impl DataSource for DatasetSource {
    #[instrument(level = "debug", skip(self, factory), fields(path = %self.path.display()))]
    fn build(&self, factory: &mut NodeFactory) -> ApplicationResult<TreeNodeRef> {
        self.build_record(&self.root, factory)
    }

    fn separator(&self) -> &str {
        &self.separator
    }
}
