//! Data sources: where weighted trees come from
//!
//! A source turns external data (a directory, a dataset file) into a
//! `TreeNodeRef` and names the separator used in status lines.

mod dataset;
mod filesystem;

pub use dataset::DatasetSource;
pub use filesystem::FileSystemSource;

use crate::application::ApplicationResult;
use crate::domain::{NodeFactory, TreeNodeRef};

/// Supplier of a weighted tree.
pub trait DataSource {
    /// Build the full tree, drawing node colors from `factory`.
    fn build(&self, factory: &mut NodeFactory) -> ApplicationResult<TreeNodeRef>;

    /// Separator placed between labels in the status line.
    fn separator(&self) -> &str;
}
