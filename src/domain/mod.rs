//! Domain layer: weighted tree, geometry and the treemap engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod geometry;
pub mod layout;
pub mod palette;
pub mod tree;

pub use error::{DomainError, DomainResult};
pub use geometry::{Point, Rect, Rgb, Tile};
pub use layout::{hit_test, layout, Axis};
pub use palette::Palette;
pub use tree::{NodeFactory, TreeNode, TreeNodeRef, WeightedTree};
