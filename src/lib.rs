//! rstreemap: treemap layout and interactive tree-mutation engine
//!
//! A weighted tree (`domain::tree`) is laid out as nested rectangles
//! (`domain::layout`), hit-tested against screen points, and edited through
//! an input-driven session (`application::session`).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, Session};
pub use domain::{hit_test, layout, NodeFactory, Point, Rect, Rgb, TreeNode, TreeNodeRef, WeightedTree};
