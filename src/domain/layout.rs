//! Treemap layout and hit testing.
//!
//! Both walk the same partition: a node's rectangle is cut along one axis,
//! the wider side when width > height, otherwise the height. Every child but
//! the last gets `floor(share * extent)`; the last child takes whatever is
//! left so the slices tile the parent exactly. Clickable boundaries therefore
//! match drawn boundaries pixel for pixel.

use std::rc::Rc;

use tracing::{instrument, trace};

use crate::domain::geometry::{Point, Rect, Tile};
use crate::domain::tree::{TreeNode, TreeNodeRef};

/// Direction in which a rectangle is cut into slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Side-by-side slices, widths proportional to weight
    Vertical,
    /// Stacked slices, heights proportional to weight
    Horizontal,
}

impl Axis {
    /// Ties go to horizontal slicing.
    pub fn for_rect(rect: Rect) -> Self {
        if rect.width > rect.height {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }
}

/// Cuts `rect` among `node`'s children in child order.
///
/// Must only be called on a node of positive weight: shares are weight / total.
fn partition(node: &TreeNode, rect: Rect) -> Vec<(TreeNodeRef, Rect)> {
    let total = node.weight();
    assert!(total > 0, "partitioning zero-weight node: {}", node.name());

    let axis = Axis::for_rect(rect);
    let extent = match axis {
        Axis::Vertical => rect.width,
        Axis::Horizontal => rect.height,
    };

    let children = node.children();
    let last = children.len().saturating_sub(1);
    let mut offset = 0;
    let mut slices = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        let size = if i == last {
            extent - offset
        } else {
            // floor(weight / total * extent), exact in integers
            let weight = i128::from(child.borrow().weight());
            (weight * i128::from(extent) / i128::from(total)) as i64
        };
        let slice = match axis {
            Axis::Vertical => Rect::new(rect.x + offset, rect.y, size, rect.height),
            Axis::Horizontal => Rect::new(rect.x, rect.y + offset, rect.width, size),
        };
        slices.push((Rc::clone(child), slice));
        offset += size;
    }
    slices
}

/// Rectangles and colors for every leaf of positive weight under `node`.
///
/// Zero-weight subtrees (including zeroed leaves) produce nothing, as does a
/// node driven below zero through the unclamped `decrease_weight`.
#[instrument(level = "trace", skip(node))]
pub fn layout(node: &TreeNodeRef, rect: Rect) -> Vec<Tile> {
    let node = node.borrow();
    if node.weight() <= 0 {
        return Vec::new();
    }
    if node.is_leaf() {
        return vec![(rect, node.color())];
    }

    let mut tiles = Vec::new();
    for (child, slice) in partition(&node, rect) {
        tiles.extend(layout(&child, slice));
    }
    tiles
}

/// Leaf of positive weight whose slice contains `point`, if any.
///
/// Bounds are inclusive, so a point on the edge shared by two slices belongs
/// to the earlier one.
#[instrument(level = "trace", skip(node))]
pub fn hit_test(node: &TreeNodeRef, rect: Rect, point: Point) -> Option<TreeNodeRef> {
    let current = node.borrow();
    if current.weight() <= 0 || !rect.contains(point) {
        return None;
    }
    if current.is_leaf() {
        trace!(leaf = current.name(), "hit");
        return Some(Rc::clone(node));
    }

    let axis = Axis::for_rect(rect);
    let hit = partition(&current, rect)
        .into_iter()
        .filter(|(_, slice)| match axis {
            Axis::Vertical => slice.x <= point.x && point.x <= slice.right(),
            Axis::Horizontal => slice.y <= point.y && point.y <= slice.bottom(),
        })
        .find_map(|(child, slice)| hit_test(&child, slice, point));
    hit
}
