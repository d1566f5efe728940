//! Weighted tree with shared ownership and weak parent links.
//!
//! Every node is an `Rc<RefCell<TreeNode>>`. Parents own their children;
//! children point back through a `Weak`, so dropping the root drops the tree.
//!
//! Nodes compare by label, not by identity: all lookups below locate "the
//! first leaf with this label" in pre-order. Two siblings sharing a label are
//! indistinguishable, and the first one wins.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::geometry::Rgb;
use crate::domain::palette::Palette;

pub type TreeNodeRef = Rc<RefCell<TreeNode>>;
type WeakTreeNodeRef = Weak<RefCell<TreeNode>>;

/// Spaces between the path and the displayed size in a status line.
const SIZE_GAP: &str = "     ";

#[derive(Debug)]
pub struct TreeNode {
    /// `None` marks the empty tree
    label: Option<String>,
    /// Explicit for leaves, sum of the children for internal nodes
    weight: i64,
    color: Rgb,
    children: Vec<TreeNodeRef>,
    parent: Option<WeakTreeNodeRef>,
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl TreeNode {
    /// Builds a node and links `children` back to it.
    ///
    /// With children the weight is their sum and `weight` is ignored; without
    /// children `weight` is taken as is. An unlabelled node is the empty tree
    /// and always weighs 0.
    ///
    /// # Errors
    /// * `MissingLabel` if `label` is `None` but `children` is not empty
    /// * `NegativeWeight` if a leaf is given a negative weight
    pub fn new(
        label: Option<String>,
        children: Vec<TreeNodeRef>,
        weight: i64,
        color: Rgb,
    ) -> DomainResult<TreeNodeRef> {
        let weight = match (&label, children.is_empty()) {
            (None, false) => {
                return Err(DomainError::MissingLabel {
                    children: children.len(),
                })
            }
            (None, true) => 0,
            (Some(label), true) if weight < 0 => {
                return Err(DomainError::NegativeWeight {
                    label: label.clone(),
                    weight,
                })
            }
            (Some(_), true) => weight,
            (Some(label), false) => children
                .iter()
                .try_fold(0i64, |sum, c| sum.checked_add(c.borrow().weight))
                .ok_or_else(|| DomainError::WeightOverflow {
                    label: label.clone(),
                })?,
        };

        let node = Rc::new(RefCell::new(TreeNode {
            label,
            weight,
            color,
            children,
            parent: None,
        }));
        for child in &node.borrow().children {
            child.borrow_mut().parent = Some(Rc::downgrade(&node));
        }
        Ok(node)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label for display, empty for the empty tree.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn children(&self) -> &[TreeNodeRef] {
        &self.children
    }

    pub fn parent(&self) -> Option<TreeNodeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// True for the unlabelled sentinel that stands for an empty tree.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
    }

    /// True if a direct child carries `candidate`'s label and has no children.
    pub fn is_leaf_child(&self, candidate: &TreeNode) -> bool {
        self.leaf_child_position(candidate.label()).is_some()
    }

    fn leaf_child_position(&self, label: Option<&str>) -> Option<usize> {
        self.children.iter().position(|child| {
            let child = child.borrow();
            child.label() == label && child.is_leaf()
        })
    }

    /// Per-keypress resize increment: `ceil(size * step_fraction)`, 0 on the empty tree.
    pub fn resize_step(&self, size: i64, step_fraction: f64) -> i64 {
        if self.is_empty() {
            return 0;
        }
        (size as f64 * step_fraction).ceil() as i64
    }

    /// Checks the weight and parent-link invariants over the whole subtree.
    pub fn is_consistent(&self) -> bool {
        if self.weight < 0 {
            return false;
        }
        if self.is_empty() {
            return self.weight == 0 && self.children.is_empty();
        }
        if self.is_leaf() {
            return true;
        }
        let sum: i64 = self.children.iter().map(|c| c.borrow().weight).sum();
        sum == self.weight
            && self.children.iter().all(|child| {
                let linked = child
                    .borrow()
                    .parent()
                    .is_some_and(|p| std::ptr::eq(p.as_ptr(), self));
                linked && child.borrow().is_consistent()
            })
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.borrow().depth())
            .max()
            .unwrap_or(0)
    }

    /// Turns a parentless leaf into the empty tree.
    fn clear(&mut self) {
        self.label = None;
        self.weight = 0;
        self.children.clear();
    }
}

/// Mutations and lookups that need the shared handle (parent walks, detaching).
pub trait WeightedTree {
    /// First leaf in pre-order with `target`'s label: the root itself when it
    /// is a matching leaf, otherwise a leaf child of some internal node.
    fn find_leaf(&self, target: &TreeNodeRef) -> Option<TreeNodeRef>;

    /// Detaches `target` from its parent's children without touching weights.
    ///
    /// If the tree is a single leaf equal to `target`, the root becomes the
    /// empty tree. Returns whether anything changed.
    fn remove_leaf_from_immediate_parent(&self, target: &TreeNodeRef) -> bool;

    /// Adds `delta` to the target leaf and to every ancestor.
    ///
    /// Does not clamp: callers keep the leaf above zero. Returns the updated leaf,
    /// or `None` if no leaf matches or some weight on the path would overflow;
    /// in both cases nothing changes.
    fn propagate_weight_delta(&self, target: &TreeNodeRef, delta: i64) -> Option<TreeNodeRef>;

    fn increase_weight(&self, target: &TreeNodeRef, amount: i64) -> Option<TreeNodeRef> {
        self.propagate_weight_delta(target, amount)
    }

    fn decrease_weight(&self, target: &TreeNodeRef, amount: i64) -> Option<TreeNodeRef> {
        self.propagate_weight_delta(target, -amount)
    }

    /// Subtracts the target leaf's weight from its ancestors and zeroes it.
    ///
    /// The leaf stays in the tree. Returns the weight that was removed, `None`
    /// if no leaf matches or an ancestor weight would overflow.
    fn detach_and_zero(&self, target: &TreeNodeRef) -> Option<i64>;

    /// Status line for the selected leaf:
    /// `<sep><parent><sep><leaf>     (<size>)`.
    ///
    /// Only the immediate parent is shown, however deep the leaf sits. Empty
    /// when nothing is selected or the leaf has no parent.
    fn path_from(&self, selected: Option<&TreeNodeRef>, size: i64, separator: &str) -> String;

    /// Leaves in child order, zero-weight ones included.
    fn leaves(&self) -> Vec<TreeNodeRef>;
}

impl WeightedTree for TreeNodeRef {
    #[instrument(level = "trace", skip_all)]
    fn find_leaf(&self, target: &TreeNodeRef) -> Option<TreeNodeRef> {
        let label = target.borrow().label.clone();
        let node = self.borrow();
        if node.is_leaf() && node.is_root() && node.label == label {
            return Some(Rc::clone(self));
        }
        find_leaf_child(self, label.as_deref())
    }

    #[instrument(level = "debug", skip(self, target))]
    fn remove_leaf_from_immediate_parent(&self, target: &TreeNodeRef) -> bool {
        let label = target.borrow().label.clone();
        debug!(label = ?label, "removing leaf");
        remove_leaf_labelled(self, label.as_deref())
    }

    #[instrument(level = "debug", skip(self, target))]
    fn propagate_weight_delta(&self, target: &TreeNodeRef, delta: i64) -> Option<TreeNodeRef> {
        let leaf = self.find_leaf(target)?;
        debug!(label = leaf.borrow().name(), "propagating weight delta");
        if !add_along_parents(&leaf, delta) {
            warn!(label = leaf.borrow().name(), delta, "weight overflow, delta rejected");
            return None;
        }
        Some(leaf)
    }

    #[instrument(level = "debug", skip(self, target))]
    fn detach_and_zero(&self, target: &TreeNodeRef) -> Option<i64> {
        let leaf = self.find_leaf(target)?;
        let removed = leaf.borrow().weight;
        let parent = leaf.borrow().parent();
        if let Some(parent) = parent {
            if !add_along_parents(&parent, removed.checked_neg()?) {
                warn!(label = leaf.borrow().name(), removed, "weight overflow, leaf kept");
                return None;
            }
        }
        leaf.borrow_mut().weight = 0;
        debug!(label = leaf.borrow().name(), removed, "leaf deactivated");
        Some(removed)
    }

    fn path_from(&self, selected: Option<&TreeNodeRef>, size: i64, separator: &str) -> String {
        let Some(selected) = selected else {
            return String::new();
        };
        let Some(leaf) = self.find_leaf(selected) else {
            return String::new();
        };
        let leaf = leaf.borrow();
        let Some(parent) = leaf.parent() else {
            return String::new();
        };
        let parent_name = parent.borrow().name().to_owned();
        format!(
            "{separator}{parent_name}{separator}{}{SIZE_GAP}({size})",
            leaf.name()
        )
    }

    fn leaves(&self) -> Vec<TreeNodeRef> {
        let node = self.borrow();
        if node.is_leaf() {
            return vec![Rc::clone(self)];
        }
        let mut leaves = Vec::new();
        for child in &node.children {
            leaves.extend(child.leaves());
        }
        leaves
    }
}

/// Adds `delta` to `start` and every ancestor, all or nothing.
///
/// Returns false, leaving every weight untouched, if any sum would overflow.
fn add_along_parents(start: &TreeNodeRef, delta: i64) -> bool {
    let mut chain = Vec::new();
    let mut current = Some(Rc::clone(start));
    while let Some(node) = current {
        let Some(updated) = node.borrow().weight.checked_add(delta) else {
            return false;
        };
        current = node.borrow().parent();
        chain.push((node, updated));
    }
    for (node, weight) in chain {
        node.borrow_mut().weight = weight;
        trace!(node = node.borrow().name(), weight, "weight updated");
    }
    true
}

fn find_leaf_child(node: &TreeNodeRef, label: Option<&str>) -> Option<TreeNodeRef> {
    let node = node.borrow();
    if let Some(index) = node.leaf_child_position(label) {
        return Some(Rc::clone(&node.children[index]));
    }
    let found = node
        .children
        .iter()
        .filter(|child| !child.borrow().is_leaf())
        .find_map(|child| find_leaf_child(child, label));
    found
}

fn remove_leaf_labelled(node: &TreeNodeRef, label: Option<&str>) -> bool {
    let position = node.borrow().leaf_child_position(label);
    if let Some(index) = position {
        let removed = node.borrow_mut().children.remove(index);
        removed.borrow_mut().parent = None;
        debug!(index, "leaf detached");
        return true;
    }

    let clears_root = {
        let node = node.borrow();
        node.label() == label && node.is_leaf() && node.is_root() && !node.is_empty()
    };
    if clears_root {
        node.borrow_mut().clear();
        debug!("last leaf removed, tree is empty");
        return true;
    }

    let children = node.borrow().children.clone();
    children
        .iter()
        .any(|child| remove_leaf_labelled(child, label))
}

/// Builds nodes with colors drawn from one palette.
#[derive(Debug, Clone, Default)]
pub struct NodeFactory {
    palette: Palette,
}

impl NodeFactory {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Palette::seeded(seed))
    }

    pub fn leaf(&mut self, label: impl Into<String>, weight: i64) -> DomainResult<TreeNodeRef> {
        TreeNode::new(Some(label.into()), Vec::new(), weight, self.palette.next_color())
    }

    pub fn internal(
        &mut self,
        label: impl Into<String>,
        children: Vec<TreeNodeRef>,
    ) -> DomainResult<TreeNodeRef> {
        TreeNode::new(Some(label.into()), children, 0, self.palette.next_color())
    }

    pub fn empty(&mut self) -> TreeNodeRef {
        let color = self.palette.next_color();
        Rc::new(RefCell::new(TreeNode {
            label: None,
            weight: 0,
            color,
            children: Vec::new(),
            parent: None,
        }))
    }
}
