/*
Rendering a shared tree as text.

TreeNodeRef is an alias for Rc<RefCell<TreeNode>>, so display helpers live in a
trait implemented for the alias rather than in an inherent impl.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::TreeNodeRef;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeNodeRef {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let node_borrowed = &self.borrow();

        if node_borrowed.is_empty() {
            return Tree::new("Empty tree".to_string());
        }

        // Each entry shows the label and its current weight
        let root = format!("{} ({})", node_borrowed.name(), node_borrowed.weight());

        // Recursively construct the children
        let leaves: Vec<_> = node_borrowed
            .children()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();

        Tree::new(root).with_leaves(leaves)
    }
}
