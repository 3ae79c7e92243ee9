use super::encode::{EncodedNode, EncodedTree};

/// Prune below `node` and report whether `node` itself should go.
///
/// Leaves always stay.  A non-leaf stays iff at least one child survives, and
/// then its `children` hold exactly the survivors in their original order.
pub fn prune(node: &mut EncodedNode) -> bool {
    if node.is_leaf() {
        return false;
    }

    match node.children.as_mut() {
        Some(children) => {
            children.retain_mut(|child| !prune(child));
            children.is_empty()
        }
        None => true,
    }
}

/// Prune every top-level node.  The synthetic root is never removed, so an
/// empty `nodes` list is a perfectly good "no results" answer.
pub fn prune_tree(tree: &mut EncodedTree) {
    let before = tree.node_count();
    tree.nodes.retain_mut(|node| !prune(node));
    trace!(before, after = tree.node_count(), "pruned tree");
}
