use serde::{Deserialize, Serialize};

use super::builder::{CatalogueTree, TreeNode};
use crate::file_format::catalogue::NodeKind;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A node in the shape the tree widget consumes.
///
/// `children` is only present when `has_children` is true; a leaf never has
/// it, not even empty.  `id`, `is_expanded` and `is_selected` are filled in by
/// the assigner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedNode {
    pub id: u32,
    pub label: String,
    pub kind: NodeKind,
    pub has_children: bool,
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<EncodedNode>>,
}

impl EncodedNode {
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn children(&self) -> &[EncodedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Depth-first, pre-order visit of this node and everything below it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a EncodedNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// The children of the synthetic root, which itself is never encoded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedTree {
    pub nodes: Vec<EncodedNode>,
}

impl EncodedTree {
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a EncodedNode)) {
        for node in &self.nodes {
            node.walk(visit);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

fn encode_node(node: &TreeNode) -> EncodedNode {
    let children = if node.is_leaf() || node.children.is_empty() {
        None
    } else {
        Some(node.children.values().map(encode_node).collect())
    };

    EncodedNode {
        id: 0,
        label: node.label.clone(),
        kind: node.kind,
        has_children: children.is_some(),
        is_expanded: false,
        is_selected: false,
        category_ref: node.category_ref.clone(),
        field_ref: node.field_ref.clone(),
        instance_ref: node.instance_ref.clone(),
        children,
    }
}

/// Reshape the built tree for the widget.  Nothing is filtered or pruned
/// here: a childless non-leaf looks just like a leaf at this point.
pub fn encode(tree: &CatalogueTree) -> EncodedTree {
    EncodedTree {
        nodes: tree.root.children.values().map(encode_node).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::catalogue::CatalogueRow;
    use crate::hierarchy::builder::build;
    use crate::hierarchy::phrase::Phrase;
    use serde_json::json;

    fn encoded(rows: &[CatalogueRow]) -> EncodedTree {
        encode(&build(rows, &Phrase::everything()).unwrap())
    }

    #[test]
    fn test_shape_follows_build_order() {
        let tree = encoded(&[
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("1.2.0", "leaf", "Second"),
            CatalogueRow::new("1.1.0", "leaf", "First"),
        ]);

        assert_eq!(tree.nodes.len(), 1);
        let a = &tree.nodes[0];
        assert!(a.has_children);
        let labels: Vec<&str> = a.children().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Second", "First"]);
    }

    #[test]
    fn test_childless_non_leaf_omits_children() {
        let tree = encoded(&[CatalogueRow::new("1.0.0", "sub", "Empty group")]);
        let node = &tree.nodes[0];
        assert!(!node.has_children);
        assert_eq!(node.children, None);
        assert_eq!(node.kind, NodeKind::Sub);
    }

    #[test]
    fn test_serialized_shape() {
        let tree = encoded(&[
            CatalogueRow::new("1.0.0", "root", "A").with_category_ref("7"),
            CatalogueRow::new("1.1.0", "leaf", "Sex").with_field_ref("31"),
        ]);
        assert_eq!(
            serde_json::to_value(&tree.nodes).unwrap(),
            json!([{
                "id": 0,
                "label": "A",
                "kind": "root",
                "hasChildren": true,
                "isExpanded": false,
                "categoryRef": "7",
                "children": [{
                    "id": 0,
                    "label": "Sex",
                    "kind": "leaf",
                    "hasChildren": false,
                    "isExpanded": false,
                    "fieldRef": "31",
                }],
            }])
        );
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = encoded(&[
            CatalogueRow::new("1.0", "root", "A"),
            CatalogueRow::new("1.1", "leaf", "A.1"),
            CatalogueRow::new("2.0", "root", "B"),
            CatalogueRow::new("2.1", "sub", "B.1"),
            CatalogueRow::new("2.1.1", "leaf", "B.1.1"),
        ]);
        let mut seen = vec![];
        tree.walk(&mut |node| seen.push(node.label.clone()));
        assert_eq!(seen, vec!["A", "A.1", "B", "B.1", "B.1.1"]);
        assert_eq!(tree.node_count(), 5);
    }
}
