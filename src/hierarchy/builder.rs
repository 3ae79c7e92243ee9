use indexmap::{map::Entry, IndexMap, IndexSet};

use super::path::decode_row_path;
use super::phrase::Phrase;
use crate::errors::{HierarchyError, Result, RowProblem};
use crate::file_format::catalogue::{CatalogueRow, NodeKind};

/// A node of the in-memory catalogue tree.  Children are keyed by their path
/// segment and keep the order in which the builder first saw them.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub label: String,
    pub kind: NodeKind,
    pub category_ref: Option<String>,
    pub field_ref: Option<String>,
    pub instance_ref: Option<String>,
    pub children: IndexMap<u32, TreeNode>,
}

impl TreeNode {
    fn synthetic_root() -> TreeNode {
        TreeNode {
            label: String::new(),
            kind: NodeKind::Root,
            category_ref: None,
            field_ref: None,
            instance_ref: None,
            children: IndexMap::new(),
        }
    }

    /// Stand-in for an ancestor whose own row hasn't been inserted yet.
    fn placeholder() -> TreeNode {
        TreeNode {
            kind: NodeKind::Sub,
            ..TreeNode::synthetic_root()
        }
    }

    fn from_row(row: &CatalogueRow, kind: NodeKind) -> TreeNode {
        let mut node = TreeNode::placeholder();
        node.fill_from_row(row, kind);
        node
    }

    fn fill_from_row(&mut self, row: &CatalogueRow, kind: NodeKind) {
        self.label = row.name.clone();
        self.kind = kind;
        self.category_ref = row.category_ref.clone();
        self.field_ref = row.field_ref.clone();
        self.instance_ref = row.instance_ref.clone();
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Walk down by decoded segment keys.
    pub fn get(&self, path: &[u32]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(self, |node, key| node.children.get(key))
    }

    fn count_leaves(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children.values().map(TreeNode::count_leaves).sum()
    }
}

/// Result of a build: the synthetic root owns everything else.  The root is
/// never handed to the widget, only its children are.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogueTree {
    pub root: TreeNode,
}

impl CatalogueTree {
    pub fn new() -> CatalogueTree {
        CatalogueTree {
            root: TreeNode::synthetic_root(),
        }
    }

    pub fn get(&self, path: &[u32]) -> Option<&TreeNode> {
        self.root.get(path)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.count_leaves()
    }

    /// Insert (or fill in) the node at `path`, creating placeholder ancestors
    /// as needed.  An ancestor created as a placeholder keeps its position
    /// among its siblings when its own row shows up later.
    fn insert(&mut self, path: &[u32], row: &CatalogueRow, kind: NodeKind) {
        let (last, ancestors) = match path.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut node = &mut self.root;
        for key in ancestors {
            node = node
                .children
                .entry(*key)
                .or_insert_with(TreeNode::placeholder);
        }

        match node.children.entry(*last) {
            Entry::Occupied(mut existing) => existing.get_mut().fill_from_row(row, kind),
            Entry::Vacant(slot) => {
                slot.insert(TreeNode::from_row(row, kind));
            }
        }
    }
}

/// Reorder every node's children by the rank of their full path in
/// `positions`.
fn order_children(node: &mut TreeNode, prefix: &mut Vec<u32>, positions: &IndexSet<&[u32]>) {
    let rank = |key: &u32| -> usize {
        let mut path = prefix.clone();
        path.push(*key);
        positions
            .get_index_of(&path.as_slice())
            .unwrap_or(usize::MAX)
    };
    node.children.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));

    for (key, child) in node.children.iter_mut() {
        prefix.push(*key);
        order_children(child, prefix, positions);
        prefix.pop();
    }
}

impl Default for CatalogueTree {
    fn default() -> CatalogueTree {
        CatalogueTree::new()
    }
}

/// The winning row for a given decoded path.
struct Claim<'a> {
    row_ix: usize,
    kind: NodeKind,
    row: &'a CatalogueRow,
}

fn conflict(row_ix: usize, row: &CatalogueRow, message: String) -> HierarchyError {
    HierarchyError::ConflictingRow(RowProblem {
        row: row_ix,
        path: row.path.clone(),
        message,
    })
}

/// Fold the catalogue rows into a tree, keeping only the leaves that match
/// `phrase`.  Root and sub rows are always kept; whether they end up empty is
/// the pruner's business.
///
/// The build happens in two phases so that row order never matters:
/// 1. Every row is decoded and the hierarchy rows are merged by full path.
///    This is where data integrity is checked, independently of the phrase,
///    so a catalogue either always builds or never does.
///    Sibling positions are fixed here too: every path prefix is ranked by
///    the first row that mentions it, leaf or not.
/// 2. The merged rows are inserted with leaf rows filtered by the phrase, and
///    siblings are put back in their phase 1 order.  A filtered-out leaf
///    leaves no trace at all, not even placeholder ancestors, but it still
///    decides where its ancestors sit among their siblings.
pub fn build(rows: &[CatalogueRow], phrase: &Phrase) -> Result<CatalogueTree> {
    let _span = info_span!("build", rows = rows.len()).entered();

    let decoded = rows
        .iter()
        .enumerate()
        .map(|(ix, row)| decode_row_path(ix, &row.path))
        .collect::<Result<Vec<Vec<u32>>>>()?;

    // ## Phase 1: merge by path
    let mut claims: IndexMap<&[u32], Claim> = IndexMap::new();
    let mut auxiliary = 0;
    for (row_ix, (row, path)) in rows.iter().zip(decoded.iter()).enumerate() {
        let kind = match row.node_kind() {
            Some(kind) => kind,
            None => {
                auxiliary += 1;
                continue;
            }
        };

        match claims.get(path.as_slice()) {
            Some(existing) if existing.kind != kind => {
                return Err(conflict(
                    row_ix,
                    row,
                    format!(
                        "path already claimed as {} by row {}, cannot also be {}",
                        existing.kind.name(),
                        existing.row_ix,
                        kind.name()
                    ),
                ));
            }
            Some(existing) => {
                warn!(
                    row = row_ix,
                    path = %row.path,
                    kept = existing.row_ix,
                    "duplicate catalogue row ignored"
                );
            }
            None => {
                claims.insert(path.as_slice(), Claim { row_ix, kind, row });
            }
        }
    }

    for (path, claim) in claims.iter() {
        for depth in 1..path.len() {
            if let Some(ancestor) = claims.get(&path[..depth]) {
                if ancestor.kind.is_leaf() {
                    return Err(conflict(
                        claim.row_ix,
                        claim.row,
                        format!("nested under leaf row {}", ancestor.row_ix),
                    ));
                }
            }
        }
    }

    let mut positions: IndexSet<&[u32]> = IndexSet::new();
    for path in claims.keys() {
        let path: &[u32] = *path;
        for depth in 1..=path.len() {
            positions.insert(&path[..depth]);
        }
    }

    // ## Phase 2: filter leaves and insert
    let mut tree = CatalogueTree::new();
    let mut filtered_out = 0;
    for (path, claim) in claims.iter() {
        if claim.kind.is_leaf() && !phrase.matches(&claim.row.name) {
            filtered_out += 1;
            continue;
        }
        tree.insert(path, claim.row, claim.kind);
    }
    order_children(&mut tree.root, &mut vec![], &positions);

    trace!(
        nodes = claims.len() - filtered_out,
        leaves = tree.leaf_count(),
        filtered_out,
        auxiliary,
        "built catalogue tree"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn everything() -> Phrase {
        Phrase::everything()
    }

    fn child_labels(node: &TreeNode) -> Vec<&str> {
        node.children.values().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_builds_nested_structure() {
        let rows = vec![
            CatalogueRow::new("1.0.0.0", "root", "Population characteristics")
                .with_category_ref("100000"),
            CatalogueRow::new("1.1.0.0", "sub", "Baseline characteristics"),
            CatalogueRow::new("1.1.1.0", "leaf", "Sex")
                .with_field_ref("31")
                .with_instance_ref("0"),
            CatalogueRow::new("1.1.2.0", "leaf", "Year of birth").with_field_ref("34"),
        ];
        let tree = build(&rows, &everything()).unwrap();

        assert_eq!(child_labels(&tree.root), vec!["Population characteristics"]);
        let root_a = tree.get(&[1]).unwrap();
        assert_eq!(root_a.kind, NodeKind::Root);
        assert_eq!(root_a.category_ref.as_deref(), Some("100000"));

        let sex = tree.get(&[1, 1, 1]).unwrap();
        assert!(sex.is_leaf());
        assert_eq!(sex.field_ref.as_deref(), Some("31"));
        assert_eq!(sex.instance_ref.as_deref(), Some("0"));
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_rows_may_arrive_before_their_ancestors() {
        let rows = vec![
            CatalogueRow::new("2.1.1.0", "leaf", "Blood pressure"),
            CatalogueRow::new("1.0.0.0", "root", "A"),
            CatalogueRow::new("2.1.0.0", "sub", "B1"),
            CatalogueRow::new("2.0.0.0", "root", "B"),
        ];
        let tree = build(&rows, &everything()).unwrap();

        // "2" was created first (as a placeholder) so it keeps its spot.
        assert_eq!(child_labels(&tree.root), vec!["B", "A"]);
        let b = tree.get(&[2]).unwrap();
        assert_eq!(b.kind, NodeKind::Root);
        assert_eq!(tree.get(&[2, 1]).unwrap().label, "B1");
        assert_eq!(tree.get(&[2, 1, 1]).unwrap().label, "Blood pressure");
    }

    #[test]
    fn test_filtered_leaves_still_place_their_ancestors() {
        let rows = vec![
            CatalogueRow::new("2.1", "leaf", "Zebra"),
            CatalogueRow::new("1", "root", "A"),
            CatalogueRow::new("1.1", "leaf", "Apple"),
            CatalogueRow::new("2", "root", "B"),
            CatalogueRow::new("2.2", "leaf", "Apricot"),
        ];
        let full = build(&rows, &everything()).unwrap();
        let filtered = build(&rows, &Phrase::parse("ap")).unwrap();

        assert_eq!(child_labels(&full.root), vec!["B", "A"]);
        assert_eq!(child_labels(&filtered.root), vec!["B", "A"]);
        assert_eq!(child_labels(filtered.get(&[2]).unwrap()), vec!["Apricot"]);
    }

    #[test]
    fn test_nested_siblings_keep_first_seen_order() {
        let rows = vec![
            CatalogueRow::new("1.2.1", "leaf", "Hand grip"),
            CatalogueRow::new("1.1.1", "leaf", "Heel bone"),
            CatalogueRow::new("1", "root", "Physical measures"),
            CatalogueRow::new("1.1", "sub", "Bone density"),
            CatalogueRow::new("1.2", "sub", "Grip strength"),
        ];
        let filtered = build(&rows, &Phrase::parse("heel")).unwrap();
        // "Grip strength" is still there (empty) and still first.
        assert_eq!(
            child_labels(filtered.get(&[1]).unwrap()),
            vec!["Grip strength", "Bone density"]
        );
    }

    #[test]
    fn test_missing_ancestor_rows_stay_placeholders() {
        let rows = vec![CatalogueRow::new("5.3.1.0", "leaf", "Orphan")];
        let tree = build(&rows, &everything()).unwrap();

        let placeholder = tree.get(&[5, 3]).unwrap();
        assert_eq!(placeholder.kind, NodeKind::Sub);
        assert_eq!(placeholder.label, "");
        assert_eq!(placeholder.field_ref, None);
    }

    #[test]
    fn test_leaves_are_filtered_by_phrase() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("1.1.0", "sub", "A1"),
            CatalogueRow::new("1.1.1", "leaf", "Date of birth"),
            CatalogueRow::new("1.1.2", "leaf", "Blood pressure"),
        ];
        let tree = build(&rows, &Phrase::parse("blood")).unwrap();

        let a1 = tree.get(&[1, 1]).unwrap();
        assert_eq!(child_labels(a1), vec!["Blood pressure"]);
    }

    #[test]
    fn test_filtered_leaf_creates_no_ancestors() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("2.1.1", "leaf", "Date of birth"),
        ];
        let tree = build(&rows, &Phrase::parse("blood")).unwrap();

        assert_eq!(child_labels(&tree.root), vec!["A"]);
        assert!(tree.get(&[2]).is_none());
    }

    #[test]
    fn test_non_leaf_rows_ignore_the_phrase() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "Nothing to see"),
            CatalogueRow::new("1.1.0", "sub", "Still here"),
        ];
        let tree = build(&rows, &Phrase::parse("zzz")).unwrap();
        assert_eq!(tree.get(&[1, 1]).unwrap().label, "Still here");
    }

    #[test]
    fn test_auxiliary_kinds_are_skipped() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("1.1.0", "relation", "Related thing"),
            CatalogueRow::new("1.2.0", "instance", "Visit 1"),
        ];
        let tree = build(&rows, &everything()).unwrap();
        assert!(tree.get(&[1]).unwrap().children.is_empty());
    }

    #[test]
    fn test_malformed_row_aborts_the_build() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("0.0.0", "relation", "Broken"),
        ];
        match build(&rows, &everything()) {
            Err(HierarchyError::MalformedRow(problem)) => assert_eq!(problem.row, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_kinds_are_reported() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "A"),
            CatalogueRow::new("1.1.0", "sub", "A1"),
            CatalogueRow::new("1.1.0", "leaf", "A1 but a leaf"),
        ];
        match build(&rows, &everything()) {
            Err(HierarchyError::ConflictingRow(problem)) => {
                assert_eq!(problem.row, 2);
                assert_eq!(problem.path, "1.1.0");
            }
            other => panic!("unexpected {:?}", other),
        }

        // The check happens before filtering, so the phrase makes no difference.
        assert!(matches!(
            build(&rows, &Phrase::parse("nomatch")),
            Err(HierarchyError::ConflictingRow(_))
        ));
    }

    #[test]
    fn test_rows_under_a_leaf_are_conflicts() {
        let rows = vec![
            CatalogueRow::new("1.1.0", "leaf", "Sex"),
            CatalogueRow::new("1.1.4", "sub", "Under a leaf"),
        ];
        assert!(matches!(
            build(&rows, &everything()),
            Err(HierarchyError::ConflictingRow(_))
        ));
    }

    #[test]
    fn test_same_kind_duplicate_keeps_first() {
        let rows = vec![
            CatalogueRow::new("1.0.0", "root", "First"),
            CatalogueRow::new("1.0.0.0", "root", "Second"),
        ];
        let tree = build(&rows, &everything()).unwrap();
        assert_eq!(child_labels(&tree.root), vec!["First"]);
    }

    #[test]
    fn test_empty_catalogue_builds_empty_tree() {
        let tree = build(&[], &Phrase::parse("blood")).unwrap();
        assert!(tree.root.children.is_empty());
        assert_eq!(tree.root.kind, NodeKind::Root);
    }
}
