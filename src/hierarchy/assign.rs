use super::encode::{EncodedNode, EncodedTree};
use crate::file_format::view_state::ViewState;

fn assign_node(node: &mut EncodedNode, next_id: &mut u32, previous: &ViewState, merged: &mut ViewState) {
    let id = *next_id;
    *next_id += 1;
    node.id = id;

    match previous.get(id) {
        Some(expanded) => {
            node.is_expanded = expanded;
            // The widget reports a checked leaf through the same flag.
            node.is_selected = expanded && node.is_leaf();
        }
        None => {
            node.is_expanded = false;
            node.is_selected = false;
            merged.set(id, false);
        }
    }

    if let Some(children) = node.children.as_mut() {
        for child in children.iter_mut() {
            assign_node(child, next_id, previous, merged);
        }
    }
}

/// Number every node depth-first (pre-order, starting at 0, the synthetic
/// root excluded) and merge in the previous expand/collapse state.
///
/// The returned map is `previous` plus a `false` entry for every identifier
/// that `previous` didn't know about.  Nothing is ever dropped from it.
///
/// Identifiers enumerate *this* build.  When the phrase changes the set of
/// surviving leaves changes, and identifier `N` can land on a different
/// logical node than it did last time; the widget state follows the number,
/// not the node.
pub fn assign(tree: &mut EncodedTree, previous: &ViewState) -> ViewState {
    let mut merged = previous.clone();
    let mut next_id = 0;
    for node in tree.nodes.iter_mut() {
        assign_node(node, &mut next_id, previous, &mut merged);
    }
    trace!(assigned = next_id, carried = previous.len(), "assigned identifiers");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::catalogue::CatalogueRow;
    use crate::hierarchy::{builder::build, encode::encode, phrase::Phrase};

    fn sample() -> EncodedTree {
        let rows = vec![
            CatalogueRow::new("1.0", "root", "A"),
            CatalogueRow::new("1.1", "leaf", "A.1"),
            CatalogueRow::new("2.0", "root", "B"),
            CatalogueRow::new("2.1", "sub", "B.1"),
            CatalogueRow::new("2.1.1", "leaf", "B.1.1"),
        ];
        encode(&build(&rows, &Phrase::everything()).unwrap())
    }

    fn ids_and_labels(tree: &EncodedTree) -> Vec<(u32, String)> {
        let mut out = vec![];
        tree.walk(&mut |node| out.push((node.id, node.label.clone())));
        out
    }

    #[test]
    fn test_pre_order_numbering_from_zero() {
        let mut tree = sample();
        let vs = assign(&mut tree, &ViewState::new());
        assert_eq!(
            ids_and_labels(&tree),
            vec![
                (0, "A".to_string()),
                (1, "A.1".to_string()),
                (2, "B".to_string()),
                (3, "B.1".to_string()),
                (4, "B.1.1".to_string()),
            ]
        );
        assert_eq!(vs.len(), 5);
        assert!(vs.iter().all(|(_, expanded)| !expanded));
    }

    #[test]
    fn test_previous_state_is_applied_and_kept() {
        let mut tree = sample();
        let previous: ViewState = vec![("2", true), ("3", false), ("99", true)]
            .into_iter()
            .collect();
        let vs = assign(&mut tree, &previous);

        assert!(tree.nodes[1].is_expanded);
        assert!(!tree.nodes[1].is_selected, "non-leaves are never selected");
        assert!(!tree.nodes[0].is_expanded);
        // Entries for identifiers absent from this build survive.
        assert_eq!(vs.get(99), Some(true));
        assert_eq!(vs.get(2), Some(true));
        assert_eq!(vs.get(4), Some(false));
        assert_eq!(vs.len(), 6);
    }

    #[test]
    fn test_true_on_a_leaf_marks_it_selected() {
        let mut tree = sample();
        let previous: ViewState = vec![("1", true)].into_iter().collect();
        assign(&mut tree, &previous);
        let leaf = &tree.nodes[0].children()[0];
        assert!(leaf.is_selected);
        assert!(leaf.is_expanded);
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let previous: ViewState = vec![("0", true)].into_iter().collect();
        let mut first = sample();
        let mut second = sample();
        let vs1 = assign(&mut first, &previous);
        let vs2 = assign(&mut second, &previous);
        assert_eq!(first, second);
        assert_eq!(vs1, vs2);

        // Re-running over an already-numbered tree changes nothing either.
        let vs3 = assign(&mut first, &vs1);
        assert_eq!(first, second);
        assert_eq!(vs3, vs1);
    }
}
