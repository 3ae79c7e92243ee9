use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

use super::encode::EncodedNode;
use crate::file_format::catalogue::CatalogueRow;

/// A selected leaf turned into a dropdown entry for the plotting side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionOption {
    /// The label without its parenthesised qualifiers.
    pub label: String,
    /// The field reference of the leaf, which is what downstream queries use.
    pub value: Option<String>,
    /// The full label, only when `label` had something removed.
    pub title: Option<String>,
}

impl SelectionOption {
    pub fn from_node(node: &EncodedNode) -> SelectionOption {
        lazy_static! {
            static ref RE_QUALIFIER: Regex = Regex::new(r"\([^)]*\)").unwrap();
        }

        let short = RE_QUALIFIER
            .replace_all(&node.label, "")
            .split_whitespace()
            .join(" ");
        let title = if short != node.label {
            Some(node.label.clone())
        } else {
            None
        };

        SelectionOption {
            label: short,
            value: node.field_ref.clone(),
            title,
        }
    }
}

/// Leaves flagged `is_selected`, in depth-first order.
pub fn selected_leaves(nodes: &[EncodedNode]) -> Vec<&EncodedNode> {
    let mut selected = vec![];
    for node in nodes {
        node.walk(&mut |n| {
            if n.is_leaf() && n.is_selected {
                selected.push(n);
            }
        });
    }
    selected
}

pub fn selection_options(nodes: &[EncodedNode]) -> Vec<SelectionOption> {
    selected_leaves(nodes)
        .into_iter()
        .map(SelectionOption::from_node)
        .collect()
}

/// A field the warehouse can be asked about, with the instance it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInstance {
    pub field_ref: String,
    pub name: String,
    pub instance_ref: Option<String>,
}

/// Rows that name a field of their own, as opposed to rows that merely point
/// at a related field.
pub fn field_instances(rows: &[CatalogueRow]) -> Vec<FieldInstance> {
    rows.iter()
        .filter(|row| row.related_field_ref.is_none())
        .filter_map(|row| {
            row.field_ref.as_ref().map(|field_ref| FieldInstance {
                field_ref: field_ref.clone(),
                name: row.name.clone(),
                instance_ref: row.instance_ref.clone(),
            })
        })
        .collect()
}
