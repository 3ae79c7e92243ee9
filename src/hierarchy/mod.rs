/*!
The catalogue hierarchy engine.

A catalogue is a flat table of rows whose dot-encoded paths describe a tree of
category groups ("root" and "sub" rows) with selectable fields ("leaf" rows)
hanging off them.  Every request runs the same pipeline:

1. `builder::build` decodes the paths and folds the rows into a tree, keeping
   only the leaves that match the search phrase.
2. `encode::encode` reshapes that tree into what the tree widget consumes.
3. `assign::assign` numbers the nodes depth-first and merges the widget's
   expand/collapse state from the previous response.
4. `prune::prune_tree` drops the groups that filtering left empty.

The engine keeps no state between calls.  The caller owns the rows snapshot
and the view-state, passes both in, and gets the updated view-state back with
the tree, so concurrent calls never need to coordinate.
*/

pub mod assign;
pub mod builder;
pub mod encode;
pub mod path;
pub mod phrase;
pub mod prune;
pub mod selection;

use serde::{Deserialize, Serialize};

use self::encode::EncodedNode;
use self::phrase::{Phrase, DEFAULT_PLACEHOLDER};
use crate::errors::Result;
use crate::file_format::catalogue::CatalogueRow;
use crate::file_format::view_state::ViewState;

/// What both engine operations hand back: the top-level encoded nodes and the
/// view-state to persist for the next call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyView {
    pub tree: Vec<EncodedNode>,
    pub view_state: ViewState,
}

#[derive(Clone, Debug)]
pub struct HierarchyEngine {
    placeholder: String,
}

impl Default for HierarchyEngine {
    fn default() -> HierarchyEngine {
        HierarchyEngine::with_placeholder(DEFAULT_PLACEHOLDER)
    }
}

impl HierarchyEngine {
    /// `placeholder` is the search box text that means "nothing typed yet".
    pub fn with_placeholder(placeholder: &str) -> HierarchyEngine {
        HierarchyEngine {
            placeholder: placeholder.to_string(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn phrase(&self, raw: &str) -> Phrase {
        Phrase::with_placeholder(raw, &self.placeholder)
    }

    fn run(&self, rows: &[CatalogueRow], phrase: &Phrase, previous: &ViewState) -> Result<HierarchyView> {
        let built = builder::build(rows, phrase)?;
        let mut encoded = encode::encode(&built);
        let view_state = assign::assign(&mut encoded, previous);
        prune::prune_tree(&mut encoded);

        Ok(HierarchyView {
            tree: encoded.nodes,
            view_state,
        })
    }

    /// The whole catalogue with a fresh, all-collapsed view-state.
    pub fn full_tree(&self, rows: &[CatalogueRow]) -> Result<HierarchyView> {
        let _span = info_span!("full_tree", rows = rows.len()).entered();
        self.run(rows, &Phrase::everything(), &ViewState::new())
    }

    /// The catalogue restricted to leaves matching `phrase` (plus the groups
    /// leading to them), with `previous` merged in.
    pub fn filtered_tree(
        &self,
        rows: &[CatalogueRow],
        phrase: &str,
        previous: &ViewState,
    ) -> Result<HierarchyView> {
        let _span = info_span!("filtered_tree", rows = rows.len(), phrase).entered();
        self.run(rows, &self.phrase(phrase), previous)
    }
}

/// `HierarchyEngine::full_tree` with the default placeholder.
pub fn full_tree(rows: &[CatalogueRow]) -> Result<HierarchyView> {
    HierarchyEngine::default().full_tree(rows)
}

/// `HierarchyEngine::filtered_tree` with the default placeholder.
pub fn filtered_tree(rows: &[CatalogueRow], phrase: &str, previous: &ViewState) -> Result<HierarchyView> {
    HierarchyEngine::default().filtered_tree(rows, phrase, previous)
}
