use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::iter::FromIterator;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::from_reader;

use crate::errors::Result;

/// The tree widget's expand/collapse ("clopen") flag per node identifier.
///
/// Keys are the string form of the ordinal identifiers handed out by the
/// assigner.  The value is owned by the caller: the engine receives it by
/// reference, copies it, and hands the updated copy back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewState {
    entries: BTreeMap<String, bool>,
}

impl ViewState {
    pub fn new() -> ViewState {
        ViewState::default()
    }

    pub fn get(&self, id: u32) -> Option<bool> {
        self.entries.get(&id.to_string()).copied()
    }

    pub fn set(&mut self, id: u32, expanded: bool) {
        self.entries.insert(id.to_string(), expanded);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<'a> FromIterator<(&'a str, bool)> for ViewState {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> ViewState {
        ViewState {
            entries: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

pub fn load_view_state(path: &Path) -> Result<ViewState> {
    let file = File::open(path)?;
    Ok(from_reader(BufReader::new(file))?)
}
