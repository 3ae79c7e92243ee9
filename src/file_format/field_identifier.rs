use std::fmt;
use std::str::FromStr;

use crate::errors::{HierarchyError, Result};

/// A field reference as the catalogue writes it: `field-instance.part`, where
/// the instance and part are optional and default to `0`.
///
/// The warehouse names its columns `_field_instance_part`, so this is the
/// bridge between a selected leaf and the column(s) to ask for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldIdentifier {
    pub field: String,
    pub instance: String,
    pub part: String,
}

impl FieldIdentifier {
    pub fn parse(raw: &str) -> Result<FieldIdentifier> {
        let pieces: Vec<&str> = raw.trim().split(|c| c == '-' || c == '.').collect();
        if pieces.len() > 3 || pieces.iter().any(|p| p.is_empty()) {
            return Err(HierarchyError::MalformedIdentifier(raw.to_string()));
        }

        let piece = |ix: usize| pieces.get(ix).map_or("0", |p| *p).to_string();
        Ok(FieldIdentifier {
            field: piece(0),
            instance: piece(1),
            part: piece(2),
        })
    }

    /// Column name in the warehouse, ex: `_31_0_0`.
    pub fn db_column(&self) -> String {
        format!("_{}_{}_{}", self.field, self.instance, self.part)
    }
}

impl FromStr for FieldIdentifier {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<FieldIdentifier> {
        FieldIdentifier::parse(s)
    }
}

impl fmt::Display for FieldIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.field, self.instance, self.part)
    }
}
