use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::from_reader;

use crate::errors::Result;

/// The kinds of catalogue rows that take part in the navigable hierarchy.
///
/// Catalogue tables also carry auxiliary rows (relations, instances, ...) with
/// other kind strings; those have no `NodeKind` and the builder skips them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Sub,
    Leaf,
}

impl NodeKind {
    pub fn from_row_kind(kind: &str) -> Option<NodeKind> {
        match kind.trim() {
            "root" => Some(NodeKind::Root),
            "sub" => Some(NodeKind::Sub),
            "leaf" => Some(NodeKind::Leaf),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Sub => "sub",
            NodeKind::Leaf => "leaf",
        }
    }

    pub fn is_leaf(&self) -> bool {
        *self == NodeKind::Leaf
    }
}

/// One record of the flat catalogue table.
///
/// The JSON keys are camelCase, but the column names of the CSV export the
/// catalogue originates from (`NodeID`, `NodeType`, ...) are accepted too so
/// that a straight CSV-to-JSON conversion can be fed in unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueRow {
    /// Dot-separated segment keys padded with trailing zeros, ex:
    /// `"1.2.3.0.0.0.0.0"`.
    #[serde(alias = "NodeID")]
    pub path: String,
    /// Raw kind string; see `node_kind()`.
    #[serde(alias = "NodeType")]
    pub kind: String,
    #[serde(alias = "NodeName")]
    pub name: String,
    #[serde(
        default,
        alias = "CategoryID",
        alias = "CategroyID",
        deserialize_with = "deserialize_opaque_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_ref: Option<String>,
    #[serde(
        default,
        alias = "FieldID",
        deserialize_with = "deserialize_opaque_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_ref: Option<String>,
    #[serde(
        default,
        alias = "InstanceID",
        deserialize_with = "deserialize_opaque_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_ref: Option<String>,
    #[serde(
        default,
        alias = "RelatedFieldID",
        deserialize_with = "deserialize_opaque_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_field_ref: Option<String>,
}

impl CatalogueRow {
    pub fn new(path: &str, kind: &str, name: &str) -> CatalogueRow {
        CatalogueRow {
            path: path.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            ..CatalogueRow::default()
        }
    }

    pub fn with_field_ref(mut self, field_ref: &str) -> CatalogueRow {
        self.field_ref = Some(field_ref.to_string());
        self
    }

    pub fn with_instance_ref(mut self, instance_ref: &str) -> CatalogueRow {
        self.instance_ref = Some(instance_ref.to_string());
        self
    }

    pub fn with_category_ref(mut self, category_ref: &str) -> CatalogueRow {
        self.category_ref = Some(category_ref.to_string());
        self
    }

    pub fn with_related_field_ref(mut self, related_field_ref: &str) -> CatalogueRow {
        self.related_field_ref = Some(related_field_ref.to_string());
        self
    }

    /// `None` for auxiliary rows that aren't part of the hierarchy.
    pub fn node_kind(&self) -> Option<NodeKind> {
        NodeKind::from_row_kind(&self.kind)
    }
}

/// Refs show up as strings in hand-written JSON but as numbers (frequently
/// floats, thanks to missing values in the source table) in converted exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum OpaqueRef {
    Text(String),
    Integer(u64),
    Float(f64),
}

fn deserialize_opaque_ref<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<OpaqueRef> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|r| match r {
        OpaqueRef::Text(s) if s.trim().is_empty() => None,
        OpaqueRef::Text(s) => Some(s),
        OpaqueRef::Integer(n) => Some(n.to_string()),
        OpaqueRef::Float(f) if f.is_nan() => None,
        // Past 2^63 the cast would saturate; `Display` has no exponent either.
        OpaqueRef::Float(f) if f.fract() == 0.0 && f.abs() < 2f64.powi(63) => {
            Some(format!("{}", f as i64))
        }
        OpaqueRef::Float(f) => Some(f.to_string()),
    }))
}

/// Load already-materialized catalogue rows from disk.  Files ending in
/// `.jsonl` are read as one JSON row per line; anything else must hold a single
/// JSON array of rows.
pub fn load_catalogue(path: &Path) -> Result<Vec<CatalogueRow>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let rows: Vec<CatalogueRow> = if path.extension().map_or(false, |ext| ext == "jsonl") {
        let mut rows = vec![];
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        rows
    } else {
        from_reader(reader)?
    };

    info!(path = %path.display(), rows = rows.len(), "loaded catalogue");
    Ok(rows)
}
