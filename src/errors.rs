use std::fmt;

pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Which catalogue row went wrong and how.  Row indices are 0-based positions
/// in the slice handed to the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct RowProblem {
    pub row: usize,
    /// The raw, undecoded path string of the offending row.
    pub path: String,
    pub message: String,
}

/// Express whether a load failure came from reading bytes or from making
/// sense of them.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorLayer {
    /// The file could not be opened or read.
    IoLayer,
    /// The bytes were read but are not valid JSON / TOML for what we expected.
    DataLayer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorDetails {
    pub layer: ErrorLayer,
    /// Stringified version of the lower level error.
    pub message: String,
}

/// Everything that can stop a hierarchy build or the plumbing around it.
///
/// Build errors are all-or-nothing: if a `MalformedRow` or `ConflictingRow`
/// is returned, no tree was produced.  Rows whose kind we don't recognize are
/// not an error at all; the builder just skips them.
#[derive(Clone, Debug, PartialEq)]
pub enum HierarchyError {
    /// A row's path didn't decode to a non-empty list of segment keys.
    MalformedRow(RowProblem),
    /// Two rows make incompatible claims about the same path, or a row is
    /// nested under a leaf.
    ConflictingRow(RowProblem),
    /// A field identifier like `31-0.0` couldn't be parsed.
    MalformedIdentifier(String),
    /// Reading catalogue rows, view-state or configuration failed.
    LoadProblem(ErrorDetails),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyError::MalformedRow(p) => write!(
                f,
                "malformed row {} (path {:?}): {}",
                p.row, p.path, p.message
            ),
            HierarchyError::ConflictingRow(p) => write!(
                f,
                "conflicting row {} (path {:?}): {}",
                p.row, p.path, p.message
            ),
            HierarchyError::MalformedIdentifier(raw) => {
                write!(f, "malformed field identifier {:?}", raw)
            }
            HierarchyError::LoadProblem(details) => {
                write!(f, "load problem ({:?}): {}", details.layer, details.message)
            }
        }
    }
}

impl std::error::Error for HierarchyError {}

impl From<std::io::Error> for HierarchyError {
    fn from(err: std::io::Error) -> HierarchyError {
        HierarchyError::LoadProblem(ErrorDetails {
            layer: ErrorLayer::IoLayer,
            message: err.to_string(),
        })
    }
}

// JSON parse errors are data problems.
impl From<serde_json::Error> for HierarchyError {
    fn from(err: serde_json::Error) -> HierarchyError {
        HierarchyError::LoadProblem(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: err.to_string(),
        })
    }
}

impl From<toml::de::Error> for HierarchyError {
    fn from(err: toml::de::Error) -> HierarchyError {
        HierarchyError::LoadProblem(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: err.to_string(),
        })
    }
}
