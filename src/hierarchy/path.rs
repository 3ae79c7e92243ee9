use crate::errors::{HierarchyError, Result, RowProblem};

/// Decode a catalogue path like `"1.2.3.0.0.0.0.0"` into its segment keys,
/// dropping the trailing zeros that pad every path to the full depth.
///
/// Interior zeros are kept; only a zero *suffix* means "not applicable at this
/// level".  The error string explains the problem; the builder wraps it with
/// the row position.
pub fn decode_path(raw: &str) -> std::result::Result<Vec<u32>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("path is empty".to_string());
    }

    let mut keys = Vec::new();
    for segment in raw.split('.') {
        let segment = segment.trim();
        match segment.parse::<u32>() {
            Ok(key) => keys.push(key),
            Err(_) => return Err(format!("segment {:?} is not a non-negative integer", segment)),
        }
    }

    while keys.last() == Some(&0) {
        keys.pop();
    }

    if keys.is_empty() {
        return Err("path has no non-zero segments".to_string());
    }
    Ok(keys)
}

/// `decode_path` for the row at position `row`, failing with `MalformedRow`.
pub fn decode_row_path(row: usize, raw: &str) -> Result<Vec<u32>> {
    decode_path(raw).map_err(|message| {
        HierarchyError::MalformedRow(RowProblem {
            row,
            path: raw.to_string(),
            message,
        })
    })
}
