#![allow(dead_code)]

use std::{
    env, fs,
    ops::Deref,
    path::{Path, PathBuf},
};

use catalogue_tools::CatalogueRow;

/// Scratch directory under the system temp dir, removed on drop.  Each test
/// should use its own name since tests run in parallel.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = env::temp_dir()
            .join(format!("catalogue-tools-{}", std::process::id()))
            .join(path);
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }
}

impl Deref for TempDir {
    type Target = PathBuf;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Two top-level groups, three leaves:
///
/// ```text
/// root A          (1)
///   sub A1        (1.1)
///     Date of birth  (1.1.1)
///     Sex            (1.1.2)
/// root B          (2)
///   sub B1        (2.1)
///     Blood pressure (2.1.1)
/// ```
pub fn two_branch_catalogue() -> Vec<CatalogueRow> {
    vec![
        CatalogueRow::new("1.0.0.0.0.0.0.0", "root", "root A").with_category_ref("100"),
        CatalogueRow::new("1.1.0.0.0.0.0.0", "sub", "sub A1").with_category_ref("110"),
        CatalogueRow::new("1.1.1.0.0.0.0.0", "leaf", "Date of birth")
            .with_field_ref("33")
            .with_instance_ref("0"),
        CatalogueRow::new("1.1.2.0.0.0.0.0", "leaf", "Sex")
            .with_field_ref("31")
            .with_instance_ref("0"),
        CatalogueRow::new("2.0.0.0.0.0.0.0", "root", "root B"),
        CatalogueRow::new("2.1.0.0.0.0.0.0", "sub", "sub B1"),
        CatalogueRow::new("2.1.1.0.0.0.0.0", "leaf", "Blood pressure").with_field_ref("4080"),
    ]
}
