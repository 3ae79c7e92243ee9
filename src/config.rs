use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::value::{Table, Value};

use crate::errors::Result;
use crate::hierarchy::HierarchyEngine;

lazy_static! {
    static ref HIERARCHY_CORE: Table = toml::from_str(include_str!("hierarchy_core.toml")).unwrap();
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Search box text that means "no search yet".
    pub placeholder: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Socket address for `hierarchy-server`.
    pub listen: String,
    /// Catalogue rows to serve; JSON array or `.jsonl`.
    pub catalogue: Option<PathBuf>,
}

/// Overlay `overlay` onto `base`, recursing into tables so a partial config
/// file only replaces the keys it actually mentions.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let value = match (base.get_mut(&key), value) {
            (Some(Value::Table(base_sub)), Value::Table(overlay_sub)) => {
                merge_tables(base_sub, overlay_sub);
                continue;
            }
            (_, value) => value,
        };
        base.insert(key, value);
    }
}

impl Config {
    /// The embedded defaults from `hierarchy_core.toml`.
    pub fn defaults() -> Result<Config> {
        Ok(Value::Table(HIERARCHY_CORE.clone()).try_into()?)
    }

    pub fn from_toml_str(overrides: &str) -> Result<Config> {
        let mut merged = HIERARCHY_CORE.clone();
        merge_tables(&mut merged, toml::from_str(overrides)?);
        Ok(Value::Table(merged).try_into()?)
    }

    /// Load `path` over the defaults, or just the defaults if there's no path.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Config::from_toml_str(&read_to_string(path)?)
            }
            None => Config::defaults(),
        }
    }

    pub fn engine(&self) -> HierarchyEngine {
        HierarchyEngine::with_placeholder(&self.search.placeholder)
    }
}
