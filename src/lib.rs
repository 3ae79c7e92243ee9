extern crate indexmap;
extern crate itertools;
#[macro_use]
extern crate lazy_static;
extern crate regex;
extern crate serde;
extern crate serde_json;
extern crate toml;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

pub mod config;
pub mod errors;
pub mod file_format;
pub mod hierarchy;
pub mod logging;
pub mod server;

pub use errors::{HierarchyError, Result};
pub use file_format::catalogue::{CatalogueRow, NodeKind};
pub use file_format::view_state::ViewState;
pub use hierarchy::{filtered_tree, full_tree, HierarchyEngine, HierarchyView};
