pub mod catalogue;
pub mod field_identifier;
pub mod view_state;
