pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_items, parse_items};
pub use toml_loader::{load_settings, parse_settings};
