// src/config/mod.rs

//! Configuration: TOML model, loading, validation and command selection.

pub mod loader;
pub mod model;
pub mod select;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_path, parse_config, DEFAULT_CONFIG_FILE,
};
pub use model::{CommandConfig, ConfigFile, ConfigSection, RawConfigFile};
pub use select::select_commands;
