pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliCommand, CliConfig};

pub use crate::config::{toml_config::TomlConfig, AirtableSettings, Overrides};
pub use crate::core::{client::AirtableClient, session::DebugSession};
pub use crate::utils::error::{AirtableError, Result};
