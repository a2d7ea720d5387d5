//! Configuration loading for the academic engine.
//!
//! This module loads the institution catalog from YAML files: institution
//! metadata, the allowed exam durations, and the subject list.
//!
//! # Example
//!
//! ```no_run
//! use academic_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sample").unwrap();
//! println!("Loaded institution: {}", config.institution().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CatalogConfig, InstitutionMetadata, SubjectsConfig};
