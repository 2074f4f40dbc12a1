//! Document loading: format detection, parsing and validation
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::{LoaderError, LoaderResult};
pub use parser::{DocumentParser, Format};

use crate::model::MappingConfig;
use std::path::Path;

/// Load and validate a single configuration file
pub fn load_config_file(path: &Path) -> LoaderResult<MappingConfig> {
    DocumentParser::new().load_config(path)
}
