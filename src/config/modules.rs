//! Module source configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the loader discovers module directories.
#[derive(Debug, Clone, Deserialize)]
pub struct ModulesConfig {
    /// Root directory containing one subdirectory per module
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl ModulesConfig {
    /// Validate module source configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.root.as_os_str().is_empty() {
            return Err(ValidationError::EmptyModuleRoot);
        }
        Ok(())
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("modules")
}
