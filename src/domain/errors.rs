//! Error types for module loading and heartbeat providers.
//!
//! Load-time errors are unrecoverable by design: modules are first-party,
//! deterministic configuration, so a broken one should abort startup rather
//! than degrade silently in production. Steady-state provider errors are
//! isolated to the current tick and never terminate the process.

use std::path::PathBuf;

use thiserror::Error;

use super::descriptor::HttpVerb;

/// Fatal errors raised while discovering and registering modules.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module '{module}' has no descriptor file at {path}")]
    DescriptorMissing { module: String, path: PathBuf },

    #[error("module '{module}' has an invalid descriptor: {source}")]
    DescriptorParse {
        module: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("module name '{name}' is declared by more than one module directory")]
    DuplicateModule { name: String },

    #[error("module '{module}' specified invalid handler for route {method} {path}")]
    InvalidHandler {
        module: String,
        method: HttpVerb,
        path: String,
    },

    #[error("module '{module}' failed to instantiate: {reason}")]
    Factory { module: String, reason: String },

    #[error("failed to read module source at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Creates an invalid-handler error naming the offending route.
    pub fn invalid_handler(
        module: impl Into<String>,
        method: HttpVerb,
        path: impl Into<String>,
    ) -> Self {
        LoadError::InvalidHandler {
            module: module.into(),
            method,
            path: path.into(),
        }
    }

    /// Creates a factory error naming the module that failed to build.
    pub fn factory(module: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Factory {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Creates an I/O error tagged with the path that failed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A heartbeat provider failed during a tick.
///
/// Aborts that tick's broadcast for all clients; the scheduler logs it with
/// the owning module and keeps running.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
