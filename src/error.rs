//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the CLI
//! uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum aggregating every subsystem
//! - Module-specific errors (e.g. [`CatalogError`]) for detailed handling
//!
//! Per-track failures never reach this type; they are folded into an
//! [`Outcome`](crate::model::Outcome) by the acquisition engine.

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::package::PackageError;
use crate::reference::ReferenceError;
use crate::resolver::ExpansionError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unusable input
    #[error("Invalid input: {0}")]
    Reference(#[from] ReferenceError),

    /// Catalog request failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A reference could not be expanded
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),

    /// Packaging the batch failed
    #[error("Packaging error: {0}")]
    Package(#[from] PackageError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(ctx))
    }
}
