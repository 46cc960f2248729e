//! Error types for the structuring library.
//!
//! Only configuration errors are fatal. Geometry and merge anomalies are
//! resolved locally by the stage that meets them and are reported through
//! `log`, never through this type.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while structuring a document.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Chunking options rejected at configuration time.
    #[error("Invalid chunking configuration: {0}")]
    InvalidChunkingConfig(String),

    /// Any other stage configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Degenerate or self-intersecting geometry.
    ///
    /// Returned by the geometry validators only; pipeline stages turn it into
    /// their documented fallback.
    #[error("Malformed geometry: {reason}")]
    MalformedGeometry {
        /// Why the geometry was rejected
        reason: String,
    },

    /// Element violates a construction rule (e.g. HTML on a non-table).
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No extraction strategy is viable for the document.
    #[error("No viable extraction strategy: {0}")]
    StrategyUnavailable(String),
}

impl Error {
    /// Shorthand for a [`Error::MalformedGeometry`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedGeometry {
            reason: reason.into(),
        }
    }

    /// Whether this error must abort processing immediately.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MalformedGeometry { .. })
    }
}
