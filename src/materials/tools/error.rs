use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool retrieves, normalizes, or renders material data.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Raised when a required setting such as the API key is absent.
    #[error("{0}")]
    Configuration(String),

    /// Raised when the remote service call fails or answers with garbage.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// Raised when the service answered successfully but matched nothing.
    #[error("No materials found matching criteria")]
    EmptyResult,

    /// Raised when a raw document refers back to one of its own ancestors.
    #[error("cyclic structure at {path}")]
    CyclicStructure { path: String },

    /// Raised when a raw document nests deeper than the normalizer allows.
    #[error("structure nested deeper than {limit} levels at {path}")]
    DepthExceeded { limit: usize, path: String },

    /// Raised when a raw node cannot be expressed as a JSON-safe value.
    #[error("unrepresentable value at {path}: {reason}")]
    Unrepresentable { path: String, reason: String },

    /// Raised when a sink cannot produce its artifact.
    #[error("render error: {0}")]
    Render(String),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a use case is invoked with arguments it cannot work with.
    #[error("{0}")]
    Usage(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Short category name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Configuration(_) => "configuration",
            ToolError::Retrieval(_) => "retrieval",
            ToolError::EmptyResult => "empty_result",
            ToolError::CyclicStructure { .. }
            | ToolError::DepthExceeded { .. }
            | ToolError::Unrepresentable { .. } => "normalization",
            ToolError::Render(_) | ToolError::ExcelWrite(_) | ToolError::Io(_) => "render",
            ToolError::Json(_) => "json",
            ToolError::Usage(_) => "usage",
            ToolError::Logging(_) => "logging",
        }
    }
}
