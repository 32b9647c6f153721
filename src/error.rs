use thiserror::Error;

/// Boxed error raised by an injected backend (store or cache).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.ttl", "keys[3]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., cache key, payload length)
    pub details: Option<String>,
    /// Source of the error (e.g., "cache_reader", "json_codec")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the read-through orchestrator.
///
/// Only [`Error::Store`] ever escapes a load call; every other category is
/// logged and absorbed by the stage that produced it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Store lookup failed: {message}{}", format_context(.context))]
    Store {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Cache backend error: {message}{}", format_context(.context))]
    Cache {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Codec error: {message}{}", format_context(.context))]
    Codec {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Wrap a failure raised by the authoritative store.
    pub fn store(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Error::Store {
            message: source.to_string(),
            context: ErrorContext::new(),
            source: Some(source),
        }
    }

    /// Create a new store error with structured context
    pub fn store_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Store {
            message: msg.into(),
            context,
            source: None,
        }
    }

    /// Wrap a failure raised by the cache backend.
    pub fn cache(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Error::Cache {
            message: source.to_string(),
            context: ErrorContext::new(),
            source: Some(source),
        }
    }

    /// Create a new cache error with structured context
    pub fn cache_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Cache {
            message: msg.into(),
            context,
            source: None,
        }
    }

    /// Create a new codec error with structured context
    pub fn codec_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Codec {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Store { context, .. }
            | Error::Cache { context, .. }
            | Error::Codec { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            Error::Serialization(_) => None,
        }
    }

    /// Whether this error came from the authoritative store.
    pub fn is_store(&self) -> bool {
        matches!(self, Error::Store { .. })
    }
}
