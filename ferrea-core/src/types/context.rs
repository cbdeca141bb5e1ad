//! Per-request context carried through lookups for log correlation

use uuid::Uuid;

/// Name of the header carrying the correlation ID
pub const CORRELATION_HEADER: &str = "x-ferrea-correlation-id";

/// Identifies a single inbound request in every log line it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: String,
    pub app_name: String,
}

impl RequestContext {
    pub fn new(correlation_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            app_name: app_name.into(),
        }
    }

    /// Create a context with a freshly generated correlation ID
    pub fn generate(app_name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), app_name)
    }

    /// Use the given correlation ID when present and non-blank, otherwise generate one
    pub fn from_header(value: Option<&str>, app_name: impl Into<String>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(id) => Self::new(id, app_name),
            None => Self::generate(app_name),
        }
    }
}
