//! Request handlers

mod book;
mod probes;

pub use book::*;
pub use probes::*;

use axum::http::HeaderMap;
use ferrea_core::CORRELATION_HEADER;
use serde::Serialize;

/// Error body returned for lookups that found nothing
#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: &'static str,
}

/// Correlation ID attached to the request by the request-id layer
///
/// Non-UTF-8 bytes are replaced rather than dropped, so the logged ID still
/// matches the one echoed back to the client.
fn correlation_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CORRELATION_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_correlation_id_keeps_non_utf8_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CORRELATION_HEADER,
            HeaderValue::from_bytes(b"caf\xe9-1").unwrap(),
        );
        assert_eq!(correlation_id(&headers).as_deref(), Some("caf\u{FFFD}-1"));
    }

    #[test]
    fn test_correlation_id_missing() {
        assert_eq!(correlation_id(&HeaderMap::new()), None);
    }
}
