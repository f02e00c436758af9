//! Request adapters: correlation headers to [`CorrelationContext`]

use hyper::HeaderMap;
use tracing::trace;
use turul_callback_protocol::CorrelationContext;

/// Read the eight correlation headers.
///
/// Header names are case-insensitive. Absent or non-ASCII values become empty
/// strings and are reported by validation.
pub fn extract_correlation_context(headers: &HeaderMap) -> CorrelationContext {
    let ctx = CorrelationContext::from_lookup(|name| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });

    trace!(?ctx, "Extracted correlation headers");
    ctx
}
