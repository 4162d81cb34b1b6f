//! Host extraction from HTTP request headers.

use axum::http::{HeaderMap, header};

/// Extracts the lowercase host name from the `Host` header.
///
/// Ports are stripped; IPv6 literals keep their brackets (`[::1]`) to match
/// what [`url::Url::host_str`] returns for the same address. Returns `None`
/// when the header is missing, empty, or not valid UTF-8: callers treat an
/// unknown host as "not this site".
pub fn request_host(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?.trim();

    let host = if host.starts_with('[') {
        match host.find(']') {
            Some(end_bracket) => &host[..=end_bracket],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };

    if host.is_empty() {
        return None;
    }

    Some(host.to_ascii_lowercase())
}
