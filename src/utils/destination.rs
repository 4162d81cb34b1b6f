//! Redirect destination parsing.
//!
//! A destination is either a site-relative path or an absolute HTTP(S) URL.
//! Absolute URLs are canonicalized (lowercase host, no default port, no
//! fragment) so that equality checks against the request are meaningful.

use url::Url;

use crate::utils::path::{normalize_path, same_target};

/// Errors that can occur while parsing a destination.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DestinationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// A parsed redirect destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Path on the same site, always with a leading slash.
    Path(String),
    /// Absolute `http` or `https` URL.
    Url(Url),
}

impl Destination {
    /// Parses a stored or user-supplied destination.
    ///
    /// Anything with a `scheme://` prefix is parsed as a URL and must be HTTP
    /// or HTTPS; everything else is treated as a path and normalized with
    /// [`normalize_path`]. Protocol-relative input (`//host/path`) is treated
    /// as a path, which collapses it to `/host/path` and keeps the redirect on
    /// the same site.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::InvalidFormat`] for malformed URLs and
    /// [`DestinationError::UnsupportedProtocol`] for non-HTTP(S) schemes such as
    /// `javascript:` or `data:`.
    pub fn parse(input: &str) -> Result<Self, DestinationError> {
        let input = input.trim();

        if !looks_absolute(input) {
            return Ok(Self::Path(normalize_path(input)));
        }

        let mut url =
            Url::parse(input).map_err(|e| DestinationError::InvalidFormat(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(DestinationError::UnsupportedProtocol),
        }

        if let Some(host) = url.host_str() {
            let host_lowercase = host.to_ascii_lowercase();
            url.set_host(Some(&host_lowercase)).map_err(|_| {
                DestinationError::NormalizationFailed("Failed to set normalized host".to_string())
            })?;
        }

        url.set_fragment(None);

        let is_default_port = matches!(
            (url.scheme(), url.port()),
            ("http", Some(80)) | ("https", Some(443))
        );
        if is_default_port {
            url.set_port(None).map_err(|_| {
                DestinationError::NormalizationFailed("Failed to remove default port".to_string())
            })?;
        }

        Ok(Self::Url(url))
    }

    /// Returns `true` if following this destination from `path` on `host`
    /// would land on a path matched by the same rule again.
    ///
    /// Relative destinations are compared by path alone. Absolute URLs only
    /// loop when they point at the request host; with no known host they are
    /// assumed to leave the site.
    pub fn loops_back_to(&self, path: &str, host: Option<&str>) -> bool {
        match self {
            Self::Path(dest) => same_target(dest, path),
            Self::Url(url) => match (url.host_str(), host) {
                (Some(dest_host), Some(host)) => {
                    dest_host.eq_ignore_ascii_case(host) && same_target(url.path(), path)
                }
                _ => false,
            },
        }
    }

    /// Returns the value used for the `Location` header.
    pub fn as_location(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Url(url) => url.as_str(),
        }
    }
}

/// Returns `true` when the input carries an explicit `scheme:` prefix.
fn looks_absolute(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once(':') else {
        return false;
    };
    !scheme.is_empty()
        && !scheme.contains('/')
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
