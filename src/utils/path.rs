//! Request path normalization and redirect candidate generation.
//!
//! Stored rules keep a single canonical `source`; trailing-slash variants are
//! generated at lookup time so that `/old-page` and `/old-page/` resolve to the
//! same rule regardless of how either side was configured.

/// Path prefixes that never consult the redirect cache.
const SKIPPED_PREFIXES: &[&str] = &["/_next", "/api", "/static"];

/// Well-known files served by the site itself.
const SKIPPED_FILES: &[&str] = &["/robots.txt", "/sitemap.xml"];

/// Normalizes a request path to exactly one leading slash.
///
/// Surrounding whitespace is trimmed and empty input maps to `/`. The rest of
/// the path, including any trailing slash, is preserved.
///
/// # Examples
///
/// ```
/// use redirect_resolver::utils::path::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("old-page"), "/old-page");
/// assert_eq!(normalize_path("//old-page/"), "/old-page/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    format!("/{trimmed}")
}

/// Returns the lookup variants for a path, exact match first.
///
/// For a non-root path the order is: the normalized path itself, the path
/// without a trailing slash, the path with exactly one trailing slash.
/// Duplicates are dropped keeping the first occurrence, so a rule stored under
/// the exact request path always wins over one stored under a variant.
pub fn candidate_paths(path: &str) -> Vec<String> {
    let normalized = normalize_path(path);
    if normalized == "/" {
        return vec![normalized];
    }

    let bare = normalized.trim_end_matches('/');
    let bare = if bare.is_empty() { "/" } else { bare };
    let slashed = if bare == "/" {
        "/".to_string()
    } else {
        format!("{bare}/")
    };

    let mut candidates = Vec::with_capacity(3);
    for candidate in [normalized.clone(), bare.to_string(), slashed] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Returns `true` for paths that bypass redirect resolution entirely.
///
/// Covers framework-internal and API routes, `robots.txt`, `sitemap.xml`,
/// favicons, and anything that looks like a static asset (contains a dot).
pub fn should_skip(path: &str) -> bool {
    let path = normalize_path(path);

    if path.contains('.') {
        return true;
    }

    if path.starts_with("/favicon") || SKIPPED_FILES.contains(&path.as_str()) {
        return true;
    }

    SKIPPED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Compares two paths ignoring a trailing slash.
///
/// Two paths that are `same_target` are matched by the same rule, so a rule
/// between them would redirect to itself.
pub fn same_target(a: &str, b: &str) -> bool {
    strip_trailing(&normalize_path(a)) == strip_trailing(&normalize_path(b))
}

fn strip_trailing(path: &str) -> &str {
    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() { "/" } else { stripped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("   "), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("about"), "/about");
        assert_eq!(normalize_path("/about"), "/about");
        assert_eq!(normalize_path("///about"), "/about");
        assert_eq!(normalize_path(" /about/ "), "/about/");
    }

    #[test]
    fn test_candidate_paths_without_trailing_slash() {
        assert_eq!(candidate_paths("/old-page"), vec!["/old-page", "/old-page/"]);
    }

    #[test]
    fn test_candidate_paths_with_trailing_slash() {
        assert_eq!(
            candidate_paths("/old-page/"),
            vec!["/old-page/", "/old-page"]
        );
    }

    #[test]
    fn test_candidate_paths_collapses_repeated_trailing_slashes() {
        assert_eq!(
            candidate_paths("/old-page//"),
            vec!["/old-page//", "/old-page", "/old-page/"]
        );
    }

    #[test]
    fn test_candidate_paths_root() {
        assert_eq!(candidate_paths(""), vec!["/"]);
        assert_eq!(candidate_paths("/"), vec!["/"]);
        assert_eq!(candidate_paths("//"), vec!["/"]);
    }

    #[test]
    fn test_should_skip_internal_and_api() {
        assert!(should_skip("/_next/static/chunk"));
        assert!(should_skip("/_next"));
        assert!(should_skip("/api"));
        assert!(should_skip("/api/redirect-check"));
        assert!(should_skip("/static/logo"));
        assert!(!should_skip("/apiary"));
        assert!(!should_skip("/statics"));
    }

    #[test]
    fn test_should_skip_seo_files_and_assets() {
        assert!(should_skip("/robots.txt"));
        assert!(should_skip("/sitemap.xml"));
        assert!(should_skip("/favicon.ico"));
        assert!(should_skip("/favicon-32x32"));
        assert!(should_skip("/old-page.json"));
        assert!(should_skip("/images/a.b/c"));
    }

    #[test]
    fn test_should_skip_regular_pages() {
        assert!(!should_skip("/"));
        assert!(!should_skip("/old-page"));
        assert!(!should_skip("/blog/my-post/"));
    }

    #[test]
    fn test_same_target() {
        assert!(same_target("/a", "/a"));
        assert!(same_target("/a", "/a/"));
        assert!(same_target("a", "/a"));
        assert!(same_target("/", ""));
        assert!(!same_target("/a", "/b"));
        assert!(!same_target("/a", "/a/b"));
    }
}
