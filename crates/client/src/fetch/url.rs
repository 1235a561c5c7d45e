//! Versioned resource URL construction.

/// Error type for resource URL construction failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty resource name")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Build the request URL for a named resource.
///
/// Joins `name` onto `base` and, when a cache-bust token is supplied,
/// appends it as a `v` query parameter so intermediaries treat the request
/// as a distinct resource. Without a token the URL carries no version
/// marker and cached copies along the path remain eligible.
pub fn resolve(base: &url::Url, name: &str, token: Option<&str>) -> Result<url::Url, UrlError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = base.join(name).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if let Some(token) = token {
        resolved.query_pairs_mut().append_pair("v", token);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> url::Url {
        url::Url::parse("http://localhost:8080/data/").unwrap()
    }

    #[test]
    fn test_resolve_without_token() {
        let url = resolve(&base(), "lap_times.csv", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/data/lap_times.csv");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_resolve_with_token() {
        let url = resolve(&base(), "lap_times.csv", Some("1693526400123")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/data/lap_times.csv?v=1693526400123");
    }

    #[test]
    fn test_resolve_nested_resource_name() {
        let url = resolve(&base(), "2024/monza/lap_times.csv", Some("7")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/data/2024/monza/lap_times.csv?v=7");
    }

    #[test]
    fn test_resolve_trims_resource_name() {
        let url = resolve(&base(), "  lap_times.csv  ", None).unwrap();
        assert_eq!(url.path(), "/data/lap_times.csv");
    }

    #[test]
    fn test_resolve_empty_name() {
        let result = resolve(&base(), "", None);
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_whitespace_only_name() {
        let result = resolve(&base(), "   ", Some("1"));
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_token_is_percent_encoded() {
        let url = resolve(&base(), "lap_times.csv", Some("a b")).unwrap();
        assert_eq!(url.query(), Some("v=a+b"));
    }

    #[test]
    fn test_resolve_same_name_differs_by_token() {
        let plain = resolve(&base(), "lap_times.csv", None).unwrap();
        let versioned = resolve(&base(), "lap_times.csv", Some("1693526400123")).unwrap();
        assert_ne!(plain, versioned);
        assert_eq!(plain.path(), versioned.path());
    }
}
