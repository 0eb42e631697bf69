/// Request target split into the document-relative resource and the raw
/// query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub resource_path: String,
    pub query: Option<String>,
}

impl Target {
    /// Every literal `/../` is replaced by `/` in one left-to-right pass.
    /// Parent segments are not walked, and a `/../` that only appears after
    /// a replacement is left alone. Percent-encoded separators are not
    /// decoded, so `%2e%2e` passes through untouched.
    pub fn normalize(target: &str, default_page: &str) -> Self {
        let cleaned = target.replace("/../", "/");

        let (path, query) = match cleaned.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (cleaned.as_str(), None),
        };

        let resource_path = if path == "/" {
            default_page.to_string()
        } else {
            path.strip_prefix('/').unwrap_or(path).to_string()
        };

        Self {
            resource_path,
            query,
        }
    }
}
