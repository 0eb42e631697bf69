use std::{
    env,
    path::{Path, PathBuf},
};

/// Maps a resource path onto the document root by plain concatenation.
///
/// No traversal checks happen here; the parser's `/../` removal is the only
/// sanitization a path receives. Encoded separators reach the filesystem
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: String,
}

impl PathResolver {
    /// A root starting with `~` is expanded to `$HOME`.
    pub fn new(root: &str) -> Self {
        let home = env::var_os("HOME").map(PathBuf::from);
        Self::with_home(root, home.as_deref())
    }

    pub fn with_home(root: &str, home: Option<&Path>) -> Self {
        let root = match (root.strip_prefix('~'), home) {
            (Some(rest), Some(home)) => format!("{}{}", home.display(), rest),
            _ => root.to_string(),
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn resolve(&self, resource_path: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.root, resource_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_concatenation() {
        let resolver = PathResolver::with_home("/srv/www/", None);
        assert_eq!(resolver.resolve("index.html"), PathBuf::from("/srv/www/index.html"));
    }

    #[test]
    fn test_root_without_trailing_separator_is_not_fixed() {
        let resolver = PathResolver::with_home("/srv/www", None);
        assert_eq!(resolver.resolve("index.html"), PathBuf::from("/srv/wwwindex.html"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let resolver = PathResolver::with_home("~/www/", Some(Path::new("/home/alice")));

        assert_eq!(resolver.root(), "/home/alice/www/");
        assert_eq!(resolver.resolve("a.html"), PathBuf::from("/home/alice/www/a.html"));
    }

    #[test]
    fn test_tilde_kept_without_home() {
        let resolver = PathResolver::with_home("~/www/", None);
        assert_eq!(resolver.root(), "~/www/");
    }

    #[test]
    fn test_leftover_parent_segments_pass_through() {
        let resolver = PathResolver::with_home("/srv/www/", None);
        assert_eq!(
            resolver.resolve("a/../b.html"),
            PathBuf::from("/srv/www/a/../b.html")
        );
    }
}
