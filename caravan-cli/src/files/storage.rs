//! Storage scheme registry mapping scheme names to local directories

use std::collections::HashMap;
use std::path::PathBuf;

use super::uri;

/// Maps storage schemes (`public`, `private`, ...) to local root directories.
///
/// A URI is local when it is a bare path or its scheme is registered here;
/// anything else (`http`, `https`, unregistered schemes) is remote.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    default_scheme: String,
    roots: HashMap<String, PathBuf>,
}

impl SchemeRegistry {
    /// Registry with a single `public` scheme rooted at the given directory.
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        let mut roots = HashMap::new();
        roots.insert("public".to_string(), public_root.into());
        Self {
            default_scheme: "public".to_string(),
            roots,
        }
    }

    /// Register an additional scheme root.
    pub fn with_scheme(mut self, scheme: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(scheme.into(), root.into());
        self
    }

    /// Override the scheme applied to schemeless destination paths.
    ///
    /// The scheme must already be registered; unknown names are ignored.
    pub fn with_default_scheme(mut self, scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        if self.roots.contains_key(&scheme) {
            self.default_scheme = scheme;
        }
        self
    }

    /// Scheme applied to schemeless destination paths.
    pub fn default_scheme(&self) -> &str {
        &self.default_scheme
    }

    /// The default scheme as a full `scheme://` destination prefix.
    pub fn default_scheme_prefix(&self) -> String {
        format!("{}://", self.default_scheme)
    }

    /// True when the URI can be served from the local filesystem.
    pub fn is_local(&self, uri: &str) -> bool {
        match uri::scheme(uri) {
            Some(scheme) => self.roots.contains_key(scheme),
            None => true,
        }
    }

    /// Resolve a URI or bare path to a local filesystem path.
    ///
    /// Returns None for remote URIs and unregistered schemes.
    pub fn resolve(&self, uri: &str) -> Option<PathBuf> {
        match uri::scheme(uri) {
            Some(scheme) => {
                let root = self.roots.get(scheme)?;
                let rest = uri::target(uri).unwrap_or("");
                Some(root.join(rest.trim_start_matches('/')))
            }
            None => Some(PathBuf::from(uri)),
        }
    }
}
