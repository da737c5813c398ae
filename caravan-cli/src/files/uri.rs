//! String helpers for storage URIs of the form `scheme://target`

/// Extract the scheme from a URI, if it carries one.
///
/// The scheme is everything before the first `://`. Returns None for bare
/// paths and for a leading separator with nothing in front of it.
pub fn scheme(uri: &str) -> Option<&str> {
    match uri.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() => Some(scheme),
        _ => None,
    }
}

/// Everything after the `://` separator, if present.
pub fn target(uri: &str) -> Option<&str> {
    uri.split_once("://").map(|(_, target)| target)
}

/// Check whether a destination path names a directory.
///
/// True iff the last character is the path separator. This is a naming
/// convention, not a filesystem check: `public://images/` means "directory,
/// derive the filename from the source" and `public://images` means "a file
/// literally named images".
pub fn ends_with_separator(path: &str) -> bool {
    path.ends_with('/')
}

/// Prefix `path` with `scheme://` when it carries no scheme of its own.
///
/// Empty paths are returned unchanged.
pub fn apply_default_scheme(path: &str, default_scheme: &str) -> String {
    if path.is_empty() || scheme(path).is_some() {
        return path.to_string();
    }
    format!("{}://{}", default_scheme, path)
}

/// Base filename of a source path or URL.
///
/// Only the path component is considered: query strings and fragments on
/// remote URLs are stripped before taking the last segment. Percent-encoded
/// names are decoded so `my%20photo.jpg` lands on disk as `my photo.jpg`.
pub fn base_name(source: &str) -> String {
    let path = source.split_once('#').map_or(source, |(path, _)| path);
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let name = path.rsplit('/').next().unwrap_or(path);

    match urlencoding::decode(name) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => name.to_string(),
    }
}
