//! Display-path derivation.

use foldertally_core::{ROOT_DISPLAY, normalize_root};

/// Path of a folder as shown in the report, relative to the scanned `root`.
///
/// The root prefix is matched case-insensitively and only on a segment
/// boundary; the result always starts with `/`, and the root itself is `/`.
/// Paths outside the root are returned unchanged.
pub fn display_path(path: &str, root: &str) -> String {
    let root = normalize_root(root);
    if root.is_empty() {
        return path.to_string();
    }
    match strip_prefix_ignore_case(path, &root) {
        Some("") => ROOT_DISPLAY.to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let mut path_chars = path.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = path_chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let rest_start = path_chars.next().map_or(path.len(), |(i, _)| i);
    Some(&path[rest_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_root_keeps_paths() {
        assert_eq!(display_path("/", ""), "/");
        assert_eq!(display_path("/photos/raw", "/"), "/photos/raw");
    }

    #[test]
    fn test_strips_root_case_insensitively() {
        assert_eq!(display_path("/work", "/Work"), "/");
        assert_eq!(display_path("/work/clients/acme", "Work"), "/clients/acme");
        assert_eq!(display_path("/Work/Clients", "/work/"), "/Clients");
    }

    #[test]
    fn test_requires_segment_boundary() {
        assert_eq!(display_path("/workshop/tools", "/work"), "/workshop/tools");
    }

    #[test]
    fn test_non_ascii_roots() {
        assert_eq!(display_path("/ärger/x", "/Ärger"), "/x");
    }
}
