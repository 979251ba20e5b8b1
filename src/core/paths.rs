//! Shared path manipulation utilities.

use std::path::{Component, Path, PathBuf};

/// Express `path` relative to `root` using `/` separators, the form catalog
/// records store in their `file` field.
///
/// Returns `None` when `path` is not inside `root`.
pub fn site_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Turn a site-relative `file` value back into a filesystem path under `root`.
///
/// `..` and absolute components are dropped so a record can never point
/// outside the site root.
pub fn resolve_site_file(root: &Path, file: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for part in file.split(['/', '\\']) {
        match part {
            "" | "." | ".." => {}
            other => resolved.push(other),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn site_relative_uses_forward_slashes() {
        let root = Path::new("/srv/site");
        let file = root.join("Reading").join("Cam 18").join("Test 1.html");
        assert_eq!(
            site_relative(root, &file).as_deref(),
            Some("Reading/Cam 18/Test 1.html")
        );
    }

    #[test]
    fn site_relative_outside_root_is_none() {
        assert!(site_relative(Path::new("/srv/site"), Path::new("/etc/passwd")).is_none());
        assert!(site_relative(Path::new("/srv/site"), Path::new("/srv/site")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_site_file_drops_traversal() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_site_file(root, "../../etc/passwd"),
            PathBuf::from("/srv/site/etc/passwd")
        );
        assert_eq!(
            resolve_site_file(root, "Listening/Test 2.html"),
            PathBuf::from("/srv/site/Listening/Test 2.html")
        );
    }
}
