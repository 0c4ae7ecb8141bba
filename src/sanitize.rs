//! Defensive sanitizers for registry-directory paths and allocation tags.
//!
//! Both sanitizers run on every ingress path before a value touches the
//! filesystem or the registry document. The path sanitizer can fail (a
//! hostile or malformed path is a configuration error); the tag sanitizer
//! never fails, since a tag is cosmetic and any input can be reduced to
//! something safe to persist.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

#[cfg(all(test, feature = "property-tests"))]
#[path = "sanitize_proptests.rs"]
mod proptests;

/// Maximum length, in bytes, of a sanitized tag.
pub const MAX_TAG_LENGTH: usize = 256;

/// Rejects a raw byte for traversal (`..`) or embedded NUL, then returns the
/// absolute, normalized form of `path`.
///
/// `..` is rejected outright rather than resolved, because resolving it
/// would let a caller walk the registry directory above wherever it was
/// configured to live. Rejection happens both before and after converting
/// to an absolute path, since `~/../../etc` looks harmless only in its raw
/// form.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the path contains a NUL byte or a
/// `..` component, either in its raw or normalized form.
///
/// # Examples
///
/// ```
/// use portreg::sanitize::sanitize_registry_dir;
/// use std::path::Path;
///
/// let sanitized = sanitize_registry_dir(Path::new("/tmp/myregistry")).unwrap();
/// assert!(sanitized.is_absolute());
///
/// assert!(sanitize_registry_dir(Path::new("/tmp/../etc")).is_err());
/// ```
pub fn sanitize_registry_dir(path: &Path) -> Result<PathBuf> {
    reject_traversal(path)?;

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::InvalidPath {
                reason: format!("cannot determine current directory: {e}"),
            })?
            .join(path)
    };

    let normalized = normalize_components(&absolute)?;
    reject_traversal(&normalized)?;

    Ok(normalized)
}

fn reject_traversal(path: &Path) -> Result<()> {
    let raw = path.as_os_str();
    if raw.is_empty() {
        return Err(Error::InvalidPath {
            reason: "path is empty".into(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        if raw.as_bytes().contains(&0) {
            return Err(Error::InvalidPath {
                reason: "path contains a NUL byte".into(),
            });
        }
    }

    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(Error::InvalidPath {
            reason: "path contains '..'".into(),
        });
    }

    Ok(())
}

fn normalize_components(path: &Path) -> Result<PathBuf> {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => result.push(component),
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath {
                    reason: "path contains '..'".into(),
                });
            }
        }
    }
    Ok(result)
}

/// Sanitizes an optional tag: strips control characters, truncates to
/// [`MAX_TAG_LENGTH`] bytes, and collapses an empty result to `None`.
///
/// This never fails; a tag is a human label with no correctness
/// consequences, so the worst a hostile input can do is get reduced to
/// nothing.
///
/// # Examples
///
/// ```
/// use portreg::sanitize::sanitize_tag;
///
/// assert_eq!(sanitize_tag(Some("api-server")), Some("api-server".to_string()));
/// assert_eq!(sanitize_tag(Some("")), None);
/// assert_eq!(sanitize_tag(None), None);
///
/// let with_control_chars = "api\x00-\x1Fserver\x7F";
/// assert_eq!(sanitize_tag(Some(with_control_chars)), Some("api-server".to_string()));
/// ```
#[must_use]
pub fn sanitize_tag(tag: Option<&str>) -> Option<String> {
    let tag = tag?;

    let stripped: String = tag
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F))
        .collect();

    if stripped.is_empty() {
        return None;
    }

    let truncated = truncate_to_byte_limit(&stripped, MAX_TAG_LENGTH);

    if truncated.is_empty() {
        None
    } else {
        Some(truncated)
    }
}

fn truncate_to_byte_limit(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }

    let mut end = limit;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
