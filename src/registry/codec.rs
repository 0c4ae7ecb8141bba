//! Durable read/write of the registry document.
//!
//! Reads never fail except for a malformed `registryDir`; any structural
//! problem with the document itself (missing file, truncated JSON, a
//! schema version this crate doesn't recognize) is treated as an empty
//! registry rather than an error, since a corrupt registry is no worse
//! than a fresh host. Writes go through a temp-file-plus-rename so a
//! crash mid-write can never leave a torn file.

use std::fs;
use std::path::Path;

use rand::Rng;

use crate::error::{Error, Result};

use super::model::{RegistryDocument, CURRENT_VERSION};

#[cfg(all(test, feature = "property-tests"))]
#[path = "codec_proptests.rs"]
mod proptests;

/// Reads the registry document at `registry_path`.
///
/// Returns an empty document if the file does not exist, cannot be
/// parsed as JSON, does not declare [`CURRENT_VERSION`], or whose
/// `entries` field is not an array.
///
/// # Examples
///
/// ```no_run
/// use portreg::registry::codec::read;
///
/// let doc = read("/tmp/portreg-example/registry.json").unwrap();
/// assert_eq!(doc.version, 1);
/// ```
///
/// # Errors
///
/// This function does not itself fail on a malformed document; it only
/// propagates an [`Error::Io`] if the path exists but cannot be opened
/// for a reason other than non-existence (e.g. a permissions error).
pub fn read(registry_path: impl AsRef<Path>) -> Result<RegistryDocument> {
    let path = registry_path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RegistryDocument::empty()),
        Err(e) => return Err(Error::Io(e)),
    };

    Ok(parse(&bytes))
}

fn parse(bytes: &[u8]) -> RegistryDocument {
    match serde_json::from_slice::<RegistryDocument>(bytes) {
        Ok(doc) if doc.version == CURRENT_VERSION => doc,
        _ => RegistryDocument::empty(),
    }
}

/// Writes `document` to `registry_path`, creating the parent directory
/// (mode `0700`) if needed, via a temp-file-plus-rename sequence.
///
/// The temporary file is named `<registry_path>.<random-hex>.tmp` and is
/// created with mode `0600` before being renamed over the destination, so
/// the destination's permissions never pass through a wider-than-intended
/// window.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] if directory creation, serialization,
/// the temporary write, or the final rename fails.
///
/// # Examples
///
/// ```no_run
/// use portreg::registry::codec::write;
/// use portreg::registry::model::RegistryDocument;
///
/// write("/tmp/portreg-example/registry.json", &RegistryDocument::empty()).unwrap();
/// ```
pub fn write(registry_path: impl AsRef<Path>, document: &RegistryDocument) -> Result<()> {
    let path = registry_path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::WriteFailed {
            reason: format!("cannot create registry directory: {e}"),
        })?;
        set_permissions(parent, 0o700)?;
    }

    let body = serde_json::to_vec_pretty(document).map_err(|e| Error::WriteFailed {
        reason: format!("cannot serialize registry: {e}"),
    })?;

    let suffix: String = {
        let mut rng = rand::thread_rng();
        (0..16).map(|_| format!("{:x}", rng.gen_range(0..16))).collect()
    };
    let temp_path = path.with_file_name(format!(
        "{}.{suffix}.tmp",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("registry.json")
    ));

    fs::write(&temp_path, &body).map_err(|e| Error::WriteFailed {
        reason: format!("cannot write temporary registry file: {e}"),
    })?;
    set_permissions(&temp_path, 0o600)?;

    fs::rename(&temp_path, path).map_err(|e| Error::WriteFailed {
        reason: format!("cannot rename temporary registry file into place: {e}"),
    })?;

    Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::WriteFailed {
        reason: format!("cannot set permissions on {}: {e}", path.display()),
    })
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::model::AllocationEntry;

    #[test]
    fn reading_missing_file_returns_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let doc = read(&path).unwrap();
        assert_eq!(doc, RegistryDocument::empty());
    }

    #[test]
    fn reading_corrupt_bytes_returns_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, b"{ not json").unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc, RegistryDocument::empty());
    }

    #[test]
    fn reading_unknown_version_returns_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, br#"{"version":99,"entries":[]}"#).unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc, RegistryDocument::empty());
    }

    #[test]
    fn round_trips_a_populated_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut doc = RegistryDocument::empty();
        doc.entries.push(AllocationEntry {
            port: 50123,
            pid: 42,
            timestamp: 1,
            tag: Some("api".into()),
        });

        write(&path, &doc).unwrap();
        let read_back = read(&path).unwrap();
        assert_eq!(read_back, doc);
    }

    #[test]
    #[cfg(unix)]
    fn write_creates_directory_and_file_with_expected_modes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let registry_dir = dir.path().join("nested");
        let path = registry_dir.join("registry.json");

        write(&path, &RegistryDocument::empty()).unwrap();

        let dir_mode = fs::metadata(&registry_dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn no_leftover_temp_files_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        write(&path, &RegistryDocument::empty()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
