//! On-disk and in-memory data shapes for the registry document.

use serde::{Deserialize, Serialize};

/// The schema version this crate writes and expects to read.
///
/// A registry document declaring any other `version` is treated as
/// unreadable and the codec falls back to an empty document, the same
/// graceful-recovery path taken for structurally malformed JSON.
pub const CURRENT_VERSION: u32 = 1;

/// A single allocation, as persisted in `registry.json`.
///
/// The tuple of `port` alone is the registry's uniqueness key; `(pid, tag)`
/// is never required to be unique, since one process may hold several
/// ports under the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// The allocated port.
    pub port: u16,
    /// The operating-system process id that owns this entry.
    pub pid: u32,
    /// Millisecond wall-clock epoch at which the entry was created.
    pub timestamp: u64,
    /// Optional, sanitized human label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// The registry document: a version tag plus the ordered set of entries.
///
/// Entry order is cosmetic; nothing in the engine depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Schema version. Always [`CURRENT_VERSION`] for documents this crate writes.
    pub version: u32,
    /// The recorded allocations.
    #[serde(default)]
    pub entries: Vec<AllocationEntry>,
}

impl RegistryDocument {
    /// Returns a fresh, empty document at the current schema version.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Default for RegistryDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// An allocation as returned to a caller: no `pid` or `timestamp` exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    /// The allocated port.
    pub port: u16,
    /// The sanitized tag, if any was supplied or survived sanitization.
    pub tag: Option<String>,
}

impl From<&AllocationEntry> for AllocationRecord {
    fn from(entry: &AllocationEntry) -> Self {
        Self {
            port: entry.port,
            tag: entry.tag.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_current_version_and_no_entries() {
        let doc = RegistryDocument::empty();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn missing_entries_field_defaults_to_empty_vec() {
        let doc: RegistryDocument = serde_json::from_str(r#"{"version":1}"#).unwrap();
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn allocation_record_drops_pid_and_timestamp() {
        let entry = AllocationEntry {
            port: 50123,
            pid: 12345,
            timestamp: 1_704_899_876_543,
            tag: Some("api".into()),
        };
        let record = AllocationRecord::from(&entry);
        assert_eq!(record.port, 50123);
        assert_eq!(record.tag, Some("api".to_string()));
    }

    #[test]
    fn entry_without_tag_is_omitted_from_json() {
        let entry = AllocationEntry {
            port: 50124,
            pid: 12346,
            timestamp: 1_704_899_877_123,
            tag: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("tag"));
    }
}
