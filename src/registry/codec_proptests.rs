//! Property-based tests for [`super::read`]: corruption tolerance.
//!
//! spec.md §8 requires that reading any byte string at the registry path
//! returns either a valid document or a well-typed failure — never a
//! panic. Since [`super::read`] treats every structural problem as an
//! empty document, the stronger property this crate can make is that it
//! never panics and always yields some document at the current schema
//! version.

use proptest::prelude::*;

use super::read;
use crate::registry::model::CURRENT_VERSION;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    #[test]
    fn read_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, &bytes).unwrap();

        let doc = read(&path).unwrap();
        prop_assert_eq!(doc.version, CURRENT_VERSION);
    }

    #[test]
    fn read_of_arbitrary_utf8_never_panics(text in ".{0,2000}") {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, text.as_bytes()).unwrap();

        let doc = read(&path).unwrap();
        prop_assert_eq!(doc.version, CURRENT_VERSION);
    }
}
