//! Property-based tests for [`crate::sanitize`].

use proptest::prelude::*;

use super::{sanitize_tag, MAX_TAG_LENGTH};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    /// Sanitizing an already-sanitized tag is a no-op: the sanitizer has
    /// already removed everything it would otherwise touch.
    #[test]
    fn sanitize_tag_is_idempotent(raw in ".{0,400}") {
        let Some(once) = sanitize_tag(Some(&raw)) else { return Ok(()); };
        let twice = sanitize_tag(Some(&once));
        prop_assert_eq!(Some(once), twice);
    }

    #[test]
    fn sanitize_tag_never_exceeds_max_length(raw in ".{0,1000}") {
        if let Some(sanitized) = sanitize_tag(Some(&raw)) {
            prop_assert!(sanitized.len() <= MAX_TAG_LENGTH);
        }
    }

    #[test]
    fn sanitize_tag_never_contains_control_characters(raw in ".{0,400}") {
        if let Some(sanitized) = sanitize_tag(Some(&raw)) {
            prop_assert!(sanitized.chars().all(|c| !matches!(c as u32, 0x00..=0x1F | 0x7F)));
        }
    }

    #[test]
    fn sanitize_tag_of_only_control_bytes_is_none(count in 1usize..64) {
        let raw: String = std::iter::repeat('\u{1}').take(count).collect();
        prop_assert_eq!(sanitize_tag(Some(&raw)), None);
    }
}
