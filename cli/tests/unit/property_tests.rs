//! Property-based tests for name validation and key parsing.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use shiftci_cli::domain::project::validate_resource_name;
use shiftci_cli::domain::ssh::{KEY_NAME, parse_public_key, unique_key_name};

// ============================================================================
// validate_resource_name() property tests
// ============================================================================

proptest! {
    /// Letters and digits up to 32 characters are always accepted.
    #[test]
    fn prop_alphanumeric_names_accepted(name in "[a-zA-Z0-9]{1,32}") {
        prop_assert!(validate_resource_name(&name).is_ok(), "rejected valid name: {name}");
    }

    /// Names longer than 32 characters are always rejected.
    #[test]
    fn prop_long_names_rejected(name in "[a-z]{33,64}") {
        prop_assert!(validate_resource_name(&name).is_err());
    }

    /// Any punctuation makes the name illegal.
    #[test]
    fn prop_punctuation_rejected(
        head in "[a-z]{0,10}",
        sep in "[-_. /]",
        tail in "[a-z]{0,10}",
    ) {
        let name = format!("{head}{sep}{tail}");
        prop_assert!(validate_resource_name(&name).is_err(), "accepted {name:?}");
    }
}

#[test]
fn test_empty_name_rejected() {
    assert!(validate_resource_name("").is_err());
}

// ============================================================================
// parse_public_key() property tests
// ============================================================================

proptest! {
    /// Well-formed key lines round-trip their material and comment.
    #[test]
    fn prop_key_line_parses(
        material in "[A-Za-z0-9+/]{16,64}={0,2}",
        comment in "[a-z]{1,8}@[a-z]{1,8}",
    ) {
        let key = parse_public_key(&format!("ssh-rsa {material} {comment}\n"))
            .expect("valid key line");
        prop_assert_eq!(key.key_type, "ssh-rsa");
        prop_assert_eq!(key.content, material);
        prop_assert_eq!(key.comment, Some(comment));
    }

    /// Arbitrary key types are rejected.
    #[test]
    fn prop_unknown_key_type_rejected(kind in "[a-z]{3,10}", material in "[A-Za-z0-9]{16}") {
        let result = parse_public_key(&format!("{kind} {material}"));
        prop_assert!(result.is_err(), "accepted key type {kind}");
    }

    /// Leading blank and comment lines are skipped.
    #[test]
    fn prop_leading_noise_skipped(blank in 0usize..4, notes in 0usize..4) {
        let mut text = String::new();
        for _ in 0..blank {
            text.push('\n');
        }
        for i in 0..notes {
            text.push_str(&format!("# note {i}\n"));
        }
        text.push_str("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5");
        let key = parse_public_key(&text).expect("key after noise");
        prop_assert_eq!(key.key_type, "ssh-ed25519");
        prop_assert_eq!(key.comment, None);
    }
}

// ============================================================================
// unique_key_name() property tests
// ============================================================================

proptest! {
    /// The chosen name never collides with a taken one.
    #[test]
    fn prop_unique_key_name_is_free(taken_count in 0usize..20) {
        let mut taken: Vec<String> = vec![KEY_NAME.to_string()];
        taken.extend((2..taken_count + 2).map(|n| format!("{KEY_NAME}{n}")));
        let refs: Vec<&str> = taken.iter().map(String::as_str).collect();
        let name = unique_key_name(&refs);
        prop_assert!(!refs.contains(&name.as_str()), "collided: {name}");
        prop_assert_eq!(name, format!("{KEY_NAME}{}", taken_count + 2));
    }
}
