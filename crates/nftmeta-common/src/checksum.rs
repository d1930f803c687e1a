//! Checksum primitives
//!
//! Every digest in nftmeta is SHA-256 rendered as 64 lowercase hex characters.

use sha2::{Digest, Sha256};

/// Read buffer size for streaming digests
pub const CHUNK_SIZE: usize = 8192;

/// Length of a rendered digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash a string directly.
///
/// Used to fold the per-URI digests of a resource into one digest: the
/// caller concatenates the hex digests in `uris` order and hashes the result.
pub fn hash_string(data: &str) -> String {
    hash_bytes(data.as_bytes())
}

/// Hash an in-memory byte slice
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Combine per-URI digests into a resource digest
pub fn combine_digests<I, S>(digests: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: String = digests.into_iter().map(|d| d.as_ref().to_string()).collect();
    hash_string(&joined)
}

/// Whether `value` looks like a rendered digest
pub fn is_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_string() {
        assert_eq!(
            hash_string("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_string_empty() {
        assert_eq!(
            hash_string(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_bytes() {
        assert_eq!(
            hash_bytes(b"test data"),
            "916f0027a575074ce72a331777c3478d6513f786a591bd892da1a577bf2335f9"
        );
    }

    #[test]
    fn test_combine_digests_is_order_sensitive() {
        let a = hash_string("a");
        let b = hash_string("b");
        let ab = combine_digests([&a, &b]);
        assert_eq!(ab, hash_string(&format!("{}{}", a, b)));
        assert_ne!(ab, combine_digests([&b, &a]));
    }

    #[test]
    fn test_is_digest() {
        assert!(is_digest(&hash_string("x")));
        assert!(!is_digest("ABC"));
        assert!(!is_digest(&hash_string("x").to_uppercase()));
    }

    proptest! {
        #[test]
        fn prop_hash_string_is_stable_hex(input in ".*") {
            let first = hash_string(&input);
            prop_assert!(is_digest(&first));
            prop_assert_eq!(first, hash_string(&input));
        }
    }
}
