//! Content fingerprints for canonical report strings.

use uuid::Uuid;

/// Namespace for report fingerprints. Changing it changes every stored checksum.
pub const CHECKSUM_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b7a_54d3_4e0f_9a61_c8b5_0d2e_7a43);

/// Derives a name-based (v5) UUID from the canonical string's UTF-8 bytes.
///
/// # Panics
///
/// Panics if `canonical` is empty or whitespace only. A blank canonical string
/// means a report was built wrong; there is nothing sensible to fingerprint.
///
/// ```
/// use whale_sync::checksum::checksum;
///
/// let a = checksum(r#"{"date":"2025-08-12"}"#);
/// assert_eq!(a, checksum(r#"{"date":"2025-08-12"}"#));
/// assert_ne!(a, checksum(r#"{"date":"2025-08-13"}"#));
/// ```
pub fn checksum(canonical: &str) -> Uuid {
    assert!(
        !canonical.trim().is_empty(),
        "canonical string cannot be blank"
    );
    Uuid::new_v5(&CHECKSUM_NAMESPACE, canonical.as_bytes())
}
