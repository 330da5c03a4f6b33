//! Persisted blob layout
//!
//! The blob is a fixed-size byte region with a packed header followed by an
//! application-owned payload. There is no compiler padding; every field sits
//! at the offset named below.
//!
//! ## Memory Map
//!
//! ```text
//!     offset  0           4                         25                size
//!             +-----------+-------------------------+-------------------+
//!             | Version   | Type tag (NUL-padded)   | Payload           |
//!             | u32 LE    | TYPE_MAX_LENGTH + 1     | opaque            |
//!             +-----------+-------------------------+-------------------+
//! ```
//!
//! ## Fields
//!
//! - `Version`: schema revision the firmware expects (4 bytes, u32, LE)
//! - `Type tag`: which configuration kind the firmware expects, up to
//!   [`TYPE_MAX_LENGTH`] bytes, always followed by at least one NUL
//! - `Payload`: everything after [`PAYLOAD_OFFSET`], interpreted only by
//!   the application

use heapless::String;

/// Offset of the version field
pub const VERSION_OFFSET: usize = 0;

/// Size of the version field in bytes
pub const VERSION_LEN: usize = core::mem::size_of::<u32>();

/// Offset of the type tag field
pub const TYPE_OFFSET: usize = VERSION_OFFSET + VERSION_LEN;

/// Maximum type tag length in bytes (excluding the terminator)
pub const TYPE_MAX_LENGTH: usize = 20;

/// Size of the type tag field in bytes
pub const TYPE_CAPACITY: usize = TYPE_MAX_LENGTH + 1;

/// Size of the fixed header
pub const HEADER_LEN: usize = TYPE_OFFSET + TYPE_CAPACITY;

/// Offset of the first payload byte
pub const PAYLOAD_OFFSET: usize = HEADER_LEN;

/// Smallest blob that can hold the header
pub const MIN_BLOB_SIZE: usize = HEADER_LEN;

/// Configuration kind identifier
///
/// Always fits the type field: construction truncates instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeTag(String<TYPE_MAX_LENGTH>);

impl TypeTag {
    /// Build a tag from `tag`, truncated to fit the type field
    ///
    /// Keeps at most [`TYPE_MAX_LENGTH`] bytes, cut back to a UTF-8 char
    /// boundary. An embedded NUL ends the tag, as it would in the stored
    /// form.
    pub fn truncated(tag: &str) -> Self {
        let tag = match tag.find('\0') {
            Some(nul) => &tag[..nul],
            None => tag,
        };

        let mut end = tag.len().min(TYPE_MAX_LENGTH);
        while !tag.is_char_boundary(end) {
            end -= 1;
        }

        let mut s = String::new();
        // Cannot overflow: end <= TYPE_MAX_LENGTH
        let _ = s.push_str(&tag[..end]);
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Field access below assumes `blob.len() >= HEADER_LEN`, which every
// VersionedConfigStore guarantees from construction.

pub(crate) fn read_version(blob: &[u8]) -> u32 {
    let mut raw = [0u8; VERSION_LEN];
    raw.copy_from_slice(&blob[VERSION_OFFSET..TYPE_OFFSET]);
    u32::from_le_bytes(raw)
}

pub(crate) fn write_version(blob: &mut [u8], version: u32) {
    blob[VERSION_OFFSET..TYPE_OFFSET].copy_from_slice(&version.to_le_bytes());
}

/// Stored tag bytes up to the first NUL
///
/// A field with no terminator yields all [`TYPE_CAPACITY`] bytes, which is
/// longer than any valid tag and so never compares equal to one.
pub(crate) fn read_type(blob: &[u8]) -> &[u8] {
    let field = &blob[TYPE_OFFSET..HEADER_LEN];
    match field.iter().position(|&b| b == 0) {
        Some(nul) => &field[..nul],
        None => field,
    }
}

pub(crate) fn write_type(blob: &mut [u8], tag: &TypeTag) {
    let field = &mut blob[TYPE_OFFSET..HEADER_LEN];
    field.fill(0);
    field[..tag.len()].copy_from_slice(tag.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(TYPE_OFFSET, 4);
        assert_eq!(TYPE_CAPACITY, 21);
        assert_eq!(HEADER_LEN, 25);
        assert_eq!(PAYLOAD_OFFSET, HEADER_LEN);
    }

    #[test]
    fn test_short_tag_is_kept() {
        let tag = TypeTag::truncated("relay-board");
        assert_eq!(tag.as_str(), "relay-board");
    }

    #[test]
    fn test_long_tag_is_truncated() {
        let tag = TypeTag::truncated("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(tag.as_str(), "abcdefghijklmnopqrst");
        assert_eq!(tag.len(), TYPE_MAX_LENGTH);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 19 ASCII bytes followed by a 2-byte char straddling the limit
        let tag = TypeTag::truncated("abcdefghijklmnopqrsé");
        assert_eq!(tag.as_str(), "abcdefghijklmnopqrs");
    }

    #[test]
    fn test_embedded_nul_ends_tag() {
        let tag = TypeTag::truncated("AB\0CD");
        assert_eq!(tag.as_str(), "AB");
    }

    #[test]
    fn test_version_is_little_endian() {
        let mut blob = [0u8; HEADER_LEN];
        write_version(&mut blob, 0x0102_0304);
        assert_eq!(&blob[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(read_version(&blob), 0x0102_0304);
    }

    #[test]
    fn test_type_field_is_nul_padded() {
        let mut blob = [0xAAu8; HEADER_LEN + 2];
        write_type(&mut blob, &TypeTag::truncated("XY"));

        assert_eq!(&blob[TYPE_OFFSET..TYPE_OFFSET + 2], b"XY");
        assert!(blob[TYPE_OFFSET + 2..HEADER_LEN].iter().all(|&b| b == 0));
        // Payload untouched
        assert_eq!(blob[HEADER_LEN], 0xAA);
        assert_eq!(read_type(&blob), b"XY");
    }

    #[test]
    fn test_unterminated_type_field_reads_full_capacity() {
        let blob = [0xFFu8; HEADER_LEN];
        assert_eq!(read_type(&blob).len(), TYPE_CAPACITY);
    }
}
