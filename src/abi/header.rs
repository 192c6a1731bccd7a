//! Fixed-layout wire headers and the blob reference they carry.
//!
//! Every record on the wire starts with a fixed header reinterpreted directly
//! from bytes with `zerocopy`, avoiding a copy for the common case.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A length-prefixed byte range within a batch buffer, used for the
/// variable-length tail of a request or response (a file name, a write
/// payload, a security descriptor, ...).
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct Blob {
    pub offset: u32,
    pub size: u32,
}

impl Blob {
    pub const EMPTY: Blob = Blob { offset: 0, size: 0 };

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.size == 0
    }

    /// Returns the byte range `self` addresses within `batch`, or `None` if
    /// it falls outside the buffer, would overflow `usize`, or starts before
    /// `min_offset` (the owning record's fixed header, which a blob must not
    /// overlap — see spec testable property 3).
    #[must_use]
    pub fn slice<'a>(self, batch: &'a [u8], min_offset: usize) -> Option<&'a [u8]> {
        let start = self.offset as usize;
        if self.size != 0 && start < min_offset {
            return None;
        }
        let end = start.checked_add(self.size as usize)?;
        batch.get(start..end)
    }
}

/// Fixed-size header prefixing every request record.
#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct RequestHeader {
    /// Total size of this record, header included, in bytes.
    pub size: u32,
    /// Raw [`super::opcode::Opcode`] discriminant; validated on decode.
    pub opcode: u32,
    /// Caller-chosen correlation id, echoed back in the matching
    /// [`ResponseHeader::hint`].
    pub hint: u64,
    /// Identifier of the open file-system object this request targets, or 0
    /// for operations that address the volume itself.
    pub object_id: u64,
    /// Originating process id, for access-check and audit purposes.
    pub process_id: u32,
    pub _reserved: u32,
}

/// Fixed-size header prefixing every response record.
///
/// `hint` leads so the `u64` falls on a naturally 8-aligned offset; a
/// `u32, u64, ...` ordering would leave 4 bytes of compiler-inserted padding
/// between the two fields, which `zerocopy`'s `IntoBytes` derive rejects.
#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ResponseHeader {
    /// Echo of the originating [`RequestHeader::hint`].
    pub hint: u64,
    /// Total size of this record, header included, in bytes.
    pub size: u32,
    /// Wire status; see [`crate::status::Status`].
    pub status: u32,
    pub _reserved: u64,
}

pub const HEADER_ALIGNMENT: usize = 8;

/// Rounds `len` up to the wire's 8-byte record alignment.
#[must_use]
pub fn aligned_len(len: usize) -> usize {
    (len + (HEADER_ALIGNMENT - 1)) & !(HEADER_ALIGNMENT - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_slice_respects_bounds() {
        let buf = [0u8; 16];
        let blob = Blob { offset: 4, size: 8 };
        assert_eq!(blob.slice(&buf, 0).unwrap().len(), 8);
        let oob = Blob { offset: 12, size: 8 };
        assert!(oob.slice(&buf, 0).is_none());
    }

    #[test]
    fn blob_slice_rejects_overflowing_size() {
        let buf = [0u8; 16];
        let blob = Blob { offset: 1, size: u32::MAX };
        assert!(blob.slice(&buf, 0).is_none());
    }

    #[test]
    fn blob_slice_rejects_offsets_inside_the_header() {
        let buf = [0u8; 16];
        let blob = Blob { offset: 2, size: 4 };
        assert!(blob.slice(&buf, 8).is_none());
        let past_header = Blob { offset: 8, size: 4 };
        assert!(past_header.slice(&buf, 8).is_some());
    }

    #[test]
    fn blob_slice_allows_an_empty_blob_at_offset_zero() {
        let buf = [0u8; 16];
        assert_eq!(Blob::EMPTY.slice(&buf, 8), Some(&[][..]));
    }

    #[test]
    fn aligned_len_rounds_up_to_eight() {
        assert_eq!(aligned_len(0), 0);
        assert_eq!(aligned_len(1), 8);
        assert_eq!(aligned_len(8), 8);
        assert_eq!(aligned_len(9), 16);
    }
}
