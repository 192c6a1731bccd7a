//! Per-opcode response bodies and a [`ResponseWriter`] that appends encoded
//! records into a batch output buffer.
//!
//! The dispatcher accumulates one or more responses into a single outbound
//! batch before handing it back to the transport, so encoding here appends to
//! a shared `Vec<u8>` rather than issuing its own write.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::header::{aligned_len, Blob, ResponseHeader};
use crate::file_info::FileInfo;
use crate::status::Status;

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FileInfoWire {
    pub file_attributes: u32,
    pub reparse_tag: u32,
    pub allocation_size: u64,
    pub file_size: u64,
    pub creation_time: u64,
    pub last_access_time: u64,
    pub last_write_time: u64,
    pub change_time: u64,
    pub index_number: u64,
    pub hard_links: u32,
    pub ea_size: u32,
}

impl From<FileInfo> for FileInfoWire {
    fn from(info: FileInfo) -> Self {
        FileInfoWire {
            file_attributes: info.file_attributes.bits(),
            reparse_tag: info.reparse_tag,
            allocation_size: info.allocation_size,
            file_size: info.file_size,
            creation_time: info.creation_time.0,
            last_access_time: info.last_access_time.0,
            last_write_time: info.last_write_time.0,
            change_time: info.change_time.0,
            index_number: info.index_number,
            hard_links: info.hard_links,
            ea_size: info.ea_size,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CreateResponseBody {
    pub object_id: u64,
    pub info: FileInfoWire,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ReadResponseBody {
    pub bytes_transferred: u32,
    pub data: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WriteResponseBody {
    pub bytes_transferred: u32,
    pub _reserved: u32,
    pub info: FileInfoWire,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryInformationResponseBody {
    pub info: FileInfoWire,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryVolumeInformationResponseBody {
    pub total_size: u64,
    pub free_size: u64,
    pub volume_label: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryDirectoryResponseBody {
    pub entries: Blob,
    pub bytes_transferred: u32,
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QuerySecurityResponseBody {
    pub security_descriptor: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetReparsePointResponseBody {
    pub reparse_data: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetExtendedAttributesResponseBody {
    pub ea_list: Blob,
}

/// Answer to `QueryStreamInformation`: a blob of `{name_len: u32, size: u64,
/// name}` records, one per named stream.
#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryStreamInformationResponseBody {
    pub streams: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CanDeleteResponseBody {
    pub _reserved: u32,
}

/// Appends encoded response records into a shared batch output buffer.
///
/// One `ResponseWriter` is handed to a worker for the lifetime of a batch
/// exchange; each call to [`ResponseWriter::write`] appends one
/// aligned record.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    buf: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        ResponseWriter { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a bare status with no body (e.g. `Close`, error replies).
    pub fn write_status(&mut self, hint: u64, status: Status) {
        self.write_body(hint, status, &[], &[]);
    }

    /// Writes a fixed body plus an optional variable-length tail, padding the
    /// record to [`super::header::HEADER_ALIGNMENT`] so the next header in the
    /// batch starts aligned.
    pub fn write_body(&mut self, hint: u64, status: Status, body: &[u8], tail: &[u8]) {
        let header_size = std::mem::size_of::<ResponseHeader>();
        let unpadded = header_size + body.len() + tail.len();
        let total = aligned_len(unpadded);
        let header = ResponseHeader {
            size: total as u32,
            hint,
            status: status.0,
            _reserved: 0,
        };
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(tail);
        self.buf.resize(self.buf.len() + (total - unpadded), 0);
    }

    /// Writes a fixed body with a trailing blob whose bytes are appended after
    /// the body, filling in `blob_field`'s offset/size before encoding.
    pub fn write_with_blob<T: IntoBytes + Immutable>(
        &mut self,
        hint: u64,
        status: Status,
        mut body: T,
        blob_field: impl FnOnce(&mut T, Blob),
        blob_bytes: &[u8],
    ) {
        let header_size = std::mem::size_of::<ResponseHeader>();
        let body_size = std::mem::size_of::<T>();
        let blob = Blob {
            offset: (header_size + body_size) as u32,
            size: blob_bytes.len() as u32,
        };
        blob_field(&mut body, blob);
        self.write_body(hint, status, body.as_bytes(), blob_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_status_pads_to_alignment() {
        let mut writer = ResponseWriter::new();
        writer.write_status(1, Status::SUCCESS);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len() % 8, 0);
    }

    #[test]
    fn write_with_blob_places_offsets_correctly() {
        let mut writer = ResponseWriter::new();
        writer.write_with_blob(
            9,
            Status::SUCCESS,
            QuerySecurityResponseBody { security_descriptor: Blob::EMPTY },
            |body, blob| body.security_descriptor = blob,
            &[1, 2, 3, 4],
        );
        let bytes = writer.into_bytes();
        let header = ResponseHeader::read_from_bytes(&bytes[..std::mem::size_of::<ResponseHeader>()]).unwrap();
        assert_eq!(header.hint, 9);
        let body_start = std::mem::size_of::<ResponseHeader>();
        let body = QuerySecurityResponseBody::read_from_bytes(
            &bytes[body_start..body_start + std::mem::size_of::<QuerySecurityResponseBody>()],
        )
        .unwrap();
        let blob_bytes = body.security_descriptor.slice(&bytes, std::mem::size_of::<ResponseHeader>()).unwrap();
        assert_eq!(blob_bytes, &[1, 2, 3, 4]);
    }
}
