//! Per-opcode request bodies and the top-level [`Request`] decoder.
//!
//! Each body is a fixed-size `#[repr(C)]` struct decoded in place with
//! `zerocopy`; variable-length data (names, write payloads, security
//! descriptors) is addressed through a [`Blob`] into the surrounding batch
//! buffer rather than copied out, so request data stays borrowed from the
//! channel's read buffer for the lifetime of the dispatch call.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::header::{Blob, RequestHeader};
use super::opcode::Opcode;
use crate::attributes::{CreateOptions, DesiredAccess, FileAttributes, ShareMode};
use crate::transport::TransportError;

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CreateRequestBody {
    pub desired_access: u32,
    pub file_attributes: u32,
    pub share_mode: u32,
    pub create_options: u32,
    pub create_disposition: u32,
    pub security_descriptor: Blob,
    pub extra_buffer: Blob,
    pub path: Blob,
}

impl CreateRequestBody {
    pub fn desired_access(&self) -> DesiredAccess {
        DesiredAccess::from_bits_truncate(self.desired_access)
    }

    pub fn file_attributes(&self) -> FileAttributes {
        FileAttributes::from_bits_truncate(self.file_attributes)
    }

    pub fn share_mode(&self) -> ShareMode {
        ShareMode::from_bits_truncate(self.share_mode)
    }

    pub fn create_options(&self) -> CreateOptions {
        CreateOptions::from_bits_truncate(self.create_options)
    }
}

/// Body of an `Overwrite` request: truncates an already-open file, either to
/// zero (`SUPERSEDE`-style) or to a caller-supplied allocation size, and
/// optionally stamps new file attributes.
#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct OverwriteRequestBody {
    pub file_attributes: u32,
    pub supersede: u32,
    pub allocation_size: u64,
}

impl OverwriteRequestBody {
    pub fn file_attributes(&self) -> FileAttributes {
        FileAttributes::from_bits_truncate(self.file_attributes)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CleanupRequestBody {
    pub delete_pending: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CloseRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ReadRequestBody {
    pub offset: u64,
    pub length: u32,
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WriteRequestBody {
    pub offset: u64,
    pub write_to_end_of_file: u32,
    pub constrained_io: u32,
    pub data: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FlushRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryInformationRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetInformationRequestBody {
    pub file_attributes: u32,
    pub delete_pending: u32,
    /// Nonzero when the rename carried in `new_name` should use POSIX
    /// replace-existing-target semantics rather than Win32's.
    pub posix_semantics: u32,
    pub _reserved: u32,
    pub creation_time: u64,
    pub last_access_time: u64,
    pub last_write_time: u64,
    pub change_time: u64,
    pub file_size: u64,
    pub allocation_size: u64,
    pub new_name: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryVolumeInformationRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetVolumeInformationRequestBody {
    pub volume_label: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryDirectoryRequestBody {
    pub marker: Blob,
    pub pattern: Blob,
    pub buffer_size: u32,
    pub restart_scan: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FileSystemControlRequestBody {
    pub control_code: u32,
    pub input: Blob,
    pub output_size: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct DeviceControlRequestBody {
    pub control_code: u32,
    pub input: Blob,
    pub output_size: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QuerySecurityRequestBody {
    pub requested_information: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetSecurityRequestBody {
    pub security_information: u32,
    pub security_descriptor: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryStreamInformationRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetReparsePointRequestBody {
    pub buffer_size: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetReparsePointRequestBody {
    pub reparse_data: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetExtendedAttributesRequestBody {
    pub buffer_size: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetExtendedAttributesRequestBody {
    pub ea_list: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct LockRequestBody {
    pub offset: u64,
    pub length: u64,
    pub exclusive: u32,
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct UnlockRequestBody {
    pub offset: u64,
    pub length: u64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CanDeleteRequestBody {
    pub _reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct RenameRequestBody {
    pub replace_if_exists: u32,
    /// Nonzero selects POSIX replace-existing-target semantics (see spec
    /// §4.7's `Rename` contract) rather than Win32's.
    pub posix_semantics: u32,
    pub new_path: Blob,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetDeleteRequestBody {
    pub delete_pending: u32,
}

/// A decoded request: the fixed header plus the opcode-specific fixed body,
/// still backed by the original batch buffer.
#[derive(Debug)]
pub struct Request<'a> {
    pub header: RequestHeader,
    pub opcode: Opcode,
    pub batch: &'a [u8],
    body_offset: usize,
}

macro_rules! body_accessor {
    ($name:ident, $ty:ty) => {
        /// Reinterprets the body region as the matching fixed struct.
        ///
        /// # Panics
        /// Panics if called for the wrong opcode; callers dispatch on
        /// `self.opcode` first, so this is a programming error, not an
        /// untrusted-input condition.
        pub fn $name(&self) -> &'a $ty {
            <$ty>::ref_from_bytes(&self.batch[self.body_offset..self.body_offset + std::mem::size_of::<$ty>()])
                .expect("body region sized for opcode")
        }
    };
}

impl<'a> Request<'a> {
    /// Decodes a request record from `batch`, validating the header and that
    /// the declared size fits within the buffer.
    pub fn decode(batch: &'a [u8]) -> Result<Request<'a>, TransportError> {
        let header_size = std::mem::size_of::<RequestHeader>();
        if batch.len() < header_size {
            return Err(TransportError::Truncated);
        }
        let header = RequestHeader::read_from_bytes(&batch[..header_size])
            .map_err(|_| TransportError::Truncated)?;
        let total = header.size as usize;
        if total < header_size || total > batch.len() {
            return Err(TransportError::RecordSizeOutOfRange {
                declared: header.size,
                available: batch.len(),
            });
        }
        let opcode = Opcode::try_from(header.opcode)
            .map_err(|_| TransportError::UnknownOpcode(header.opcode))?;
        Ok(Request {
            header,
            opcode,
            batch: &batch[..total],
            body_offset: header_size,
        })
    }

    pub fn hint(&self) -> u64 {
        self.header.hint
    }

    pub fn object_id(&self) -> u64 {
        self.header.object_id
    }

    pub fn process_id(&self) -> u32 {
        self.header.process_id
    }

    body_accessor!(as_create, CreateRequestBody);
    body_accessor!(as_overwrite, OverwriteRequestBody);
    body_accessor!(as_cleanup, CleanupRequestBody);
    body_accessor!(as_close, CloseRequestBody);
    body_accessor!(as_read, ReadRequestBody);
    body_accessor!(as_write, WriteRequestBody);
    body_accessor!(as_flush, FlushRequestBody);
    body_accessor!(as_query_information, QueryInformationRequestBody);
    body_accessor!(as_set_information, SetInformationRequestBody);
    body_accessor!(as_query_volume_information, QueryVolumeInformationRequestBody);
    body_accessor!(as_set_volume_information, SetVolumeInformationRequestBody);
    body_accessor!(as_query_directory, QueryDirectoryRequestBody);
    body_accessor!(as_file_system_control, FileSystemControlRequestBody);
    body_accessor!(as_device_control, DeviceControlRequestBody);
    body_accessor!(as_query_security, QuerySecurityRequestBody);
    body_accessor!(as_set_security, SetSecurityRequestBody);
    body_accessor!(as_query_stream_information, QueryStreamInformationRequestBody);
    body_accessor!(as_get_reparse_point, GetReparsePointRequestBody);
    body_accessor!(as_set_reparse_point, SetReparsePointRequestBody);
    body_accessor!(as_get_extended_attributes, GetExtendedAttributesRequestBody);
    body_accessor!(as_set_extended_attributes, SetExtendedAttributesRequestBody);
    body_accessor!(as_lock, LockRequestBody);
    body_accessor!(as_unlock, UnlockRequestBody);
    body_accessor!(as_can_delete, CanDeleteRequestBody);
    body_accessor!(as_rename, RenameRequestBody);
    body_accessor!(as_set_delete, SetDeleteRequestBody);

    /// Resolves a [`Blob`] field against this request's batch buffer,
    /// rejecting one that starts inside the fixed header.
    pub fn blob(&self, blob: Blob) -> Result<&'a [u8], TransportError> {
        blob.slice(self.batch, self.body_offset)
            .ok_or(TransportError::BlobOutOfRange { offset: blob.offset, size: blob.size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    fn encode_minimal(opcode: u32) -> Vec<u8> {
        let header = RequestHeader {
            size: (std::mem::size_of::<RequestHeader>() + std::mem::size_of::<CloseRequestBody>()) as u32,
            opcode,
            hint: 42,
            object_id: 7,
            process_id: 100,
            _reserved: 0,
        };
        let body = CloseRequestBody { _reserved: 0 };
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }

    #[test]
    fn decodes_known_opcode() {
        let bytes = encode_minimal(Opcode::Close as u32);
        let req = Request::decode(&bytes).expect("decodes");
        assert_eq!(req.hint(), 42);
        assert_eq!(req.object_id(), 7);
    }

    #[test]
    fn rejects_unknown_opcode() {
        let bytes = encode_minimal(999);
        assert!(matches!(Request::decode(&bytes), Err(TransportError::UnknownOpcode(999))));
    }

    #[test]
    fn rejects_oversized_declared_length() {
        let mut bytes = encode_minimal(Opcode::Close as u32);
        let header_size = std::mem::size_of::<RequestHeader>();
        bytes[0..4].copy_from_slice(&(bytes.len() as u32 + 100).to_le_bytes());
        let _ = header_size;
        assert!(matches!(
            Request::decode(&bytes),
            Err(TransportError::RecordSizeOutOfRange { .. })
        ));
    }
}
