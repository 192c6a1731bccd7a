//! Opcode dispatch: routes a decoded request to the matching
//! per-concern handler, one `match` arm per member of this protocol's
//! ~20-opcode set.

pub(crate) mod control;
pub(crate) mod create;
pub(crate) mod directory;
pub(crate) mod ea;
pub(crate) mod info;
pub(crate) mod io;
pub(crate) mod reparse;
pub(crate) mod security;
pub(crate) mod volume;

use crate::abi::{Opcode, Request, ResponseWriter};
use crate::host::Shared;
use crate::status::Status;

/// Routes one decoded request to its handler, appending the response (if
/// any) to `writer`. A handler that decides the operation is PENDING simply
/// appends nothing; the eventual out-of-band reply goes through
/// [`crate::host::PendingReply`] instead.
pub(crate) fn dispatch(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    match request.opcode {
        Opcode::Create => create::handle_create(inner, request, writer),
        Opcode::Overwrite => create::handle_overwrite(inner, request, writer),
        Opcode::Cleanup => info::handle_cleanup(inner, request, writer),
        Opcode::Close => info::handle_close(inner, request, writer),
        Opcode::Read => io::handle_read(inner, request, writer),
        Opcode::Write => io::handle_write(inner, request, writer),
        Opcode::Flush => io::handle_flush(inner, request, writer),
        Opcode::QueryInformation => info::handle_query_information(inner, request, writer),
        Opcode::SetInformation => info::handle_set_information(inner, request, writer),
        Opcode::QueryVolumeInformation => volume::handle_query_volume_information(inner, request, writer),
        Opcode::SetVolumeInformation => volume::handle_set_volume_information(inner, request, writer),
        Opcode::QueryDirectory => directory::handle_query_directory(inner, request, writer),
        Opcode::FileSystemControl => control::handle_filesystem_control(inner, request, writer),
        Opcode::DeviceControl => control::handle_device_control(inner, request, writer),
        Opcode::QuerySecurity => security::handle_query_security(inner, request, writer),
        Opcode::SetSecurity => security::handle_set_security(inner, request, writer),
        Opcode::QueryStreamInformation => ea::handle_query_stream_information(inner, request, writer),
        Opcode::GetReparsePoint => reparse::handle_get_reparse_point(inner, request, writer),
        Opcode::SetReparsePoint => reparse::handle_set_reparse_point(inner, request, writer),
        Opcode::GetExtendedAttributes => ea::handle_get_ea(inner, request, writer),
        Opcode::SetExtendedAttributes => ea::handle_set_ea(inner, request, writer),
        Opcode::Lock => info::handle_lock(inner, request, writer),
        Opcode::Unlock => info::handle_unlock(inner, request, writer),
        Opcode::CanDelete => info::handle_can_delete(inner, request, writer),
        Opcode::Rename => info::handle_rename(inner, request, writer),
        Opcode::SetDelete => info::handle_set_delete(inner, request, writer),
    }
}

/// Decodes a little-endian UTF-16 byte blob into a `String`: every path,
/// name, and label field on the wire is UTF-16.
pub(crate) fn decode_wide(bytes: &[u8]) -> Result<String, Status> {
    if bytes.len() % 2 != 0 {
        return Err(Status::INVALID_PARAMETER);
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
    String::from_utf16(&units).map_err(|_| Status::INVALID_PARAMETER)
}

/// Encodes a `String` into the wire's little-endian UTF-16 byte form.
pub(crate) fn encode_wide(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_string_round_trips() {
        let encoded = encode_wide("hello");
        assert_eq!(decode_wide(&encoded).unwrap(), "hello");
    }

    #[test]
    fn decode_wide_rejects_odd_length() {
        assert_eq!(decode_wide(&[1, 2, 3]), Err(Status::INVALID_PARAMETER));
    }
}
