//! `QueryDirectory` handling: fills a context's
//! [`DirBuffer`] on the first chunk of an enumeration, then serves every
//! chunk — including this one — straight from the buffer.
//!
//! Each entry is serialized as an NTFS `FILE_ID_BOTH_DIR_INFORMATION`-style
//! record with a `next_entry_offset` chain.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::abi::header::{aligned_len, Blob};
use crate::abi::response::{FileInfoWire, QueryDirectoryResponseBody};
use crate::abi::{Request, ResponseWriter};
use crate::dirbuffer::DirBuffer;
use crate::file_info::FileInfo;
use crate::filesystem::Completion;
use crate::host::Shared;
use crate::status::Status;

use super::{decode_wide, encode_wide};

#[repr(C)]
#[derive(Clone, Copy, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
struct DirectoryEntryWire {
    next_entry_offset: u32,
    file_index: u32,
    info: FileInfoWire,
    file_name_length: u32,
    _reserved: u32,
}

pub(crate) fn handle_query_directory(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_query_directory();

    let marker = match blob_to_optional_string(request, body.marker) {
        Ok(value) => value,
        Err(status) => return writer.write_status(hint, status),
    };
    let pattern = match blob_to_optional_string(request, body.pattern) {
        Ok(value) => value,
        Err(status) => return writer.write_status(hint, status),
    };

    let entry = inner.dirbuffers.entry(context).or_default();
    let mut dirbuffer = entry.lock();
    let needs_fill = dirbuffer.acquire(body.restart_scan != 0, 16);
    if needs_fill {
        match inner.filesystem.read_directory(context, pattern.as_deref()) {
            Completion::Pending => return,
            Completion::Done(Ok(entries)) => {
                for (name, info) in entries {
                    dirbuffer.fill(name, info);
                }
                dirbuffer.release();
            }
            Completion::Done(Err(status)) => return writer.write_status(hint, status),
        }
    }

    let (bytes, status) = encode_chunk(&dirbuffer, marker.as_deref(), body.buffer_size);
    write_response(writer, hint, status, bytes);
}

/// Fills `dirbuffer` from a deferred `read_directory`'s result and encodes
/// the first chunk, for
/// [`crate::host::PendingReply::complete_query_directory`]. The marker is
/// always `None` here: PENDING can only arise on the first chunk of an
/// enumeration.
pub(crate) fn fill_and_encode_first_chunk(dirbuffer: &mut DirBuffer, result: Result<Vec<(String, FileInfo)>, Status>, buffer_size: u32, hint: u64) -> Vec<u8> {
    let mut writer = ResponseWriter::new();
    match result {
        Ok(entries) => {
            dirbuffer.acquire(true, entries.len());
            for (name, info) in entries {
                dirbuffer.fill(name, info);
            }
            dirbuffer.release();
            let (bytes, status) = encode_chunk(dirbuffer, None, buffer_size);
            write_response(&mut writer, hint, status, bytes);
        }
        Err(status) => writer.write_status(hint, status),
    }
    writer.into_bytes()
}

fn blob_to_optional_string(request: &Request<'_>, blob: Blob) -> Result<Option<String>, Status> {
    if blob.is_empty() {
        return Ok(None);
    }
    let bytes = request.blob(blob).map_err(|_| Status::INVALID_PARAMETER)?;
    decode_wide(bytes).map(Some)
}

fn write_response(writer: &mut ResponseWriter, hint: u64, status: Status, entries: Vec<u8>) {
    writer.write_with_blob(
        hint,
        status,
        QueryDirectoryResponseBody { entries: Blob::EMPTY, bytes_transferred: entries.len() as u32, _reserved: 0 },
        |body, blob| body.entries = blob,
        &entries,
    );
}

/// Serializes entries strictly after `marker` into a `next_entry_offset`
/// chain, each padded to the wire's 8-byte alignment, stopping once the next
/// entry would exceed `buffer_size`. Returns [`Status::BUFFER_OVERFLOW`] if
/// not even the first entry fit; otherwise, if nothing was left to serve,
/// distinguishes the first chunk of a scan (`marker` is `None`) — which
/// reports [`Status::SUCCESS`] with a zero-size terminator even for an empty
/// directory — from a later chunk genuinely reaching end-of-scan, which
/// reports [`Status::NO_MORE_FILES`]; otherwise [`Status::SUCCESS`].
fn encode_chunk(dirbuffer: &DirBuffer, marker: Option<&str>, buffer_size: u32) -> (Vec<u8>, Status) {
    let mut out = Vec::new();
    let mut starts = Vec::new();
    let mut overflowed = false;

    dirbuffer.read(marker, |name, info| {
        let name_wire = encode_wide(name);
        let unpadded = std::mem::size_of::<DirectoryEntryWire>() + name_wire.len();
        let padded = aligned_len(unpadded);
        if out.len() + padded > buffer_size as usize {
            overflowed = true;
            return false;
        }
        let start = out.len();
        let wire = DirectoryEntryWire {
            next_entry_offset: 0,
            file_index: starts.len() as u32,
            info: FileInfoWire::from(*info),
            file_name_length: name_wire.len() as u32,
            _reserved: 0,
        };
        starts.push(start);
        out.extend_from_slice(wire.as_bytes());
        out.extend_from_slice(&name_wire);
        out.resize(start + padded, 0);
        true
    });

    for i in 0..starts.len().saturating_sub(1) {
        let next_offset = (starts[i + 1] - starts[i]) as u32;
        out[starts[i]..starts[i] + 4].copy_from_slice(&next_offset.to_le_bytes());
    }

    if starts.is_empty() {
        let status = if overflowed {
            Status::BUFFER_OVERFLOW
        } else if marker.is_none() {
            Status::SUCCESS
        } else {
            Status::NO_MORE_FILES
        };
        (Vec::new(), status)
    } else {
        (out, Status::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer() -> DirBuffer {
        let mut buf = DirBuffer::new();
        buf.acquire(true, 2);
        buf.fill("alpha", FileInfo::default());
        buf.fill("bravo", FileInfo::default());
        buf.release();
        buf
    }

    #[test]
    fn encodes_all_entries_when_buffer_is_large_enough() {
        let buf = sample_buffer();
        let (bytes, status) = encode_chunk(&buf, None, 4096);
        assert_eq!(status, Status::SUCCESS);
        assert!(!bytes.is_empty());
    }

    #[test]
    fn reports_buffer_overflow_when_nothing_fits() {
        let buf = sample_buffer();
        let (bytes, status) = encode_chunk(&buf, None, 4);
        assert_eq!(status, Status::BUFFER_OVERFLOW);
        assert!(bytes.is_empty());
    }

    #[test]
    fn first_chunk_of_an_empty_directory_is_success_with_a_zero_size_terminator() {
        let buf = DirBuffer::new();
        let (bytes, status) = encode_chunk(&buf, None, 4096);
        assert_eq!(status, Status::SUCCESS);
        assert!(bytes.is_empty());
    }

    #[test]
    fn later_chunk_past_the_last_entry_reports_no_more_files() {
        let buf = sample_buffer();
        let (bytes, status) = encode_chunk(&buf, Some("bravo"), 4096);
        assert_eq!(status, Status::NO_MORE_FILES);
        assert!(bytes.is_empty());
    }

    #[test]
    fn stops_part_way_through_when_the_buffer_is_too_small_for_everything() {
        let buf = sample_buffer();
        let full_len = encode_chunk(&buf, None, 4096).0.len();
        let one_entry_len = full_len / 2;
        let (bytes, status) = encode_chunk(&buf, None, one_entry_len as u32);
        assert_eq!(status, Status::SUCCESS);
        assert!(bytes.len() < full_len);
    }
}
