//! `Read`/`Write`/`Flush` handlers.
//!
//! `write_read_response`/`write_write_response` are shared by the
//! synchronous dispatch path here and the deferred-completion path in
//! [`crate::host::PendingReply`], so the wire encoding is written once.

use zerocopy::IntoBytes;

use crate::abi::header::Blob;
use crate::abi::response::{ReadResponseBody, WriteResponseBody};
use crate::abi::{Request, ResponseWriter};
use crate::file_info::FileInfo;
use crate::filesystem::Completion;
use crate::host::Shared;
use crate::status::Status;

pub(crate) fn handle_read(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let body = request.as_read();
    let context = request.object_id();
    let hint = request.hint();
    if let Completion::Done(result) = inner.filesystem.read(context, body.offset, body.length) {
        write_read_response(writer, hint, result);
    }
}

pub(crate) fn handle_write(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let body = request.as_write();
    let context = request.object_id();
    let hint = request.hint();
    let data = match request.blob(body.data) {
        Ok(bytes) => bytes,
        Err(_) => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    let completion = inner.filesystem.write(context, body.offset, data, body.write_to_end_of_file != 0, body.constrained_io != 0);
    if let Completion::Done(result) = completion {
        write_write_response(writer, hint, result);
    }
}

pub(crate) fn handle_flush(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = if request.object_id() == 0 { None } else { Some(request.object_id()) };
    let status = inner.filesystem.flush(context).err().unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}

fn write_read_response(writer: &mut ResponseWriter, hint: u64, result: Result<Vec<u8>, Status>) {
    match result {
        Ok(data) => writer.write_with_blob(
            hint,
            Status::SUCCESS,
            ReadResponseBody { bytes_transferred: data.len() as u32, data: Blob::EMPTY },
            |body, blob| body.data = blob,
            &data,
        ),
        Err(status) => writer.write_status(hint, status),
    }
}

fn write_write_response(writer: &mut ResponseWriter, hint: u64, result: Result<(u32, FileInfo), Status>) {
    match result {
        Ok((bytes_transferred, info)) => {
            let body = WriteResponseBody { bytes_transferred, _reserved: 0, info: info.into() };
            writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
        }
        Err(status) => writer.write_status(hint, status),
    }
}

/// Encodes a complete `Read` response record standalone, for
/// [`crate::host::PendingReply::complete_read`].
pub(crate) fn encode_read_response(hint: u64, result: Result<Vec<u8>, Status>) -> Vec<u8> {
    let mut writer = ResponseWriter::new();
    write_read_response(&mut writer, hint, result);
    writer.into_bytes()
}

/// Encodes a complete `Write` response record standalone, for
/// [`crate::host::PendingReply::complete_write`].
pub(crate) fn encode_write_response(hint: u64, result: Result<(u32, FileInfo), Status>) -> Vec<u8> {
    let mut writer = ResponseWriter::new();
    write_write_response(&mut writer, hint, result);
    writer.into_bytes()
}
