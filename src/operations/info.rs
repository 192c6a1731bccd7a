//! `Cleanup`/`Close`/`QueryInformation`/`SetInformation`/`CanDelete`/
//! `SetDelete`/`Rename`/`Lock`/`Unlock` handlers.
//!
//! `SetInformation`'s wire body bundles basic-info fields, delete-pending,
//! an end-of-file size, and an optional rename target into one record,
//! unlike the separate `FileBasicInformation`/`FileRenameInformation`/
//! `FileEndOfFileInformation` classes `NtSetInformationFile` dispatches on.
//! `handle_set_information` applies each piece present in the body in turn —
//! rename first, then basic info, then delete-pending, then size — and
//! reports whichever call last produced a `FileInfo`. Renames run under the
//! same exclusive bracket the standalone `Rename` opcode uses, since both mutate the namespace.

use zerocopy::IntoBytes;

use crate::abi::response::{CanDeleteResponseBody, QueryInformationResponseBody};
use crate::abi::{Request, ResponseWriter};
use crate::attributes::FileAttributes;
use crate::file_info::FileTime;
use crate::filesystem::{CleanupFlags, FileSizeOperation};
use crate::host::Shared;
use crate::status::Status;

use super::decode_wide;

pub(crate) fn handle_cleanup(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_cleanup();
    let path = inner.paths.get(&context).map(|entry| entry.clone()).unwrap_or_default();
    let flags = CleanupFlags {
        delete: body.delete_pending != 0,
        set_allocation_size: false,
        set_archive: false,
        set_last_access_time: false,
        set_last_write_time: false,
        set_change_time: false,
    };
    inner.filesystem.cleanup(context, &path, flags);
    writer.write_status(hint, Status::SUCCESS);
}

pub(crate) fn handle_close(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    inner.filesystem.close(context);
    inner.dirbuffers.remove(&context);
    inner.paths.remove(&context);
    writer.write_status(hint, Status::SUCCESS);
}

pub(crate) fn handle_query_information(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.get_file_info(context) {
        Ok(info) => write_info(writer, hint, info),
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_information(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_set_information();

    if !body.new_name.is_empty() {
        let new_path = match request.blob(body.new_name).ok().and_then(|bytes| decode_wide(bytes).ok()) {
            Some(path) => path,
            None => return writer.write_status(hint, Status::INVALID_PARAMETER),
        };
        let posix_semantics = body.posix_semantics != 0;
        let rename_result =
            inner.notifier.with_rename_exclusive(|| inner.filesystem.rename(context, &new_path, false, posix_semantics));
        if let Err(status) = rename_result {
            return writer.write_status(hint, status);
        }
    }

    let mut latest_info = match inner.filesystem.set_basic_info(
        context,
        Some(FileAttributes::from_bits_truncate(body.file_attributes)),
        Some(FileTime(body.creation_time)),
        Some(FileTime(body.last_access_time)),
        Some(FileTime(body.last_write_time)),
        Some(FileTime(body.change_time)),
    ) {
        Ok(info) => Some(info),
        Err(status) => return writer.write_status(hint, status),
    };

    if body.delete_pending != 0 {
        if let Err(status) = inner.filesystem.set_delete(context, true) {
            return writer.write_status(hint, status);
        }
    }

    match inner.filesystem.set_file_size(context, body.file_size, FileSizeOperation::EndOfFile) {
        Ok(info) => latest_info = Some(info),
        Err(Status::NOT_IMPLEMENTED) => {}
        Err(status) => return writer.write_status(hint, status),
    }

    write_info(writer, hint, latest_info.expect("set_basic_info always returns a FileInfo on success"));
}

pub(crate) fn handle_can_delete(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.can_delete(context) {
        Ok(()) => {
            let body = CanDeleteResponseBody { _reserved: 0 };
            writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
        }
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_delete(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_set_delete();
    let status = inner.filesystem.set_delete(context, body.delete_pending != 0).err().unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}

pub(crate) fn handle_rename(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_rename();
    let new_path = match request.blob(body.new_path).ok().and_then(|bytes| decode_wide(bytes).ok()) {
        Some(path) => path,
        None => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    let replace_if_exists = body.replace_if_exists != 0;
    let posix_semantics = body.posix_semantics != 0;
    let status = inner
        .notifier
        .with_rename_exclusive(|| inner.filesystem.rename(context, &new_path, replace_if_exists, posix_semantics))
        .err()
        .unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}

pub(crate) fn handle_lock(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_lock();
    let status = inner.filesystem.lock(context, body.offset, body.length, body.exclusive != 0).err().unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}

pub(crate) fn handle_unlock(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_unlock();
    let status = inner.filesystem.unlock(context, body.offset, body.length).err().unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}

fn write_info(writer: &mut ResponseWriter, hint: u64, info: crate::file_info::FileInfo) {
    let body = QueryInformationResponseBody { info: info.into() };
    writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
}
