//! `GetReparsePoint`/`SetReparsePoint` handlers. An empty
//! blob on `SetReparsePoint` means "delete the reparse point", matching the
//! FSCTL convention this wire format follows.

use crate::abi::header::Blob;
use crate::abi::response::GetReparsePointResponseBody;
use crate::abi::{Request, ResponseWriter};
use crate::host::Shared;
use crate::status::Status;

pub(crate) fn handle_get_reparse_point(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.get_reparse_point(context) {
        Ok(data) => writer.write_with_blob(
            hint,
            Status::SUCCESS,
            GetReparsePointResponseBody { reparse_data: Blob::EMPTY },
            |body, blob| body.reparse_data = blob,
            &data,
        ),
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_reparse_point(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_set_reparse_point();
    let status = if body.reparse_data.is_empty() {
        inner.filesystem.delete_reparse_point(context).err().unwrap_or(Status::SUCCESS)
    } else {
        match request.blob(body.reparse_data) {
            Ok(data) => inner.filesystem.set_reparse_point(context, data).err().unwrap_or(Status::SUCCESS),
            Err(_) => Status::INVALID_PARAMETER,
        }
    };
    writer.write_status(hint, status);
}
