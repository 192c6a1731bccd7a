//! `Create`/`Overwrite` handlers.
//!
//! Resolve the path, call into the application, and turn its answer into a
//! reply. The reparse-chase loop walks the path-resolution chain with a
//! fixed iteration cap rather than true recursion.

use zerocopy::IntoBytes;

use crate::abi::response::CreateResponseBody;
use crate::abi::{Request, ResponseWriter};
use crate::filesystem::CreateOutcome;
use crate::host::Shared;
use crate::security::SecurityDescriptor;
use crate::status::Status;

use super::{decode_wide, encode_wide};

/// Upper bound on how many reparse points [`resolve_path`] will follow before
/// giving up, matching supplemented "reparse-chase iteration cap".
const MAX_REPARSE_CHASE: usize = 32;

pub(crate) fn handle_create(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let body = request.as_create();

    let path_bytes = match request.blob(body.path) {
        Ok(bytes) => bytes,
        Err(_) => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    let path = match decode_wide(path_bytes) {
        Ok(path) => path,
        Err(status) => return writer.write_status(hint, status),
    };
    let path = match resolve_path(inner, path) {
        Ok(path) => path,
        Err(status) => return writer.write_status(hint, status),
    };

    let security_descriptor = if body.security_descriptor.is_empty() {
        None
    } else {
        match request.blob(body.security_descriptor).ok().and_then(SecurityDescriptor::from_bytes) {
            Some(sd) => Some(sd),
            None => return writer.write_status(hint, Status::INVALID_PARAMETER),
        }
    };

    let outcome = inner.filesystem.create(
        &path,
        body.desired_access(),
        body.file_attributes(),
        body.share_mode(),
        body.create_options(),
        security_descriptor.as_ref(),
    );

    match outcome {
        Ok(CreateOutcome::Opened { context, info }) => {
            inner.paths.insert(context, path);
            let body = CreateResponseBody { object_id: context, info: info.into() };
            writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
        }
        Ok(CreateOutcome::Reparse { target }) => {
            writer.write_body(hint, Status::REPARSE, &[], &encode_wide(&target));
        }
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_overwrite(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_overwrite();

    match inner.filesystem.overwrite(context, body.file_attributes(), body.supersede != 0, body.allocation_size) {
        Ok(info) => {
            let body = crate::abi::response::QueryInformationResponseBody { info: info.into() };
            writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
        }
        Err(status) => writer.write_status(hint, status),
    }
}

/// Walks `path` through [`crate::filesystem::FileSystem::resolve_reparse_point`]
/// until it resolves to a non-reparse target or [`MAX_REPARSE_CHASE`] is
/// reached, at which point the chain is treated as a loop and rejected.
fn resolve_path(inner: &Shared, mut path: String) -> Result<String, Status> {
    for _ in 0..MAX_REPARSE_CHASE {
        match inner.filesystem.resolve_reparse_point(&path) {
            Ok(Some(target)) => path = target,
            Ok(None) => return Ok(path),
            Err(status) => return Err(status),
        }
    }
    Err(Status::UNSUCCESSFUL)
}
