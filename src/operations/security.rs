//! `QuerySecurity`/`SetSecurity` handlers.

use crate::abi::header::Blob;
use crate::abi::response::QuerySecurityResponseBody;
use crate::abi::{Request, ResponseWriter};
use crate::host::Shared;
use crate::security::{SecurityDescriptor, SecurityInformation};
use crate::status::Status;

pub(crate) fn handle_query_security(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.get_security(context) {
        Ok(sd) => {
            let bytes = sd.to_bytes();
            writer.write_with_blob(
                hint,
                Status::SUCCESS,
                QuerySecurityResponseBody { security_descriptor: Blob::EMPTY },
                |body, blob| body.security_descriptor = blob,
                &bytes,
            );
        }
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_security(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_set_security();
    let what_to_modify = SecurityInformation::from_bits_truncate(body.security_information);
    let template = match request.blob(body.security_descriptor).ok().and_then(SecurityDescriptor::from_bytes) {
        Some(sd) => sd,
        None => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    let status = inner.filesystem.set_security(context, what_to_modify, &template).err().unwrap_or(Status::SUCCESS);
    writer.write_status(hint, status);
}
