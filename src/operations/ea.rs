//! `QueryStreamInformation`/`GetExtendedAttributes`/`SetExtendedAttributes`
//! handlers.

use zerocopy::IntoBytes;

use crate::abi::header::Blob;
use crate::abi::response::{GetExtendedAttributesResponseBody, QueryInformationResponseBody, QueryStreamInformationResponseBody};
use crate::abi::{Request, ResponseWriter};
use crate::ea::{decode_ea_list, encode_ea_list};
use crate::host::Shared;
use crate::status::Status;

use super::encode_wide;

pub(crate) fn handle_query_stream_information(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.get_stream_info(context) {
        Ok(streams) => {
            let mut bytes = Vec::new();
            for (name, size) in &streams {
                let name_wire = encode_wide(name);
                bytes.extend_from_slice(&(name_wire.len() as u32).to_le_bytes());
                bytes.extend_from_slice(&size.to_le_bytes());
                bytes.extend_from_slice(&name_wire);
            }
            writer.write_with_blob(
                hint,
                Status::SUCCESS,
                QueryStreamInformationResponseBody { streams: Blob::EMPTY },
                |body, blob| body.streams = blob,
                &bytes,
            );
        }
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_get_ea(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    match inner.filesystem.get_ea(context) {
        Ok(entries) => {
            let bytes = encode_ea_list(&entries);
            writer.write_with_blob(
                hint,
                Status::SUCCESS,
                GetExtendedAttributesResponseBody { ea_list: Blob::EMPTY },
                |body, blob| body.ea_list = blob,
                &bytes,
            );
        }
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_ea(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let body = request.as_set_extended_attributes();
    let entries = match request.blob(body.ea_list) {
        Ok(bytes) => decode_ea_list(bytes),
        Err(_) => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    match inner.filesystem.set_ea(context, &entries) {
        Ok(info) => {
            let body = QueryInformationResponseBody { info: info.into() };
            writer.write_body(hint, Status::SUCCESS, body.as_bytes(), &[]);
        }
        Err(status) => writer.write_status(hint, status),
    }
}
