//! `QueryVolumeInformation`/`SetVolumeInformation` handlers.

use crate::abi::header::Blob;
use crate::abi::response::QueryVolumeInformationResponseBody;
use crate::abi::{Request, ResponseWriter};
use crate::host::Shared;
use crate::status::Status;
use crate::volume::VolumeInfo;

use super::{decode_wide, encode_wide};

pub(crate) fn handle_query_volume_information(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    match inner.filesystem.get_volume_info() {
        Ok(info) => write_volume_response(writer, hint, Status::SUCCESS, info),
        Err(status) => writer.write_status(hint, status),
    }
}

pub(crate) fn handle_set_volume_information(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let body = request.as_set_volume_information();
    let label = match request.blob(body.volume_label).ok().and_then(|bytes| decode_wide(bytes).ok()) {
        Some(label) => label,
        None => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    match inner.filesystem.set_volume_label(&label) {
        Ok(info) => write_volume_response(writer, hint, Status::SUCCESS, info),
        Err(status) => writer.write_status(hint, status),
    }
}

fn write_volume_response(writer: &mut ResponseWriter, hint: u64, status: Status, info: VolumeInfo) {
    let label_wire = encode_wide(&info.volume_label);
    writer.write_with_blob(
        hint,
        status,
        QueryVolumeInformationResponseBody { total_size: info.total_size, free_size: info.free_size, volume_label: Blob::EMPTY },
        |body, blob| body.volume_label = blob,
        &label_wire,
    );
}
