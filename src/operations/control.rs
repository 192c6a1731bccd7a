//! `FileSystemControl`/`DeviceControl` handlers. Both wire
//! bodies are structurally identical (`control_code`, input blob, max output
//! size), so they share one implementation.

use crate::abi::{Opcode, Request, ResponseWriter};
use crate::host::Shared;
use crate::status::Status;

pub(crate) fn handle_filesystem_control(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    handle_control(inner, request, writer);
}

pub(crate) fn handle_device_control(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    handle_control(inner, request, writer);
}

fn handle_control(inner: &Shared, request: &Request<'_>, writer: &mut ResponseWriter) {
    let hint = request.hint();
    let context = request.object_id();
    let (control_code, input_blob, output_size) = if request.opcode == Opcode::FileSystemControl {
        let body = request.as_file_system_control();
        (body.control_code, body.input, body.output_size)
    } else {
        let body = request.as_device_control();
        (body.control_code, body.input, body.output_size)
    };
    let input = match request.blob(input_blob) {
        Ok(bytes) => bytes,
        Err(_) => return writer.write_status(hint, Status::INVALID_PARAMETER),
    };
    match inner.filesystem.control(context, control_code, input) {
        Ok(output) if output.len() > output_size as usize => writer.write_status(hint, Status::BUFFER_OVERFLOW),
        Ok(output) => writer.write_body(hint, Status::SUCCESS, &[], &output),
        Err(status) => writer.write_status(hint, status),
    }
}
