//! The fixed-size worker pool: pulls a batch of requests
//! from the transport, dispatches each to the application, and pushes back a
//! batch of responses.
//!
//! The pool size is fixed at start from
//! [`crate::volume::VolumeParams::thread_count`] rather than grown on demand:
//! there is no idle-thread retirement or on-the-fly spawn bookkeeping — a
//! worker that starts keeps running until `stop` is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error};

use crate::abi::{Opcode, ResponseWriter};
use crate::context::OperationContext;
use crate::host::Shared;
use crate::status::Status;
use crate::transport::{BatchReader, DeviceChannel, MAX_BATCH_SIZE};

/// Handle to a running worker pool. [`DispatcherHandle::stop`] signals every
/// worker to exit after its current exchange and joins them all.
pub(crate) struct DispatcherHandle {
    exit: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    pub(crate) fn spawn(inner: Arc<Shared>, channel: Arc<DeviceChannel>, thread_count: u32) -> DispatcherHandle {
        let exit = Arc::new(AtomicBool::new(false));
        let workers = (0..thread_count)
            .map(|id| {
                let inner = inner.clone();
                let channel = channel.clone();
                let exit = exit.clone();
                std::thread::Builder::new()
                    .name(format!("fsphost-worker-{id}"))
                    .spawn(move || worker_main(id, inner, channel, exit))
                    .expect("spawning a dispatcher worker thread")
            })
            .collect();
        DispatcherHandle { exit, workers }
    }

    pub(crate) fn stop(self) {
        self.exit.store(true, Ordering::SeqCst);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

fn worker_main(id: u32, inner: Arc<Shared>, channel: Arc<DeviceChannel>, exit: Arc<AtomicBool>) {
    let mut incoming = vec![0u8; MAX_BATCH_SIZE];
    let mut outgoing: Vec<u8> = Vec::new();
    debug!("dispatcher worker {id} starting");
    while !exit.load(Ordering::Relaxed) {
        let received = match channel.exchange(&outgoing, &mut incoming) {
            Ok(len) => len,
            Err(err) => {
                error!("dispatcher worker {id} exchange failed: {err}");
                inner.record_first_error(Status::UNSUCCESSFUL);
                break;
            }
        };

        let mut writer = ResponseWriter::new();
        for decoded in BatchReader::new(&incoming[..received]) {
            match decoded {
                Ok(request) => dispatch_one(&inner, &request, &mut writer),
                Err(err) => {
                    debug!("dispatcher worker {id} dropped a malformed request: {err}");
                }
            }
        }

        outgoing = writer.into_bytes();
        for completion in inner.notifier.drain_outbound() {
            outgoing.extend_from_slice(&completion);
        }
    }
    debug!("dispatcher worker {id} exiting");
}

fn dispatch_one(inner: &Arc<Shared>, request: &crate::abi::Request<'_>, writer: &mut ResponseWriter) {
    let opcode = request.opcode;
    let buffer_size = if opcode == Opcode::QueryDirectory {
        request.as_query_directory().buffer_size
    } else {
        0
    };
    let ctx = OperationContext {
        hint: request.hint(),
        opcode,
        object_id: request.object_id(),
        process_id: request.process_id(),
        case_sensitive: inner.volume_params.case_sensitive_search(),
        query_directory_buffer_size: buffer_size,
    };
    if inner.is_debug_log_enabled(opcode) {
        debug!("{opcode:?} hint={} object_id={} pid={}", ctx.hint, ctx.object_id, ctx.process_id);
    }
    let _guard_token = inner.guard.enter(opcode);
    ctx.scoped(|| crate::operations::dispatch(inner, request, writer));
}
