//! The file-system object: owns the mount, the device
//! channel, the dispatcher, and every piece of per-volume shared state the
//! operation handlers need.
//!
//! A long-lived object created from an application plus a volume
//! configuration, started explicitly, and torn down either by an explicit
//! `unmount` call or by `Drop`. The first error observed by any worker is
//! latched into a plain `AtomicU32` rather than a `Mutex<Option<io::Error>>`,
//! since a `Status` is already a `Copy` `u32` newtype.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::info;
use parking_lot::Mutex;

use crate::abi::Opcode;
use crate::context::OperationContext;
use crate::dirbuffer::DirBuffer;
use crate::dispatcher::DispatcherHandle;
use crate::file_info::FileInfo;
use crate::filesystem::{FileContext, FileSystem};
use crate::guard::{GuardStrategy, OperationGuard};
use crate::mount::{preflight, MountError, MountSpec};
use crate::notify::Notifier;
use crate::status::Status;
use crate::transport::DeviceChannel;
use crate::volume::VolumeParams;

/// State shared between [`FileSystemHost`], its [`DispatcherHandle`] workers,
/// and any outstanding [`PendingReply`]. Kept behind one `Arc` so all three
/// see the same directory-buffer registry, notifier, and guard lock.
pub(crate) struct Shared {
    pub(crate) filesystem: Arc<dyn FileSystem>,
    pub(crate) volume_params: VolumeParams,
    pub(crate) guard: OperationGuard,
    pub(crate) notifier: Notifier,
    pub(crate) dirbuffers: DashMap<FileContext, Mutex<DirBuffer>>,
    /// Path an open context was created against, tracked so `Cleanup` (whose
    /// request body carries no path blob of its own) can still report one to
    /// the application.
    pub(crate) paths: DashMap<FileContext, String>,
    debug_log_mask: AtomicU32,
    /// Sticky first dispatcher error (0 means none), set once via
    /// compare-and-swap so the first failure wins.
    first_error: AtomicU32,
}

impl Shared {
    /// `true` if `opcode`'s bit is set in the debug-log mask.
    pub(crate) fn is_debug_log_enabled(&self, opcode: Opcode) -> bool {
        let bit = 1u32 << (opcode as u32 % 32);
        self.debug_log_mask.load(Ordering::Relaxed) & bit != 0
    }

    pub(crate) fn record_first_error(&self, status: Status) {
        let _ = self.first_error.compare_exchange(0, status.0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

enum HostState {
    Created,
    Mounted {
        channel: Arc<DeviceChannel>,
        dispatcher: DispatcherHandle,
        mount_spec: MountSpec,
    },
    Stopped,
}

/// The top-level handle an application builds and mounts.
pub struct FileSystemHost {
    inner: Arc<Shared>,
    state: Mutex<HostState>,
}

impl FileSystemHost {
    #[must_use]
    pub fn new(filesystem: Arc<dyn FileSystem>, volume_params: VolumeParams, guard_strategy: GuardStrategy) -> FileSystemHost {
        FileSystemHost {
            inner: Arc::new(Shared {
                filesystem,
                volume_params,
                guard: OperationGuard::new(guard_strategy),
                notifier: Notifier::new(),
                dirbuffers: DashMap::new(),
                paths: DashMap::new(),
                debug_log_mask: AtomicU32::new(0),
                first_error: AtomicU32::new(0),
            }),
            state: Mutex::new(HostState::Created),
        }
    }

    #[must_use]
    pub fn volume_params(&self) -> &VolumeParams {
        &self.inner.volume_params
    }

    /// A cloneable, `'static` handle an application can stash across threads
    /// to obtain [`PendingReply`]s for asynchronous completion.
    #[must_use]
    pub fn handle(&self) -> HostHandle {
        HostHandle { inner: self.inner.clone() }
    }

    pub fn set_debug_log_enabled(&self, opcode: Opcode, enabled: bool) {
        let bit = 1u32 << (opcode as u32 % 32);
        if enabled {
            self.inner.debug_log_mask.fetch_or(bit, Ordering::Relaxed);
        } else {
            self.inner.debug_log_mask.fetch_and(!bit, Ordering::Relaxed);
        }
    }

    /// The first sticky dispatcher-thread error recorded since mount, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<Status> {
        match self.inner.first_error.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(Status(raw)),
        }
    }

    /// Probes `spec` for availability, opens the transport device, and starts
    /// the fixed-size worker pool.
    pub fn mount(&self, spec: MountSpec) -> io::Result<()> {
        {
            let state = self.state.lock();
            if !matches!(*state, HostState::Created) {
                return Err(io::Error::new(io::ErrorKind::AlreadyExists, "file system is already mounted"));
            }
        }
        preflight(&spec, is_drive_letter_in_use, directory_is_empty).map_err(mount_error_to_io)?;
        let volume_path = volume_device_path(&spec);
        let channel = Arc::new(DeviceChannel::open(&volume_path)?);
        let dispatcher = DispatcherHandle::spawn(self.inner.clone(), channel.clone(), self.inner.volume_params.thread_count());
        info!("mounted {} with {} worker thread(s)", spec, self.inner.volume_params.thread_count());
        *self.state.lock() = HostState::Mounted { channel, dispatcher, mount_spec: spec };
        Ok(())
    }

    /// Stops the worker pool and closes the transport device. Idempotent:
    /// calling this on an unmounted or already-stopped host is a no-op.
    pub fn unmount(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), HostState::Stopped);
        if let HostState::Mounted { channel, dispatcher, mount_spec } = previous {
            info!("unmounting {mount_spec}");
            dispatcher.stop();
            drop(channel);
        }
    }
}

impl Drop for FileSystemHost {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(windows)]
fn is_drive_letter_in_use(letter: char) -> bool {
    use windows_sys::Win32::Storage::FileSystem::GetLogicalDrives;
    let index = (letter.to_ascii_uppercase() as u8).saturating_sub(b'A');
    // SAFETY: no arguments, returns a plain bitmask.
    let mask = unsafe { GetLogicalDrives() };
    mask & (1 << index) != 0
}

#[cfg(not(windows))]
fn is_drive_letter_in_use(_letter: char) -> bool {
    false
}

fn directory_is_empty(path: &std::path::Path) -> bool {
    std::fs::read_dir(path).map(|mut entries| entries.next().is_none()).unwrap_or(true)
}

fn volume_device_path(spec: &MountSpec) -> std::path::PathBuf {
    match spec {
        MountSpec::DriveLetter(letter) => std::path::PathBuf::from(format!(r"\\.\{letter}:")),
        MountSpec::Directory(path) => path.clone(),
        MountSpec::AutoDriveLetter | MountSpec::None => std::path::PathBuf::from(r"\\.\FspHost"),
    }
}

fn mount_error_to_io(err: MountError) -> io::Error {
    match err {
        MountError::Transport(transport) => io::Error::new(io::ErrorKind::Other, transport),
        other => io::Error::new(io::ErrorKind::InvalidInput, other),
    }
}

/// A cloneable, thread-portable reference to a mounted [`FileSystemHost`]'s
/// shared state. An application stores this to obtain
/// [`PendingReply`]s from background threads.
#[derive(Clone)]
pub struct HostHandle {
    inner: Arc<Shared>,
}

impl HostHandle {
    /// Captures the currently-executing handler's hint/opcode as a
    /// [`PendingReply`], for a handler that is about to return
    /// [`crate::filesystem::Completion::Pending`]. Must be called from inside
    /// the dynamic extent of the handler (before it returns); returns `None`
    /// if called outside one.
    #[must_use]
    pub fn pending_reply(&self) -> Option<PendingReply> {
        let ctx = OperationContext::current()?;
        Some(PendingReply {
            inner: self.inner.clone(),
            hint: ctx.hint,
            context: ctx.object_id,
            query_directory_buffer_size: ctx.query_directory_buffer_size,
        })
    }
}

/// A captured hint allowing exactly one out-of-band completion of a deferred
/// `Read`, `Write`, or `QueryDirectory`. Dropping one without
/// completing it leaves the kernel waiting forever; this crate does not
/// second-guess the application's bookkeeping.
pub struct PendingReply {
    inner: Arc<Shared>,
    hint: u64,
    context: FileContext,
    query_directory_buffer_size: u32,
}

impl PendingReply {
    /// Completes a deferred `Read`.
    pub fn complete_read(&self, result: Result<Vec<u8>, Status>) {
        let encoded = crate::operations::io::encode_read_response(self.hint, result);
        self.send(encoded);
    }

    /// Completes a deferred `Write`.
    pub fn complete_write(&self, result: Result<(u32, FileInfo), Status>) {
        let encoded = crate::operations::io::encode_write_response(self.hint, result);
        self.send(encoded);
    }

    /// Completes a deferred `QueryDirectory`: fills this handle's directory
    /// buffer from `result` and serves the first chunk from it, the same way
    /// the synchronous path does.
    pub fn complete_query_directory(&self, result: Result<Vec<(String, FileInfo)>, Status>) {
        let entry = self.inner.dirbuffers.entry(self.context).or_default();
        let mut dirbuffer = entry.lock();
        let encoded = crate::operations::directory::fill_and_encode_first_chunk(
            &mut dirbuffer,
            result,
            self.query_directory_buffer_size,
            self.hint,
        );
        drop(dirbuffer);
        self.send(encoded);
    }

    fn send(&self, encoded: Vec<u8>) {
        if let Err(status) = self.inner.notifier.send_response(self.hint, encoded) {
            log::warn!("dropping duplicate completion for hint {}: {status}", self.hint);
        }
    }
}
