//! The `FileSystem` trait: the application-supplied operation vtable. Every
//! method carries a default that returns [`Status::NOT_IMPLEMENTED`], so an
//! implementation only needs to override the operations it actually supports.
//!
//! Each method returns `Result<T, Status>` directly rather than writing into
//! a callback object: the dispatcher builds the wire response itself from the
//! returned value, so there is no "reply object the implementation must
//! eventually call" to thread through.

use crate::attributes::{CreateOptions, DesiredAccess, FileAttributes, ShareMode};
use crate::ea::ExtendedAttribute;
use crate::file_info::FileInfo;
use crate::security::SecurityDescriptor;
use crate::status::Status;
use crate::volume::VolumeInfo;

/// Opaque per-open-file context handed back by `create`/`open` and threaded
/// through every subsequent operation on that handle.
pub type FileContext = u64;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CleanupFlags {
    pub delete: bool,
    pub set_allocation_size: bool,
    pub set_archive: bool,
    pub set_last_access_time: bool,
    pub set_last_write_time: bool,
    pub set_change_time: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileSizeOperation {
    EndOfFile,
    AllocationSize,
}

/// Outcome of a handler that is allowed to opt into the PENDING contract.
/// `Pending` tells the dispatcher to build no response at all; the application must
/// later complete the request exactly once through
/// [`crate::host::PendingReply`], keyed by the hint carried in
/// [`crate::context::OperationContext::current`].
#[derive(Debug)]
pub enum Completion<T> {
    Done(Result<T, Status>),
    Pending,
}

impl<T> From<Result<T, Status>> for Completion<T> {
    fn from(result: Result<T, Status>) -> Self {
        Completion::Done(result)
    }
}

/// Outcome of `Create`: either the open/create succeeded, or it hit a
/// reparse point and the kernel must restart the open against `target`.
#[derive(Clone, Debug)]
pub enum CreateOutcome {
    Opened { context: FileContext, info: FileInfo },
    Reparse { target: String },
}

/// The application-supplied operation vtable. Every method has a default
/// implementation returning [`Status::NOT_IMPLEMENTED`],
/// so an application only overrides the subset of opcodes it supports.
pub trait FileSystem: Send + Sync + 'static {
    /// `Create`: access-checked open-or-create. Returns the new
    /// context and its file info, or `Status::REPARSE` with the reparse
    /// target path to restart the open elsewhere.
    fn create(
        &self,
        path: &str,
        desired_access: DesiredAccess,
        file_attributes: FileAttributes,
        share_mode: ShareMode,
        create_options: CreateOptions,
        security_descriptor: Option<&SecurityDescriptor>,
    ) -> Result<CreateOutcome, Status> {
        let _ = (path, desired_access, file_attributes, share_mode, create_options, security_descriptor);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// `Overwrite`: truncates an already-open file.
    fn overwrite(
        &self,
        context: FileContext,
        file_attributes: FileAttributes,
        supersede: bool,
        allocation_size: u64,
    ) -> Result<FileInfo, Status> {
        let _ = (context, file_attributes, supersede, allocation_size);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// `Cleanup`: applies `flags`; deletion happens here, not at `close`.
    fn cleanup(&self, context: FileContext, path: &str, flags: CleanupFlags) {
        let _ = (context, path, flags);
    }

    /// `Close`: releases all per-descriptor resources, including any
    /// directory buffer tied to this context.
    fn close(&self, context: FileContext) {
        let _ = context;
    }

    /// May return [`Completion::Pending`]; the application then
    /// later calls [`crate::host::PendingReply::complete_read`] exactly once.
    fn read(&self, context: FileContext, offset: u64, length: u32) -> Completion<Vec<u8>> {
        let _ = (context, offset, length);
        Completion::Done(Err(Status::NOT_IMPLEMENTED))
    }

    /// May return [`Completion::Pending`]; see [`FileSystem::read`].
    fn write(
        &self,
        context: FileContext,
        offset: u64,
        data: &[u8],
        write_to_end_of_file: bool,
        constrained_io: bool,
    ) -> Completion<(u32, FileInfo)> {
        let _ = (context, offset, data, write_to_end_of_file, constrained_io);
        Completion::Done(Err(Status::NOT_IMPLEMENTED))
    }

    /// Locks/unlocks a byte range. Left unimplemented by most file systems;
    /// per-file range locking is also enforced by the kernel side
    /// independently of this callback.
    fn lock(&self, context: FileContext, offset: u64, length: u64, exclusive: bool) -> Result<(), Status> {
        let _ = (context, offset, length, exclusive);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn unlock(&self, context: FileContext, offset: u64, length: u64) -> Result<(), Status> {
        let _ = (context, offset, length);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// A `None` context means "flush the whole volume".
    fn flush(&self, context: Option<FileContext>) -> Result<(), Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn get_file_info(&self, context: FileContext) -> Result<FileInfo, Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_basic_info(
        &self,
        context: FileContext,
        file_attributes: Option<FileAttributes>,
        creation_time: Option<crate::file_info::FileTime>,
        last_access_time: Option<crate::file_info::FileTime>,
        last_write_time: Option<crate::file_info::FileTime>,
        change_time: Option<crate::file_info::FileTime>,
    ) -> Result<FileInfo, Status> {
        let _ = (context, file_attributes, creation_time, last_access_time, last_write_time, change_time);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_file_size(&self, context: FileContext, size: u64, operation: FileSizeOperation) -> Result<FileInfo, Status> {
        let _ = (context, size, operation);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn can_delete(&self, context: FileContext) -> Result<(), Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_delete(&self, context: FileContext, delete_pending: bool) -> Result<(), Status> {
        let _ = (context, delete_pending);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// `Rename`: `posix_semantics` selects POSIX-style replace-on-collision;
    /// runs under the exclusive guard.
    fn rename(&self, context: FileContext, new_path: &str, replace_if_exists: bool, posix_semantics: bool) -> Result<(), Status> {
        let _ = (context, new_path, replace_if_exists, posix_semantics);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn get_security(&self, context: FileContext) -> Result<SecurityDescriptor, Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_security(
        &self,
        context: FileContext,
        what_to_modify: crate::security::SecurityInformation,
        template: &SecurityDescriptor,
    ) -> Result<(), Status> {
        let _ = (context, what_to_modify, template);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// `ReadDirectory`: invoked only on the first chunk of an enumeration
    /// (marker is `None`); the dispatcher fills the directory buffer from
    /// whatever this returns and serves subsequent chunks straight from that
    /// buffer. May return [`Completion::Pending`]; see
    /// [`FileSystem::read`].
    fn read_directory(&self, context: FileContext, pattern: Option<&str>) -> Completion<Vec<(String, FileInfo)>> {
        let _ = (context, pattern);
        Completion::Done(Err(Status::NOT_IMPLEMENTED))
    }

    fn get_stream_info(&self, context: FileContext) -> Result<Vec<(String, u64)>, Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn get_ea(&self, context: FileContext) -> Result<Vec<ExtendedAttribute>, Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_ea(&self, context: FileContext, entries: &[ExtendedAttribute]) -> Result<FileInfo, Status> {
        let _ = (context, entries);
        Err(Status::NOT_IMPLEMENTED)
    }

    /// Validates and applies an opaque device/filesystem control code. The
    /// dispatcher has already checked the code is buffered-transfer and
    /// opted-in before this is called.
    fn control(&self, context: FileContext, control_code: u32, input: &[u8]) -> Result<Vec<u8>, Status> {
        let _ = (context, control_code, input);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn get_reparse_point(&self, context: FileContext) -> Result<Vec<u8>, Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_reparse_point(&self, context: FileContext, reparse_data: &[u8]) -> Result<(), Status> {
        let _ = (context, reparse_data);
        Err(Status::NOT_IMPLEMENTED)
    }

    fn delete_reparse_point(&self, context: FileContext) -> Result<(), Status> {
        let _ = context;
        Err(Status::NOT_IMPLEMENTED)
    }

    /// Resolver callback used while chasing a reparse-point chain: "is this
    /// path component a reparse point, and if so what does it point to?"
    fn resolve_reparse_point(&self, path: &str) -> Result<Option<String>, Status> {
        let _ = path;
        Ok(None)
    }

    fn get_volume_info(&self) -> Result<VolumeInfo, Status> {
        Err(Status::NOT_IMPLEMENTED)
    }

    fn set_volume_label(&self, label: &str) -> Result<VolumeInfo, Status> {
        let _ = label;
        Err(Status::NOT_IMPLEMENTED)
    }
}
