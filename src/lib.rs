//! `fsphost`: a user-mode file-system hosting framework for Windows.
//!
//! An application implements the [`FileSystem`] trait and hands it to
//! [`FileSystemHost`], which mounts a drive letter or directory, spins up a
//! worker pool, and dispatches kernel requests arriving over a private IOCTL
//! transport ([`transport`]) to the trait's methods. Long-running `Read`,
//! `Write`, and directory-enumeration calls may answer out of band through a
//! [`HostHandle`] captured while the call is in progress.
//!
//! The crate splits along the same seam as the problem: [`host`] and
//! [`dispatcher`] own the mount/thread-pool lifecycle, while
//! [`abi`]/[`operations`] own the wire-format request layer underneath it.

mod abi;
mod attributes;
mod context;
mod dirbuffer;
mod dispatcher;
mod ea;
mod file_info;
mod filesystem;
mod guard;
mod host;
mod mount;
mod notify;
mod operations;
mod path;
mod security;
mod status;
mod transport;
mod volume;

pub mod service;

pub use attributes::{CreateDisposition, CreateOptions, DesiredAccess, FileAttributes, ShareMode};
pub use ea::ExtendedAttribute;
pub use file_info::{FileInfo, FileTime};
pub use filesystem::{CleanupFlags, Completion, CreateOutcome, FileContext, FileSizeOperation, FileSystem};
pub use guard::GuardStrategy;
pub use host::{FileSystemHost, HostHandle, PendingReply};
pub use mount::{MountError, MountSpec};
pub use security::{
    build_security_descriptor, compose, describe_security, edit, id_for_sid, posix_identity_from_security_descriptor,
    register_identity, sid_for_id, translate_identity, Ace, AceType, ConstructionTag, PosixIdentity, SecurityDescriptor,
    SecurityInformation, Sid, TaggedSecurityDescriptor, WellKnownSid, UNMAPPED_ID,
};
pub use status::Status;
pub use volume::{VolumeInfo, VolumeParams, VolumeParamsBuilder};
