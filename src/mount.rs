//! Mount-point specification and preflight probing.
//!
//! A closed enum the caller builds up front rather than a free-form path,
//! since a Windows mount point can be a drive letter, a directory, "pick the
//! next free letter", or (network mode) nothing at all — the transport
//! device chooses an alias.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::transport::TransportError;

/// How a volume should be attached to the namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MountSpec {
    /// A single drive letter, e.g. `'X'`.
    DriveLetter(char),
    /// An existing empty directory to mount over.
    Directory(PathBuf),
    /// The next free drive letter, counting down from `Z`.
    AutoDriveLetter,
    /// Let the transport choose a volume-device alias with no namespace
    /// attachment at all (the empty form named in ).
    None,
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountSpec::DriveLetter(letter) => write!(f, "{letter}:"),
            MountSpec::Directory(path) => write!(f, "{}", path.display()),
            MountSpec::AutoDriveLetter => write!(f, "<auto>"),
            MountSpec::None => write!(f, "<none>"),
        }
    }
}

/// Why a mount-point preflight probe declined a [`MountSpec`].
#[derive(Debug)]
pub enum MountError {
    /// The requested drive letter is already in use.
    DriveLetterInUse(char),
    /// The requested directory exists and is not empty.
    DirectoryNotEmpty(PathBuf),
    /// No free drive letter remained while scanning down from `Z`.
    NoDriveLettersAvailable,
    Transport(TransportError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::DriveLetterInUse(letter) => write!(f, "drive letter {letter}: is already in use"),
            MountError::DirectoryNotEmpty(path) => write!(f, "directory {} exists and is not empty", path.display()),
            MountError::NoDriveLettersAvailable => write!(f, "no free drive letter available"),
            MountError::Transport(err) => write!(f, "transport error during mount: {err}"),
        }
    }
}

impl std::error::Error for MountError {}

impl From<TransportError> for MountError {
    fn from(value: TransportError) -> Self {
        MountError::Transport(value)
    }
}

/// Counts down from `Z` to `D` looking for the first letter `is_in_use`
/// reports as free.
pub fn pick_auto_drive_letter(mut is_in_use: impl FnMut(char) -> bool) -> Result<char, MountError> {
    for letter in (b'D'..=b'Z').rev() {
        let letter = letter as char;
        if !is_in_use(letter) {
            return Ok(letter);
        }
    }
    Err(MountError::NoDriveLettersAvailable)
}

/// Probes whether `spec` could be mounted without actually reserving it.
pub fn preflight(spec: &MountSpec, is_drive_letter_in_use: impl Fn(char) -> bool, directory_is_empty: impl Fn(&Path) -> bool) -> Result<(), MountError> {
    match spec {
        MountSpec::DriveLetter(letter) => {
            if is_drive_letter_in_use(*letter) {
                return Err(MountError::DriveLetterInUse(*letter));
            }
            Ok(())
        }
        MountSpec::Directory(path) => {
            if path.exists() && !directory_is_empty(path) {
                return Err(MountError::DirectoryNotEmpty(path.clone()));
            }
            Ok(())
        }
        MountSpec::AutoDriveLetter => pick_auto_drive_letter(is_drive_letter_in_use).map(|_| ()),
        MountSpec::None => Ok(()),
    }
}
