//! A small process wrapper around [`FileSystemHost`]: enough argv parsing to
//! pick a mount point and install a console Ctrl-C handler that unmounts on
//! exit.
//!
//! This is not a Windows service-control-manager integration, just the
//! argv-to-`MountSpec` translation and the exit-signal plumbing every hosting
//! process needs.

use std::sync::Arc;

use crate::host::FileSystemHost;
use crate::mount::MountSpec;

/// Error parsing a command line into a [`MountSpec`].
#[derive(Debug)]
pub enum ArgsError {
    /// No mount point was given at all.
    MissingMountPoint,
    /// A drive-letter argument wasn't a single ASCII letter followed by `:`.
    InvalidDriveLetter(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::MissingMountPoint => write!(f, "missing mount point (expected a drive letter like X: or a directory path)"),
            ArgsError::InvalidDriveLetter(arg) => write!(f, "{arg} is not a valid drive letter"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Parses a single positional mount-point argument into a [`MountSpec`].
///
/// Accepts `*` for [`MountSpec::AutoDriveLetter`], a single letter optionally
/// followed by `:` for [`MountSpec::DriveLetter`], and anything else as a
/// [`MountSpec::Directory`].
pub fn parse_mount_point(arg: &str) -> Result<MountSpec, ArgsError> {
    if arg == "*" {
        return Ok(MountSpec::AutoDriveLetter);
    }
    let letter_part = arg.strip_suffix(':').unwrap_or(arg);
    if letter_part.len() == 1 {
        let letter = letter_part.chars().next().expect("len is 1");
        if letter.is_ascii_alphabetic() {
            return Ok(MountSpec::DriveLetter(letter.to_ascii_uppercase()));
        }
        return Err(ArgsError::InvalidDriveLetter(arg.to_string()));
    }
    Ok(MountSpec::Directory(std::path::PathBuf::from(arg)))
}

/// Parses `argv` (excluding `argv[0]`) for the single positional mount-point
/// argument, ignoring any other flags the caller's own `clap`/hand-rolled
/// parser already consumed.
pub fn mount_spec_from_args<I, S>(args: I) -> Result<MountSpec, ArgsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| arg.as_ref().to_string())
        .find(|arg| !arg.starts_with('-'))
        .ok_or(ArgsError::MissingMountPoint)
        .and_then(|arg| parse_mount_point(&arg))
}

/// Installs a console control handler (Ctrl-C, Ctrl-Break, console close) that
/// unmounts `host` and returns, the same cleanup `Drop` would perform, except
/// the trigger here is an external console event rather than a guard going
/// out of scope.
///
/// Safe to call at most once per process: Windows replaces any previously
/// installed handler chain's head, and this crate does not try to compose
/// with an application-installed handler of its own.
pub fn install_ctrlc_unmount_handler(host: Arc<FileSystemHost>) {
    imp::install(host);
}

#[cfg(windows)]
mod imp {
    use super::*;
    use std::sync::OnceLock;

    use windows_sys::Win32::Foundation::BOOL;
    use windows_sys::Win32::System::Console::SetConsoleCtrlHandler;

    static HOST: OnceLock<Arc<FileSystemHost>> = OnceLock::new();

    pub(super) fn install(host: Arc<FileSystemHost>) {
        if HOST.set(host).is_err() {
            log::warn!("console control handler already installed; ignoring duplicate registration");
            return;
        }
        // SAFETY: `handler` has the `extern "system"` signature
        // `SetConsoleCtrlHandler` requires and never unwinds across the FFI
        // boundary.
        unsafe {
            SetConsoleCtrlHandler(Some(handler), 1);
        }
    }

    unsafe extern "system" fn handler(_ctrl_type: u32) -> BOOL {
        if let Some(host) = HOST.get() {
            host.unmount();
        }
        1
    }
}

#[cfg(not(windows))]
mod imp {
    use super::*;

    pub(super) fn install(_host: Arc<FileSystemHost>) {
        log::debug!("console control handler is a no-op off Windows");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_auto_drive_letter() {
        assert_eq!(parse_mount_point("*").unwrap(), MountSpec::AutoDriveLetter);
    }

    #[test]
    fn parses_drive_letter_with_and_without_colon() {
        assert_eq!(parse_mount_point("X:").unwrap(), MountSpec::DriveLetter('X'));
        assert_eq!(parse_mount_point("x").unwrap(), MountSpec::DriveLetter('X'));
    }

    #[test]
    fn parses_directory() {
        assert_eq!(parse_mount_point(r"C:\mnt\myfs").unwrap(), MountSpec::Directory(std::path::PathBuf::from(r"C:\mnt\myfs")));
    }

    #[test]
    fn mount_spec_from_args_skips_flags() {
        let args = ["--debug", "X:"];
        assert_eq!(mount_spec_from_args(args).unwrap(), MountSpec::DriveLetter('X'));
    }

    #[test]
    fn mount_spec_from_args_requires_a_positional() {
        let args = ["--debug"];
        assert!(matches!(mount_spec_from_args(args), Err(ArgsError::MissingMountPoint)));
    }
}
