//! The per-volume device handle and the exchange IOCTL used to pull a batch
//! of requests and push a batch of responses.
//!
//! Opens the device by path with `CreateFileW` and exchanges batches with
//! `DeviceIoControl`, the two Win32 calls this domain actually needs.

use std::ffi::c_void;
use std::io;
use std::path::Path;

use log::{debug, error};
use widestring::U16CString;

use crate::transport::TransportError;

/// Upper bound on a single exchange's request/response batch, matching the
/// allocation the dispatcher's worker buffers use.
pub const MAX_BATCH_SIZE: usize = 64 * 1024;

/// A handle to the FSD-side device for one mounted volume.
#[derive(Debug)]
pub struct DeviceChannel {
    #[cfg(windows)]
    handle: windows_sys::Win32::Foundation::HANDLE,
    #[cfg(not(windows))]
    _marker: (),
}

// SAFETY: the underlying HANDLE is only ever used through DeviceIoControl,
// which is safe to call from any thread; WinFsp itself serializes per-handle
// I/O at the driver.
unsafe impl Send for DeviceChannel {}
unsafe impl Sync for DeviceChannel {}

impl DeviceChannel {
    /// Opens the FSD device backing `volume_path`, e.g. `\\.\X:` for a
    /// drive-letter mount or a `\Device\...` path for a directory mount.
    #[cfg(windows)]
    pub fn open(volume_path: &Path) -> io::Result<DeviceChannel> {
        use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
        use windows_sys::Win32::Storage::FileSystem::{
            CreateFileW, FILE_FLAG_OVERLAPPED, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
        };

        let wide = U16CString::from_os_str(volume_path.as_os_str())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "volume path contains an embedded NUL"))?;

        // SAFETY: `wide` is a valid, NUL-terminated UTF-16 string for the
        // duration of this call; all other arguments are plain values.
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                windows_sys::Win32::Foundation::GENERIC_READ | windows_sys::Win32::Foundation::GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                FILE_FLAG_OVERLAPPED,
                0,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            let err = io::Error::last_os_error();
            error!("failed to open device for {}: {err}", volume_path.display());
            return Err(err);
        }
        debug!("opened device channel for {}", volume_path.display());
        Ok(DeviceChannel { handle })
    }

    #[cfg(not(windows))]
    pub fn open(_volume_path: &Path) -> io::Result<DeviceChannel> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "device transport is only available on Windows",
        ))
    }

    /// Issues the exchange IOCTL: submits `outgoing` (the previous batch of
    /// encoded responses, possibly empty) and blocks until the driver returns
    /// the next batch of requests into `incoming`. Returns the number of bytes
    /// written into `incoming`.
    #[cfg(windows)]
    pub fn exchange(&self, outgoing: &[u8], incoming: &mut [u8]) -> Result<usize, TransportError> {
        use windows_sys::Win32::System::IO::DeviceIoControl;

        const FSP_FSCTL_TRANSACT: u32 = 0x8800_2003;

        let mut bytes_returned: u32 = 0;
        // SAFETY: `outgoing`/`incoming` are valid slices for the duration of
        // the call and the driver treats them as opaque byte buffers of the
        // given lengths.
        let ok = unsafe {
            DeviceIoControl(
                self.handle,
                FSP_FSCTL_TRANSACT,
                outgoing.as_ptr() as *const c_void,
                outgoing.len() as u32,
                incoming.as_mut_ptr() as *mut c_void,
                incoming.len() as u32,
                &mut bytes_returned,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(TransportError::Io(io::Error::last_os_error()));
        }
        Ok(bytes_returned as usize)
    }

    #[cfg(not(windows))]
    pub fn exchange(&self, _outgoing: &[u8], _incoming: &mut [u8]) -> Result<usize, TransportError> {
        Err(TransportError::Io(io::Error::new(
            io::ErrorKind::Unsupported,
            "device transport is only available on Windows",
        )))
    }
}

#[cfg(windows)]
impl Drop for DeviceChannel {
    fn drop(&mut self) {
        use windows_sys::Win32::Foundation::CloseHandle;
        // SAFETY: `self.handle` was obtained from `CreateFileW` in `open` and
        // is not shared with any other owner.
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

/// Validates that `prefix` has the `\server\share` shape required for a
/// network-mode mount.
pub fn validate_network_prefix(prefix: &str) -> Result<(), TransportError> {
    let trimmed = prefix.trim_start_matches('\\');
    let mut components = trimmed.splitn(2, '\\');
    let server = components.next().unwrap_or("");
    let share = components.next().unwrap_or("");
    if server.is_empty() || share.is_empty() || share.contains('\\') {
        return Err(TransportError::InvalidNetworkPrefix(prefix.to_string()));
    }
    Ok(())
}
