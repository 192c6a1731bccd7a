//! The common fixed-layout file-info substructure and the Windows
//! file-time conversions it is built from.
//!
//! Converts between `SystemTime` and the wire's 100ns-tick timestamp, which
//! counts from 1601-01-01 rather than the Unix epoch:
//! `filetime = unixtime_s * 10_000_000 + unixtime_ns / 100 + 116444736000000000`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::attributes::FileAttributes;

/// Offset between the Windows epoch (1601-01-01) and the Unix epoch
/// (1970-01-01), in 100ns ticks.
const WINDOWS_TO_UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

/// A Windows `FILETIME`: 100-nanosecond ticks since 1601-01-01.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serializable", derive(serde::Serialize, serde::Deserialize))]
pub struct FileTime(pub u64);

impl FileTime {
    pub const ZERO: FileTime = FileTime(0);

    /// Converts a `SystemTime` to a `FileTime`. Times before the Windows epoch
    /// saturate to [`FileTime::ZERO`] rather than wrapping, since the wire field
    /// is unsigned.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> FileTime {
        let ticks = match time.duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => {
                let secs = since_epoch.as_secs() as i64;
                let nanos = since_epoch.subsec_nanos() as i64;
                secs.saturating_mul(10_000_000)
                    .saturating_add(nanos / 100)
                    .saturating_add(WINDOWS_TO_UNIX_EPOCH_TICKS)
            }
            Err(before_epoch) => {
                let before = before_epoch.duration();
                let secs = before.as_secs() as i64;
                let nanos = before.subsec_nanos() as i64;
                WINDOWS_TO_UNIX_EPOCH_TICKS
                    - secs.saturating_mul(10_000_000)
                    - nanos / 100
            }
        };
        FileTime(ticks.max(0) as u64)
    }

    /// Converts back to a `SystemTime`.
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        let ticks = self.0 as i64 - WINDOWS_TO_UNIX_EPOCH_TICKS;
        let secs = ticks.div_euclid(10_000_000);
        let rem_ticks = ticks.rem_euclid(10_000_000);
        let nanos = (rem_ticks * 100) as u32;
        if secs >= 0 {
            UNIX_EPOCH + Duration::new(secs as u64, nanos)
        } else {
            UNIX_EPOCH - Duration::new((-secs) as u64, 0) + Duration::new(0, nanos)
        }
    }
}

impl From<SystemTime> for FileTime {
    fn from(value: SystemTime) -> Self {
        FileTime::from_system_time(value)
    }
}

impl From<FileTime> for SystemTime {
    fn from(value: FileTime) -> Self {
        value.to_system_time()
    }
}

/// The common fixed-layout record describing attributes, sizes, and timestamps
/// of a file or directory.
///
/// Hard-link count is always reported as 1: this framework has no
/// on-disk format of its own and cannot discover additional names for an inode
/// without the file system implementation telling it so some other way, which
/// the upstream design does not provide for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serializable", derive(serde::Serialize, serde::Deserialize))]
pub struct FileInfo {
    pub file_attributes: FileAttributes,
    pub reparse_tag: u32,
    pub allocation_size: u64,
    pub file_size: u64,
    pub creation_time: FileTime,
    pub last_access_time: FileTime,
    pub last_write_time: FileTime,
    pub change_time: FileTime,
    pub index_number: u64,
    pub hard_links: u32,
    pub ea_size: u32,
}

impl Default for FileInfo {
    fn default() -> Self {
        FileInfo {
            file_attributes: FileAttributes::NORMAL,
            reparse_tag: 0,
            allocation_size: 0,
            file_size: 0,
            creation_time: FileTime::ZERO,
            last_access_time: FileTime::ZERO,
            last_write_time: FileTime::ZERO,
            change_time: FileTime::ZERO,
            index_number: 0,
            hard_links: 1,
            ea_size: 0,
        }
    }
}

impl FileInfo {
    /// Rounds `file_size` up to a multiple of `allocation_unit` and stores the
    /// result in `allocation_size`, the way every handler that creates or grows
    /// a file must.
    pub fn recompute_allocation_size(&mut self, allocation_unit: u64) {
        if allocation_unit == 0 {
            self.allocation_size = self.file_size;
            return;
        }
        self.allocation_size = self.file_size.div_ceil(allocation_unit) * allocation_unit;
    }
}
