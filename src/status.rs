//! Wire status codes.
//!
//! The transport's error space is the host platform's 32-bit NTSTATUS space.
//! `Status` is a thin newtype so handler code reads as status algebra rather
//! than bare integers.

use std::fmt;

/// A 32-bit status code exchanged on the wire.
///
/// Bit 31 (`0x8000_0000`) marks an error; the top two bits together
/// (`0xC000_0000`) select the "error" severity band used by
/// [`Status::is_success`]/[`Status::is_error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serializable", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u32);

impl Status {
    /// The operation completed normally.
    pub const SUCCESS: Status = Status(0x0000_0000);
    /// The handler opted to defer its reply; see [`crate::notify::Notifier`].
    pub const PENDING: Status = Status(0x0000_0103);
    /// Restart the open against a translated target (reparse-point encounter).
    pub const REPARSE: Status = Status(0x0000_0104);
    /// The kernel should retry after an oplock break completes.
    pub const OPLOCK_BREAK_IN_PROGRESS: Status = Status(0x0000_0108);

    pub const BUFFER_OVERFLOW: Status = Status(0x8000_0005);

    pub const UNSUCCESSFUL: Status = Status(0xC000_0001);
    pub const INVALID_PARAMETER: Status = Status(0xC000_000D);
    pub const NO_SUCH_FILE: Status = Status(0xC000_000F);
    pub const OBJECT_NAME_NOT_FOUND: Status = Status(0xC000_0034);
    pub const OBJECT_NAME_COLLISION: Status = Status(0xC000_0035);
    pub const OBJECT_PATH_NOT_FOUND: Status = Status(0xC000_003A);
    pub const ACCESS_DENIED: Status = Status(0xC000_0022);
    pub const NOT_A_DIRECTORY: Status = Status(0xC000_0103);
    pub const FILE_IS_A_DIRECTORY: Status = Status(0xC000_00BA);
    pub const DIRECTORY_NOT_EMPTY: Status = Status(0xC000_0101);
    pub const NOT_IMPLEMENTED: Status = Status(0xC000_0002);
    pub const END_OF_FILE: Status = Status(0xC000_0011);
    pub const NO_MORE_FILES: Status = Status(0x8000_001A);
    pub const CANT_WAIT: Status = Status(0xC000_0199);
    pub const CANCELLED: Status = Status(0xC000_0120);
    pub const DEVICE_NOT_READY: Status = Status(0xC000_0017);
    pub const EA_TOO_LARGE: Status = Status(0xC000_0050);
    pub const NONEXISTENT_EA_ENTRY: Status = Status(0xC000_0051);
    pub const NO_EAS_ON_FILE: Status = Status(0xC000_0052);

    /// `true` for [`Status::SUCCESS`] and any code with the top two bits clear.
    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// `true` for the informational band (`PENDING`, `REPARSE`, oplock retry).
    #[must_use]
    pub fn is_informational(self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000 || matches!(self, Status::PENDING | Status::REPARSE)
    }

    /// `true` for the error band (top two bits `11`).
    #[must_use]
    pub fn is_error(self) -> bool {
        self.0 & 0xC000_0000 == 0xC000_0000
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for Status {
    fn from(value: u32) -> Self {
        Status(value)
    }
}

impl From<Status> for u32 {
    fn from(value: Status) -> Self {
        value.0
    }
}
