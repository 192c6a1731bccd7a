//! The closed set of operation kinds carried in [`super::header::RequestHeader`].
//!
//! Converted from the wire's `u32` through `num_enum::TryFromPrimitive` rather
//! than a hand-written `TryFrom` match.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One request kind, ≈20-member opcode list.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serializable", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    Create = 1,
    Overwrite = 2,
    Cleanup = 3,
    Close = 4,
    Read = 5,
    Write = 6,
    Flush = 7,
    QueryInformation = 8,
    SetInformation = 9,
    QueryVolumeInformation = 10,
    SetVolumeInformation = 11,
    QueryDirectory = 12,
    FileSystemControl = 13,
    DeviceControl = 14,
    QuerySecurity = 15,
    SetSecurity = 16,
    QueryStreamInformation = 17,
    GetReparsePoint = 18,
    SetReparsePoint = 19,
    GetExtendedAttributes = 20,
    SetExtendedAttributes = 21,
    Lock = 22,
    Unlock = 23,
    CanDelete = 24,
    Rename = 25,
    SetDelete = 26,
}

impl Opcode {
    /// `true` for opcodes the dispatcher must never send a response for
    /// (none in this protocol: unlike FUSE's `FUSE_FORGET`, every operation
    /// here is request/response).
    #[must_use]
    pub fn expects_response(self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Opcode;

    #[test]
    fn round_trips_through_u32() {
        for raw in 1u32..=26 {
            let op = Opcode::try_from(raw).expect("valid opcode");
            let back: u32 = op.into();
            assert_eq!(back, raw);
        }
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert!(Opcode::try_from(0u32).is_err());
        assert!(Opcode::try_from(1000u32).is_err());
    }
}
