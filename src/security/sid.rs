//! Windows SIDs: self-relative byte encoding and the well-known SIDs the
//! POSIX translation layer needs pre-registered.

use std::fmt;

/// A Windows security identifier, stored in its canonical binary form
/// (revision, sub-authority count, 6-byte identifier authority, then the
/// sub-authorities themselves).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serializable", derive(serde::Serialize, serde::Deserialize))]
pub struct Sid {
    revision: u8,
    identifier_authority: [u8; 6],
    sub_authorities: Vec<u32>,
}

impl Sid {
    #[must_use]
    pub fn new(identifier_authority: [u8; 6], sub_authorities: Vec<u32>) -> Sid {
        Sid {
            revision: 1,
            identifier_authority,
            sub_authorities,
        }
    }

    /// Encodes this SID into its binary self-relative form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.sub_authorities.len() * 4);
        bytes.push(self.revision);
        bytes.push(self.sub_authorities.len() as u8);
        bytes.extend_from_slice(&self.identifier_authority);
        for sub in &self.sub_authorities {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Sid> {
        if bytes.len() < 8 {
            return None;
        }
        let revision = bytes[0];
        let count = bytes[1] as usize;
        let identifier_authority: [u8; 6] = bytes[2..8].try_into().ok()?;
        let expected_len = 8 + count * 4;
        if bytes.len() < expected_len {
            return None;
        }
        let sub_authorities = bytes[8..expected_len]
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        Some(Sid {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }

    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authority = u64::from_be_bytes([
            0,
            0,
            self.identifier_authority[0],
            self.identifier_authority[1],
            self.identifier_authority[2],
            self.identifier_authority[3],
            self.identifier_authority[4],
            self.identifier_authority[5],
        ]);
        write!(f, "S-{}-{}", self.revision, authority)?;
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

const NT_AUTHORITY: [u8; 6] = [0, 0, 0, 0, 0, 5];
const WORLD_AUTHORITY: [u8; 6] = [0, 0, 0, 0, 0, 1];

/// SIDs whose meaning is fixed system-wide rather than per-domain, registered
/// in the identity map the same way `fuse_intf.c`'s
/// `FspPosixMapUidToSid`/`FspPosixMapSidToUid` pre-seeds them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum WellKnownSid {
    /// `S-1-1-0`, `Everyone`.
    Everyone,
    /// `S-1-5-32-544`, `BUILTIN\Administrators`.
    Administrators,
    /// `S-1-5-18`, `NT AUTHORITY\SYSTEM`.
    LocalSystem,
    /// `S-1-5-11`, `NT AUTHORITY\Authenticated Users`.
    AuthenticatedUsers,
    /// `S-1-5-19`, `NT AUTHORITY\Local Service`.
    LocalService,
}

impl WellKnownSid {
    #[must_use]
    pub fn sid(self) -> Sid {
        match self {
            WellKnownSid::Everyone => Sid::new(WORLD_AUTHORITY, vec![0]),
            WellKnownSid::Administrators => Sid::new(NT_AUTHORITY, vec![32, 544]),
            WellKnownSid::LocalSystem => Sid::new(NT_AUTHORITY, vec![18]),
            WellKnownSid::AuthenticatedUsers => Sid::new(NT_AUTHORITY, vec![11]),
            WellKnownSid::LocalService => Sid::new(NT_AUTHORITY, vec![19]),
        }
    }

    #[must_use]
    pub fn all() -> [WellKnownSid; 5] {
        [
            WellKnownSid::Everyone,
            WellKnownSid::Administrators,
            WellKnownSid::LocalSystem,
            WellKnownSid::AuthenticatedUsers,
            WellKnownSid::LocalService,
        ]
    }
}
