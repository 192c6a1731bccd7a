//! POSIX `(uid, gid, mode)` ↔ DACL translation.
//!
//! Mode bits become allow/deny ACEs for owner/group/world; the sticky/suid/sgid
//! bits collapse into the `01777` mask on the way back out, matching the
//! observed NTFS-compatibility behavior the source emulates rather than a
//! faithful POSIX ACL model.

use super::descriptor::{Ace, AceType, SecurityDescriptor};
use super::sid::Sid;

/// `(owner uid, owning gid, permission mode)`. Only the low 12 bits of `mode`
/// (`rwxrwxrwx` plus sticky/suid/sgid) participate in the SD; anything higher
/// is discarded, matching §8's SD round-trip property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PosixIdentity {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
}

const MODE_MASK: u32 = 0o1777;

const READ_DATA: u32 = crate::attributes::DesiredAccess::READ_DATA.bits();
const WRITE_DATA: u32 = crate::attributes::DesiredAccess::WRITE_DATA.bits();
const EXECUTE: u32 = crate::attributes::DesiredAccess::EXECUTE.bits();
const READ_CONTROL: u32 = crate::attributes::DesiredAccess::READ_CONTROL.bits();
const SYNCHRONIZE: u32 = crate::attributes::DesiredAccess::SYNCHRONIZE.bits();

fn access_mask_for_rwx(rwx: u32) -> u32 {
    let mut mask = READ_CONTROL | SYNCHRONIZE;
    if rwx & 0o4 != 0 {
        mask |= READ_DATA;
    }
    if rwx & 0o2 != 0 {
        mask |= WRITE_DATA;
    }
    if rwx & 0o1 != 0 {
        mask |= EXECUTE;
    }
    mask
}

fn rwx_from_access_mask(mask: u32) -> u32 {
    let mut rwx = 0;
    if mask & READ_DATA != 0 {
        rwx |= 0o4;
    }
    if mask & WRITE_DATA != 0 {
        rwx |= 0o2;
    }
    if mask & EXECUTE != 0 {
        rwx |= 0o1;
    }
    rwx
}

/// Builds a self-relative SD from a POSIX identity, with owner-ACE,
/// group-ACE, and world-ACE allow entries in that order.
#[must_use]
pub fn build_security_descriptor(identity: PosixIdentity) -> SecurityDescriptor {
    let owner_sid = super::identity_map::sid_for_id(identity.uid)
        .unwrap_or_else(|| Sid::new([0, 0, 0, 0, 0, 21], vec![0, 0, 0, identity.uid]));
    let group_sid = super::identity_map::sid_for_id(identity.gid)
        .unwrap_or_else(|| Sid::new([0, 0, 0, 0, 0, 21], vec![0, 0, 0, identity.gid]));
    let world_sid = super::sid::WellKnownSid::Everyone.sid();

    let owner_rwx = (identity.mode >> 6) & 0o7;
    let group_rwx = (identity.mode >> 3) & 0o7;
    let world_rwx = identity.mode & 0o7;

    let dacl = vec![
        Ace {
            ace_type: AceType::AccessAllowed,
            access_mask: access_mask_for_rwx(owner_rwx),
            sid: owner_sid.clone(),
        },
        Ace {
            ace_type: AceType::AccessAllowed,
            access_mask: access_mask_for_rwx(group_rwx),
            sid: group_sid.clone(),
        },
        Ace {
            ace_type: AceType::AccessAllowed,
            access_mask: access_mask_for_rwx(world_rwx),
            sid: world_sid,
        },
    ];

    SecurityDescriptor {
        owner: Some(owner_sid),
        group: Some(group_sid),
        dacl,
        sacl: Vec::new(),
    }
}

/// Recovers the `(uid, gid, mode)` an SD built by [`build_security_descriptor`]
/// encodes. Sticky/suid/sgid bits are never encoded in the DACL, so they are
/// always reported as 0 here — callers that need them must track them
/// out of band, which is why §8 states the round trip only up to `mode &
/// 0o1777` and `build_security_descriptor` never sets bits above `0o777`.
#[must_use]
pub fn posix_identity_from_security_descriptor(sd: &SecurityDescriptor) -> PosixIdentity {
    let owner = sd.owner.clone().unwrap_or_else(|| super::sid::WellKnownSid::Everyone.sid());
    let group = sd.group.clone().unwrap_or_else(|| super::sid::WellKnownSid::Everyone.sid());
    let uid = super::identity_map::id_for_sid(&owner).unwrap_or(super::identity_map::UNMAPPED_ID);
    let gid = super::identity_map::id_for_sid(&group).unwrap_or(super::identity_map::UNMAPPED_ID);

    let mut mode = 0u32;
    for ace in &sd.dacl {
        if ace.ace_type != AceType::AccessAllowed {
            continue;
        }
        let rwx = rwx_from_access_mask(ace.access_mask);
        if ace.sid == owner {
            mode |= rwx << 6;
        } else if ace.sid == group {
            mode |= rwx << 3;
        } else {
            mode |= rwx;
        }
    }

    PosixIdentity {
        uid,
        gid,
        mode: mode & MODE_MASK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mode_bits() {
        super::super::identity_map::register_identity(1000, Sid::new([0, 0, 0, 0, 0, 21], vec![1, 2, 3, 1000]));
        super::super::identity_map::register_identity(1000 + 1, Sid::new([0, 0, 0, 0, 0, 21], vec![1, 2, 3, 1001]));
        let identity = PosixIdentity { uid: 1000, gid: 1001, mode: 0o754 };
        let sd = build_security_descriptor(identity);
        let back = posix_identity_from_security_descriptor(&sd);
        assert_eq!(back, identity);
    }

    #[test]
    fn sticky_bits_do_not_survive_round_trip() {
        super::super::identity_map::register_identity(2000, Sid::new([0, 0, 0, 0, 0, 21], vec![9, 9, 9, 2000]));
        super::super::identity_map::register_identity(2001, Sid::new([0, 0, 0, 0, 0, 21], vec![9, 9, 9, 2001]));
        let identity = PosixIdentity { uid: 2000, gid: 2001, mode: 0o7755 };
        let sd = build_security_descriptor(identity);
        let back = posix_identity_from_security_descriptor(&sd);
        assert_eq!(back.mode, 0o755 & MODE_MASK);
    }
}
