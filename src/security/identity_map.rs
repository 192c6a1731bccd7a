//! Process-wide, bidirectional POSIX uid/gid ↔ SID table.
//!
//! A single `bimap::BiHashMap` behind a `parking_lot::RwLock` (the crate's
//! lock of choice elsewhere), lazily populated via `once_cell::sync::Lazy`.

use bimap::BiHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::sid::{Sid, WellKnownSid};

/// A reserved uid/gid value meaning "this identity has no POSIX mapping".
pub const UNMAPPED_ID: u32 = u32::MAX;

static WELL_KNOWN_UID_BASE: u32 = 0xFFFF_0000;

struct IdentityMap {
    table: RwLock<BiHashMap<u32, Sid>>,
}

impl IdentityMap {
    fn new() -> IdentityMap {
        let mut table = BiHashMap::new();
        for (index, well_known) in WellKnownSid::all().into_iter().enumerate() {
            table.insert(WELL_KNOWN_UID_BASE + index as u32, well_known.sid());
        }
        IdentityMap {
            table: RwLock::new(table),
        }
    }
}

static IDENTITY_MAP: Lazy<IdentityMap> = Lazy::new(IdentityMap::new);

/// Looks up (or assigns) the SID corresponding to a POSIX uid/gid.
#[must_use]
pub fn sid_for_id(id: u32) -> Option<Sid> {
    IDENTITY_MAP.table.read().get_by_left(&id).cloned()
}

/// Looks up (or assigns) the POSIX uid/gid corresponding to a SID.
#[must_use]
pub fn id_for_sid(sid: &Sid) -> Option<u32> {
    IDENTITY_MAP.table.read().get_by_right(sid).copied()
}

/// Registers a caller-supplied `(id, sid)` pair, the "caller-supplied table"
/// describes sitting alongside the well-known encodings.
///
/// If either side of the pair is already registered under a different
/// counterpart, the stale pair is evicted first (insertion into a
/// `BiHashMap` is otherwise a silent no-op in that case).
pub fn register_identity(id: u32, sid: Sid) {
    let mut table = IDENTITY_MAP.table.write();
    table.remove_by_left(&id);
    table.remove_by_right(&sid);
    table.insert(id, sid);
}
