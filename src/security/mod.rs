//! Security-descriptor builder: SD composition/editing, SID
//! encodings, and the POSIX uid/gid/mode translation layer.

pub mod descriptor;
pub mod identity_map;
pub mod posix;
pub mod sid;

pub use descriptor::{compose, edit, Ace, AceType, ConstructionTag, SecurityDescriptor, SecurityInformation, TaggedSecurityDescriptor};
pub use identity_map::{id_for_sid, register_identity, sid_for_id, UNMAPPED_ID};
pub use posix::{build_security_descriptor, posix_identity_from_security_descriptor, PosixIdentity};
pub use sid::{Sid, WellKnownSid};

/// Translates a CLI-facing identity argument (name, SID string, or numeric
/// uid) into its SID, for the `id`/`perm` boundary named in The
/// actual argument grammar is out of core scope; this is the library call a
/// thin CLI would invoke.
#[must_use]
pub fn translate_identity(id: u32) -> Option<Sid> {
    sid_for_id(id)
}

/// Renders an SD as an SDDL-like summary plus its POSIX permission
/// equivalent, for the `perm` CLI surface named in #[must_use]
pub fn describe_security(sd: &SecurityDescriptor) -> String {
    let identity = posix_identity_from_security_descriptor(sd);
    let owner = sd.owner.as_ref().map(ToString::to_string).unwrap_or_default();
    let group = sd.group.as_ref().map(ToString::to_string).unwrap_or_default();
    format!(
        "owner={owner} group={group} mode={:04o} uid={} gid={}",
        identity.mode, identity.uid, identity.gid
    )
}
