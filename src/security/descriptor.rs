//! Self-relative security-descriptor composition and editing.
//!
//! The source passes a heap-allocated SD around by raw pointer, tagged by
//! which construction function produced it so the matching deallocator can be
//! found later. Rust has no need for that: [`SecurityDescriptor`] owns its
//! ACLs directly, and [`ConstructionTag`] is kept only as a field recording
//! provenance for diagnostics, per design note that a rewrite
//! should use "a tagged-variant owner type" rather than re-deriving the tagged
//! pointer/allocator dance.

use bitflags::bitflags;

use super::sid::Sid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AceType {
    AccessAllowed,
    AccessDenied,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ace {
    pub ace_type: AceType,
    pub access_mask: u32,
    pub sid: Sid,
}

bitflags! {
    /// Mirrors `SECURITY_INFORMATION`: selects which parts of an SD a
    /// `SetSecurity` request or an [`edit`] call touches.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct SecurityInformation: u32 {
        const OWNER = 0x0000_0001;
        const GROUP = 0x0000_0002;
        const DACL = 0x0000_0004;
        const SACL = 0x0000_0008;
    }
}

/// Records which construction path produced a [`SecurityDescriptor`], purely
/// for diagnostics; ownership itself is ordinary Rust ownership, not a tagged
/// allocator dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstructionTag {
    FromPosixMode,
    ComposedFromParent,
    Edited,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct SecurityDescriptor {
    pub owner: Option<Sid>,
    pub group: Option<Sid>,
    pub dacl: Vec<Ace>,
    pub sacl: Vec<Ace>,
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn read_len_prefixed<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<&'a [u8]> {
    let len = u16::from_le_bytes(bytes.get(*cursor..*cursor + 2)?.try_into().ok()?) as usize;
    *cursor += 2;
    let slice = bytes.get(*cursor..*cursor + len)?;
    *cursor += len;
    Some(slice)
}

fn write_ace_list(out: &mut Vec<u8>, aces: &[Ace]) {
    out.extend_from_slice(&(aces.len() as u16).to_le_bytes());
    for ace in aces {
        out.push(match ace.ace_type {
            AceType::AccessAllowed => 0,
            AceType::AccessDenied => 1,
        });
        out.extend_from_slice(&ace.access_mask.to_le_bytes());
        write_len_prefixed(out, &ace.sid.to_bytes());
    }
}

fn read_ace_list(bytes: &[u8], cursor: &mut usize) -> Option<Vec<Ace>> {
    let count = u16::from_le_bytes(bytes.get(*cursor..*cursor + 2)?.try_into().ok()?) as usize;
    *cursor += 2;
    let mut aces = Vec::with_capacity(count);
    for _ in 0..count {
        let ace_type = match *bytes.get(*cursor)? {
            0 => AceType::AccessAllowed,
            1 => AceType::AccessDenied,
            _ => return None,
        };
        *cursor += 1;
        let access_mask = u32::from_le_bytes(bytes.get(*cursor..*cursor + 4)?.try_into().ok()?);
        *cursor += 4;
        let sid_bytes = read_len_prefixed(bytes, cursor)?;
        let sid = Sid::from_bytes(sid_bytes)?;
        aces.push(Ace { ace_type, access_mask, sid });
    }
    Some(aces)
}

impl SecurityDescriptor {
    /// Encodes this SD into a compact self-relative byte form: length-prefixed
    /// owner/group SIDs followed by a count-prefixed DACL and SACL. Not
    /// bit-compatible with NT's native `SECURITY_DESCRIPTOR` layout, but
    /// round-trips every field the rest of this crate cares about, which is
    /// all `QuerySecurity`/`SetSecurity`/`Create` need from the wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_len_prefixed(&mut out, self.owner.as_ref().map(Sid::to_bytes).unwrap_or_default().as_slice());
        write_len_prefixed(&mut out, self.group.as_ref().map(Sid::to_bytes).unwrap_or_default().as_slice());
        write_ace_list(&mut out, &self.dacl);
        write_ace_list(&mut out, &self.sacl);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<SecurityDescriptor> {
        let mut cursor = 0usize;
        let owner_bytes = read_len_prefixed(bytes, &mut cursor)?;
        let owner = if owner_bytes.is_empty() { None } else { Sid::from_bytes(owner_bytes) };
        let group_bytes = read_len_prefixed(bytes, &mut cursor)?;
        let group = if group_bytes.is_empty() { None } else { Sid::from_bytes(group_bytes) };
        let dacl = read_ace_list(bytes, &mut cursor)?;
        let sacl = read_ace_list(bytes, &mut cursor)?;
        Some(SecurityDescriptor { owner, group, dacl, sacl })
    }
}

/// A [`SecurityDescriptor`] paired with the [`ConstructionTag`] naming how it
/// was built. This is the type `Create`'s handler hands back to the caller;
/// `free` just drops it, but keeping the tag lets logging and tests assert
/// which path produced a given SD.
#[derive(Clone, Debug)]
pub struct TaggedSecurityDescriptor {
    pub tag: ConstructionTag,
    pub descriptor: SecurityDescriptor,
}

impl TaggedSecurityDescriptor {
    #[must_use]
    pub fn free(self) -> SecurityDescriptor {
        self.descriptor
    }
}

/// Composes a child SD from a parent directory's SD and the creating
/// subject's SID: owner/group come from the subject (falling back to the
/// parent's if the subject has none registered), and inheritable ACEs from
/// the parent's DACL are carried forward.
#[must_use]
pub fn compose(parent: &SecurityDescriptor, subject: &Sid) -> TaggedSecurityDescriptor {
    let owner = Some(subject.clone());
    let group = parent.group.clone();
    let dacl = parent.dacl.clone();
    TaggedSecurityDescriptor {
        tag: ConstructionTag::ComposedFromParent,
        descriptor: SecurityDescriptor {
            owner,
            group,
            dacl,
            sacl: parent.sacl.clone(),
        },
    }
}

/// Edits `sd` according to `what_to_modify`, replacing only the selected
/// parts with the corresponding fields of `template`; fields of `template`
/// not selected by `what_to_modify` are ignored. A merge preserves owner,
/// group, and SACL when `template` did not specify them.
pub fn edit(sd: &mut SecurityDescriptor, what_to_modify: SecurityInformation, template: &SecurityDescriptor) {
    if what_to_modify.contains(SecurityInformation::OWNER) {
        if let Some(owner) = &template.owner {
            sd.owner = Some(owner.clone());
        }
    }
    if what_to_modify.contains(SecurityInformation::GROUP) {
        if let Some(group) = &template.group {
            sd.group = Some(group.clone());
        }
    }
    if what_to_modify.contains(SecurityInformation::DACL) {
        sd.dacl = template.dacl.clone();
    }
    if what_to_modify.contains(SecurityInformation::SACL) {
        sd.sacl = template.sacl.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::sid::WellKnownSid;

    fn sample_parent() -> SecurityDescriptor {
        SecurityDescriptor {
            owner: Some(WellKnownSid::Administrators.sid()),
            group: Some(WellKnownSid::AuthenticatedUsers.sid()),
            dacl: vec![Ace {
                ace_type: AceType::AccessAllowed,
                access_mask: 0x1F01FF,
                sid: WellKnownSid::Everyone.sid(),
            }],
            sacl: Vec::new(),
        }
    }

    #[test]
    fn wire_round_trips_full_descriptor() {
        let sd = sample_parent();
        let encoded = sd.to_bytes();
        let decoded = SecurityDescriptor::from_bytes(&encoded).expect("decodes");
        assert_eq!(sd, decoded);
    }

    #[test]
    fn wire_round_trips_empty_descriptor() {
        let sd = SecurityDescriptor::default();
        let encoded = sd.to_bytes();
        let decoded = SecurityDescriptor::from_bytes(&encoded).expect("decodes");
        assert_eq!(sd, decoded);
    }

    #[test]
    fn compose_sets_owner_to_subject_and_keeps_parent_dacl() {
        let parent = sample_parent();
        let subject = WellKnownSid::LocalService.sid();
        let child = compose(&parent, &subject);
        assert_eq!(child.descriptor.owner, Some(subject));
        assert_eq!(child.descriptor.dacl, parent.dacl);
        assert_eq!(child.tag, ConstructionTag::ComposedFromParent);
    }

    #[test]
    fn edit_only_touches_selected_parts() {
        let mut sd = sample_parent();
        let original_group = sd.group.clone();
        let template = SecurityDescriptor {
            owner: Some(WellKnownSid::LocalSystem.sid()),
            group: None,
            dacl: Vec::new(),
            sacl: Vec::new(),
        };
        edit(&mut sd, SecurityInformation::OWNER, &template);
        assert_eq!(sd.owner, Some(WellKnownSid::LocalSystem.sid()));
        assert_eq!(sd.group, original_group);
    }
}
