//! Extended-attribute wire entries.
//!
//! Entries are chained by `next-offset`, the same linked-record shape used
//! for directory entries, with the chain pointer explicit in the wire struct
//! rather than implied by packing.

/// One decoded EA entry. `value` and `name` are owned here rather than
/// borrowed, since EA lists are typically small and built up incrementally by
/// `GetEa`/`SetEa` handlers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedAttribute {
    pub flags: u8,
    pub name: String,
    pub value: Vec<u8>,
}

impl ExtendedAttribute {
    /// The NTFS-compatible "packed size" used for size accounting:
    /// `5 + name_len + value_len`.
    #[must_use]
    pub fn packed_size(&self) -> usize {
        5 + self.name.len() + self.value.len()
    }
}

/// Per-entry alignment applied before the next EA entry in a wire-format
/// list.
pub const EA_ALIGNMENT: usize = 4;

#[must_use]
fn aligned(len: usize) -> usize {
    (len + (EA_ALIGNMENT - 1)) & !(EA_ALIGNMENT - 1)
}

/// Encodes a list of EA entries into the wire's `next-offset`-chained
/// format: `next_offset: u32, flags: u8, name_len: u8, value_len: u16, name,
/// NUL, value`, each entry padded to [`EA_ALIGNMENT`].
#[must_use]
pub fn encode_ea_list(entries: &[ExtendedAttribute]) -> Vec<u8> {
    let mut out = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let start = out.len();
        out.extend_from_slice(&0u32.to_le_bytes()); // next_offset patched below
        out.push(entry.flags);
        out.push(entry.name.len() as u8);
        out.extend_from_slice(&(entry.value.len() as u16).to_le_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0); // NUL terminator after the name, matching FILE_FULL_EA_INFORMATION
        out.extend_from_slice(&entry.value);

        let unpadded_len = out.len() - start;
        let padded_len = aligned(unpadded_len);
        out.resize(start + padded_len, 0);

        let is_last = index + 1 == entries.len();
        let next_offset = if is_last { 0 } else { padded_len as u32 };
        out[start..start + 4].copy_from_slice(&next_offset.to_le_bytes());
    }
    out
}

/// Decodes a wire-format EA list produced by [`encode_ea_list`].
pub fn decode_ea_list(bytes: &[u8]) -> Vec<ExtendedAttribute> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    loop {
        if bytes.len() < offset + 8 {
            break;
        }
        let next_offset = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize;
        let flags = bytes[offset + 4];
        let name_len = bytes[offset + 5] as usize;
        let value_len = u16::from_le_bytes(bytes[offset + 6..offset + 8].try_into().unwrap()) as usize;
        let name_start = offset + 8;
        let name_end = name_start + name_len;
        let value_start = name_end + 1; // skip NUL terminator
        let value_end = value_start + value_len;
        if bytes.len() < value_end {
            break;
        }
        let name = String::from_utf8_lossy(&bytes[name_start..name_end]).into_owned();
        let value = bytes[value_start..value_end].to_vec();
        out.push(ExtendedAttribute { flags, name, value });
        if next_offset == 0 {
            break;
        }
        offset += next_offset;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_size_matches_formula() {
        let ea = ExtendedAttribute { flags: 0, name: "user.x".into(), value: vec![1, 2, 3] };
        assert_eq!(ea.packed_size(), 5 + 6 + 3);
    }

    #[test]
    fn round_trips_single_entry() {
        let entries = vec![ExtendedAttribute { flags: 1, name: "a".into(), value: vec![9, 9] }];
        let encoded = encode_ea_list(&entries);
        let decoded = decode_ea_list(&encoded);
        assert_eq!(decoded, entries);
    }

    #[test]
    fn round_trips_chained_entries() {
        let entries = vec![
            ExtendedAttribute { flags: 0, name: "first".into(), value: vec![1] },
            ExtendedAttribute { flags: 0, name: "second".into(), value: vec![2, 3, 4, 5] },
            ExtendedAttribute { flags: 2, name: "third".into(), value: vec![] },
        ];
        let encoded = encode_ea_list(&entries);
        let decoded = decode_ea_list(&encoded);
        assert_eq!(decoded, entries);
    }

    #[test]
    fn entries_are_padded_to_alignment() {
        let entries = vec![ExtendedAttribute { flags: 0, name: "x".into(), value: vec![] }];
        let encoded = encode_ea_list(&entries);
        assert_eq!(encoded.len() % EA_ALIGNMENT, 0);
    }
}
