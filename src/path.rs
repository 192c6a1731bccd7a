//! Path splitting, rejoining, and name validation.
//!
//! The original contract destructively splits a caller-owned buffer in place
//! and requires the caller to `combine` before reusing it. Rust's ownership
//! model makes that unnecessary: `prefix`/`suffix` return borrowed slices of
//! the input instead of mutating it, and `combine` is a plain concatenation.
//! The laws in (`combine(split(p)) == p`) still hold, just without the
//! in-place mutation machinery.

use std::fmt;

pub const SEPARATOR: char = '\\';
pub const ROOT: &str = "\\";

#[derive(Debug, Eq, PartialEq)]
pub enum PathError {
    /// The path contains an embedded NUL, which Windows path strings cannot.
    EmbeddedNul,
    /// The path contains a character disallowed in a file-name component
    /// (`< > : " | ? *` or a control character).
    DisallowedCharacter(char),
    /// A component exceeded the volume's configured maximum length.
    ComponentTooLong { component_len: usize, max: u16 },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::EmbeddedNul => write!(f, "path contains an embedded NUL"),
            PathError::DisallowedCharacter(c) => write!(f, "path contains disallowed character {c:?}"),
            PathError::ComponentTooLong { component_len, max } => {
                write!(f, "path component of length {component_len} exceeds maximum of {max}")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Splits `path` at the first separator. A leading separator yields
/// [`ROOT`] as the prefix with the remainder (sans leading separator) as the
/// suffix, matching the source's "canonical root token" behavior.
#[must_use]
pub fn prefix(path: &str) -> (&str, Option<&str>) {
    if let Some(rest) = path.strip_prefix(SEPARATOR) {
        return (ROOT, Some(rest));
    }
    match path.find(SEPARATOR) {
        Some(idx) => (&path[..idx], Some(&path[idx + 1..])),
        None => (path, None),
    }
}

/// Splits `path` at the last separator; symmetric to [`prefix`].
#[must_use]
pub fn suffix(path: &str) -> (Option<&str>, &str) {
    match path.rfind(SEPARATOR) {
        Some(idx) => (Some(&path[..idx]), &path[idx + 1..]),
        None => (None, path),
    }
}

/// Rejoins a `(head, tail)` pair produced by [`prefix`] or [`suffix`],
/// restoring the separator that was split on.
#[must_use]
pub fn combine(head: &str, tail: Option<&str>) -> String {
    match tail {
        Some(tail) if head == ROOT => format!("{ROOT}{tail}"),
        Some(tail) => format!("{head}{SEPARATOR}{tail}"),
        None => head.to_string(),
    }
}

const DISALLOWED_CHARACTERS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Validates a single path or component against NUL, disallowed-character,
/// and max-component-length rules. When `named_streams` is `true`, a `:`
/// delimited stream-name tail is split off and validated separately rather
/// than rejected as a disallowed character.
pub fn is_valid(name: &str, max_component_length: u16, named_streams: bool) -> Result<(), PathError> {
    if name.contains('\0') {
        return Err(PathError::EmbeddedNul);
    }
    let (base, stream) = if named_streams {
        match name.split_once(':') {
            Some((base, stream)) => (base, Some(stream)),
            None => (name, None),
        }
    } else {
        (name, None)
    };
    for component in base.split(SEPARATOR) {
        if component.is_empty() {
            continue;
        }
        for c in component.chars() {
            if DISALLOWED_CHARACTERS.contains(&c) || (c as u32) < 0x20 {
                return Err(PathError::DisallowedCharacter(c));
            }
        }
        let component_len = component.encode_utf16().count();
        if component_len > max_component_length as usize {
            return Err(PathError::ComponentTooLong {
                component_len,
                max: max_component_length,
            });
        }
    }
    if let Some(stream) = stream {
        for c in stream.chars() {
            if c == ':' || (c as u32) < 0x20 {
                return Err(PathError::DisallowedCharacter(c));
            }
        }
    }
    Ok(())
}

/// Extracts the stream-name tail of a `path:stream` name, if any.
#[must_use]
pub fn stream_name(name: &str) -> Option<&str> {
    name.split_once(':').map(|(_, stream)| stream)
}
