//! Directory-result buffer: a per-open-handle, sorted,
//! seek-by-marker cache of one enumeration's entries.
//!
//! Entries append into a growable arena; a separate sorted index `Vec`
//! tracks enumeration order by name, so deletion can tombstone a slot without
//! shifting either `Vec`.

use crate::file_info::FileInfo;

/// Sentinel offset marking a logically deleted entry. Deletion leaves the
/// slot in place in the offset array rather than shifting the array, so that
/// concurrent in-flight reads keyed by position are not disturbed.
const INVALID_OFFSET: usize = usize::MAX;

struct ArenaEntry {
    name: String,
    info: FileInfo,
    /// Set by [`DirBuffer::invalidate`]. The entry stays at its sorted
    /// position (so marker-based binary search still sees its name) but is
    /// skipped when emitting.
    deleted: bool,
}

/// A reusable enumeration cache bound to a single open directory handle.
///
/// Lifecycle: created lazily on first [`DirBuffer::acquire`], reset on
/// re-enumeration (`reset=true`), freed by [`DirBuffer::delete`] when the
/// handle closes.
///
/// Ordering is a raw byte comparison of `name`, even on case-insensitive
/// volumes.
#[derive(Default)]
pub struct DirBuffer {
    arena: Vec<ArenaEntry>,
    /// Indices into `arena`, kept sorted by `arena[i].name` after `release`.
    /// `INVALID_OFFSET` marks a deleted slot in place.
    index: Vec<usize>,
    filling: bool,
    released: bool,
}

impl DirBuffer {
    #[must_use]
    pub fn new() -> DirBuffer {
        DirBuffer::default()
    }

    /// Begins (or re-begins) a fill window. Returns `true` if the caller
    /// should enumerate and call [`DirBuffer::fill`]; returns `false` if the
    /// buffer already holds a valid enumeration and `reset` was not
    /// requested (the "no fill needed" shortcut).
    pub fn acquire(&mut self, reset: bool, capacity_hint: usize) -> bool {
        if !reset && self.released {
            return false;
        }
        if reset {
            self.arena.clear();
            self.index.clear();
            self.released = false;
        }
        self.arena.reserve(capacity_hint);
        self.filling = true;
        true
    }

    /// Appends one entry during a fill window. Entries are stored unsorted;
    /// sorting happens once, in [`DirBuffer::release`].
    ///
    /// # Panics
    /// Panics if called outside an active fill window (a handler bug, not an
    /// untrusted-input condition — the dispatcher never calls `fill` without
    /// first calling `acquire`).
    pub fn fill(&mut self, name: impl Into<String>, info: FileInfo) {
        assert!(self.filling, "fill called outside an acquire/release window");
        let index = self.arena.len();
        self.arena.push(ArenaEntry { name: name.into(), info, deleted: false });
        self.index.push(index);
    }

    /// Closes the fill window, sorting the offset array by name (raw byte
    /// comparison; see the struct-level note on case sensitivity).
    pub fn release(&mut self) {
        self.filling = false;
        self.released = true;
        self.index.sort_by(|&a, &b| self.arena[a].name.as_bytes().cmp(self.arena[b].name.as_bytes()));
    }

    /// Marks the arena entry named `name` logically deleted. Its slot stays
    /// in place at its sorted position so marker-based seeks remain correct;
    /// [`DirBuffer::read`] simply skips it.
    pub fn invalidate(&mut self, name: &str) -> bool {
        for &slot in &self.index {
            if slot != INVALID_OFFSET && self.arena[slot].name == name && !self.arena[slot].deleted {
                self.arena[slot].deleted = true;
                return true;
            }
        }
        false
    }

    /// Copies entries strictly after `marker` (or from the start, if `marker`
    /// is `None`) into `out` via `emit`, until `emit` returns `false` (the
    /// caller's buffer is full) or entries are exhausted. Returns the number
    /// of entries written and whether a zero-size terminator should follow
    /// (i.e. whether enumeration reached its end).
    pub fn read(&self, marker: Option<&str>, mut emit: impl FnMut(&str, &FileInfo) -> bool) -> (usize, bool) {
        let start = match marker {
            // First index whose name is strictly greater than `marker`; the
            // array is sorted by name regardless of `deleted`, so this is a
            // correct binary search even with tombstones interspersed.
            Some(marker) => self
                .index
                .partition_point(|&slot| slot != INVALID_OFFSET && self.arena[slot].name.as_bytes() <= marker.as_bytes()),
            None => 0,
        };
        let mut written = 0;
        for &slot in &self.index[start..] {
            if slot == INVALID_OFFSET {
                continue;
            }
            let entry = &self.arena[slot];
            if entry.deleted {
                continue;
            }
            if !emit(&entry.name, &entry.info) {
                return (written, false);
            }
            written += 1;
        }
        (written, true)
    }

    /// Releases the arena and offset array, as happens when the owning
    /// handle closes.
    pub fn delete(&mut self) {
        self.arena = Vec::new();
        self.index = Vec::new();
        self.filling = false;
        self.released = false;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.iter().all(|&slot| slot == INVALID_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_names(buf: &mut DirBuffer, names: &[&str]) {
        assert!(buf.acquire(true, names.len()));
        for name in names {
            buf.fill(*name, FileInfo::default());
        }
        buf.release();
    }

    #[test]
    fn release_sorts_entries_by_name() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["charlie", "alpha", "bravo"]);
        let mut seen = Vec::new();
        buf.read(None, |name, _| {
            seen.push(name.to_string());
            true
        });
        assert_eq!(seen, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn read_seeks_strictly_after_marker() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["a", "b", "c", "d"]);
        let mut seen = Vec::new();
        buf.read(Some("b"), |name, _| {
            seen.push(name.to_string());
            true
        });
        assert_eq!(seen, vec!["c", "d"]);
    }

    #[test]
    fn reacquire_without_reset_skips_refill() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["a"]);
        assert!(!buf.acquire(false, 0));
    }

    #[test]
    fn reacquire_with_reset_discards_old_entries() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["old"]);
        fill_names(&mut buf, &["new"]);
        let mut seen = Vec::new();
        buf.read(None, |name, _| {
            seen.push(name.to_string());
            true
        });
        assert_eq!(seen, vec!["new"]);
    }

    #[test]
    fn invalidated_entries_are_skipped_on_read() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["a", "b", "c"]);
        assert!(buf.invalidate("b"));
        let mut seen = Vec::new();
        buf.read(None, |name, _| {
            seen.push(name.to_string());
            true
        });
        assert_eq!(seen, vec!["a", "c"]);
    }

    #[test]
    fn read_stops_when_emit_reports_buffer_full() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["a", "b", "c"]);
        let mut seen = Vec::new();
        let (written, reached_end) = buf.read(None, |name, _| {
            seen.push(name.to_string());
            seen.len() < 2
        });
        assert_eq!(written, 2);
        assert!(!reached_end);
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn dot_and_dotdot_enumerate_like_any_other_entry() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["..", "."]);
        let mut seen = Vec::new();
        let (written, reached_end) = buf.read(None, |name, _| {
            seen.push(name.to_string());
            true
        });
        assert_eq!(written, 2);
        assert!(reached_end);
        assert_eq!(seen, vec![".", ".."]);
    }

    #[test]
    fn delete_frees_arena_and_index() {
        let mut buf = DirBuffer::new();
        fill_names(&mut buf, &["a"]);
        buf.delete();
        assert!(buf.is_empty());
        assert!(buf.acquire(false, 0));
    }
}
