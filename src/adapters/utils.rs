//! Shared utilities for adapter-layer validation.
//!
//! Node names end up as file names (lock files, device nodes), so every
//! registry adapter and the config validator check them the same way.

use crate::config::NAME_CAPACITY;

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
pub(crate) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// A usable node name: non-empty, at most [`NAME_CAPACITY`] bytes,
/// printable ASCII, no path separator, and not `.` or `..`.
pub(crate) fn is_valid_node_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= NAME_CAPACITY
        && is_printable_ascii(s)
        && !s.contains('/')
        && s != "."
        && s != ".."
}
