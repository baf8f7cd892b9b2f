//! Hierarchy key codec.
//!
//! A key is a delimiter-joined run of base-36 segments followed by a single
//! end-of-record marker, e.g. `00/03/1a.` for the 43rd child of the 4th
//! child of the first root. Segments are zero-padded to two characters, so
//! plain string comparison orders siblings numerically up to `zz` (1295).
//! Past that a segment grows to three characters and string order no longer
//! matches numeric order; nothing here compensates for it.

use std::cmp::Ordering;

use threadkey_types::{SortOptions, ThreadItem};

const RADIX: u64 = 36;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SEGMENT_WIDTH: usize = 2;

/// Formats a sibling index as a zero-padded base-36 segment.
pub fn format_segment(mut n: u64) -> String {
    let mut buf = Vec::with_capacity(SEGMENT_WIDTH + 2);
    loop {
        buf.push(DIGITS[(n % RADIX) as usize]);
        n /= RADIX;
        if n == 0 {
            break;
        }
    }
    while buf.len() < SEGMENT_WIDTH {
        buf.push(b'0');
    }
    buf.reverse();
    // Only ASCII digits were pushed.
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parses the leading base-36 digits of a segment.
///
/// Parsing stops at the first non-digit, so `"0a-junk"` reads as 10.
/// Returns `None` when the segment does not start with a digit or the
/// value does not fit in a `u64`.
pub fn parse_segment(segment: &str) -> Option<u64> {
    let mut value: Option<u64> = None;
    for c in segment.chars() {
        let Some(digit) = c.to_digit(RADIX as u32) else {
            break;
        };
        value = Some(
            value
                .unwrap_or(0)
                .checked_mul(RADIX)?
                .checked_add(u64::from(digit))?,
        );
    }
    value
}

/// Removes the trailing end-of-record marker, if present.
pub fn strip_marker<'a>(key: &'a str, options: &SortOptions) -> &'a str {
    key.strip_suffix(options.end_of_record.as_str())
        .unwrap_or(key)
}

/// Iterates the depth segments of a key, root first.
pub fn segments<'a>(key: &'a str, options: &'a SortOptions) -> impl Iterator<Item = &'a str> {
    strip_marker(key, options).split(options.delimiter.as_str())
}

/// Depth of the record owning `key` (roots are depth 0).
pub fn depth(key: &str, options: &SortOptions) -> usize {
    segments(key, options).count().saturating_sub(1)
}

pub fn first_segment<'a>(key: &'a str, options: &SortOptions) -> &'a str {
    let stripped = strip_marker(key, options);
    stripped
        .split(options.delimiter.as_str())
        .next()
        .unwrap_or(stripped)
}

pub fn last_segment<'a>(key: &'a str, options: &SortOptions) -> &'a str {
    let stripped = strip_marker(key, options);
    stripped
        .rsplit(options.delimiter.as_str())
        .next()
        .unwrap_or(stripped)
}

/// Prefix shared by every child key of `parent_key`.
pub fn child_prefix(parent_key: &str, options: &SortOptions) -> String {
    format!(
        "{}{}",
        strip_marker(parent_key, options),
        options.delimiter
    )
}

/// Builds a complete key from a prefix and a sibling index.
pub fn compose(prefix: &str, index: u64, options: &SortOptions) -> String {
    format!(
        "{prefix}{}{}",
        format_segment(index),
        options.end_of_record
    )
}

/// Index following `previous`, starting at 0 when there is none.
pub fn next_index(previous: Option<u64>) -> u64 {
    previous.map_or(0, |n| n.saturating_add(1))
}

/// Orders two optional keys.
///
/// Full keys (marker included) compare by code point. A missing key on
/// either side compares equal, which only matters for records that have
/// not been keyed yet.
pub fn compare_keys(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// [`compare_keys`] over records.
pub fn compare_items<T: ThreadItem>(a: &T, b: &T) -> Ordering {
    compare_keys(a.key(), b.key())
}
