//! Indented text view of a keyed thread.
//!
//! Depth comes straight from the key, so no tree is rebuilt here. Records
//! are rendered in slice order; sort with [`crate::sort_thread`] first.

use std::collections::HashSet;
use std::fmt;

use threadkey_types::{SortOptions, ThreadItem};

use crate::key;

/// One record prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLine<'a> {
    pub id: &'a str,
    /// Parent id, only when it names a record in the same slice.
    pub parent: Option<&'a str>,
    /// Nesting depth (0 = root, 1 = reply to a root, etc.).
    pub depth: usize,
}

impl fmt::Display for ThreadLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - item {}", "  ".repeat(self.depth), self.id)?;
        if let Some(parent) = self.parent {
            write!(f, " (parent {parent})")?;
        }
        Ok(())
    }
}

/// Derives display lines from assigned keys.
///
/// A record without a key is shown at depth 0.
pub fn thread_lines<'a, T: ThreadItem>(
    items: &'a [T],
    options: &SortOptions,
) -> Vec<ThreadLine<'a>> {
    let ids: HashSet<&str> = items.iter().map(|item| item.id()).collect();

    items
        .iter()
        .map(|item| ThreadLine {
            id: item.id(),
            parent: item.parent().filter(|p| ids.contains(p)),
            depth: item.key().map_or(0, |k| key::depth(k, options)),
        })
        .collect()
}

/// Renders the thread with the default key layout.
pub fn format_thread<T: ThreadItem>(items: &[T]) -> String {
    format_thread_with(items, &SortOptions::default())
}

/// Renders the thread, one line per record, joined by newlines.
pub fn format_thread_with<T: ThreadItem>(items: &[T], options: &SortOptions) -> String {
    thread_lines(items, options)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use threadkey_types::Item;

    use super::*;

    #[test]
    fn test_empty() {
        let items: Vec<Item> = Vec::new();
        assert_eq!(format_thread(&items), "");
    }

    #[test]
    fn test_depth_from_key() {
        let items = vec![
            Item::new("a").with_key("00."),
            Item::new("b").with_parent("a").with_key("00/00."),
            Item::new("c").with_parent("b").with_key("00/00/00."),
        ];
        let lines = thread_lines(&items, &SortOptions::default());
        assert_eq!(
            lines.iter().map(|l| l.depth).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_line_format() {
        let items = vec![
            Item::new("1").with_key("00."),
            Item::new("2").with_parent("1").with_key("00/00."),
            Item::new("3").with_parent("2").with_key("00/00/00."),
        ];
        assert_eq!(
            format_thread(&items),
            " - item 1\n   - item 2 (parent 1)\n     - item 3 (parent 2)"
        );
    }

    #[test]
    fn test_dangling_parent_clause_is_omitted() {
        let items = vec![Item::new("x").with_parent("gone").with_key("00.")];
        assert_eq!(format_thread(&items), " - item x");
    }

    #[test]
    fn test_unkeyed_renders_at_root_depth() {
        let items = vec![Item::new("a"), Item::new("b").with_parent("a")];
        assert_eq!(format_thread(&items), " - item a\n - item b (parent a)");
    }

    #[test]
    fn test_custom_layout_depth() {
        let opts = SortOptions::new("!", ":").unwrap();
        let items = vec![
            Item::new("a").with_key("00!"),
            Item::new("b").with_parent("a").with_key("00:00!"),
        ];
        assert_eq!(
            format_thread_with(&items, &opts),
            " - item a\n   - item b (parent a)"
        );
        // The default layout sees a single segment here.
        assert_eq!(format_thread(&items), " - item a\n - item b (parent a)");
    }

    #[test]
    fn test_does_not_reorder() {
        let items = vec![
            Item::new("b").with_parent("a").with_key("00/00."),
            Item::new("a").with_key("00."),
        ];
        let lines = thread_lines(&items, &SortOptions::default());
        assert_eq!(lines[0].id, "b");
        assert_eq!(lines[1].id, "a");
    }
}
