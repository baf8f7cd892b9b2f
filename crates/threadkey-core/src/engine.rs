//! Incremental key assignment and the final flat sort.
//!
//! Records are keyed in slice order. A record that already has a key is
//! never touched, so a collection can be re-threaded after new records are
//! appended and only the new ones pay for keying.
//!
//! ## Rules
//!
//! - **Roots**: no `parent`, or a `parent` that matches no `id`. A root takes
//!   the slot after the highest keyed root.
//! - **Children**: the parent is keyed first (recursively), then the child
//!   takes the slot after its highest keyed sibling, under the parent's
//!   prefix.
//!
//! Because only already-keyed siblings are considered, new siblings keep the
//! relative order in which the caller supplied them.
//!
//! Recursion depth equals tree depth. Very deep chains can exhaust the
//! stack; there is no explicit bound.

use std::collections::HashMap;

use threadkey_types::{SortOptions, ThreadItem};
use tracing::{debug, trace, warn};

use crate::error::ThreadError;
use crate::key;

/// Keys every unkeyed record, then sorts the slice by key.
///
/// Returns the same slice, now in preorder.
///
/// # Errors
/// Fails on an ancestor cycle or an internal consistency fault. Keys
/// assigned before the failure are kept.
pub fn sort_thread<'a, T: ThreadItem>(
    items: &'a mut [T],
    options: &SortOptions,
) -> Result<&'a mut [T], ThreadError> {
    assign_keys(items, options)?;
    items.sort_by(key::compare_items);
    Ok(items)
}

/// Keys every unkeyed record without reordering the slice.
///
/// Returns how many keys were written.
///
/// # Errors
/// See [`sort_thread`].
pub fn assign_keys<T: ThreadItem>(
    items: &mut [T],
    options: &SortOptions,
) -> Result<usize, ThreadError> {
    if !options.marker_sorts_first() {
        warn!(
            end_of_record = %options.end_of_record,
            delimiter = %options.delimiter,
            "end-of-record marker sorts after the delimiter; parents will not precede their replies"
        );
    }

    let mut pass = KeyPass::new(items, options);
    for idx in 0..pass.items.len() {
        pass.assign(idx)?;
    }

    debug!(
        items = pass.items.len(),
        roots = pass.roots.len(),
        written = pass.written,
        "thread keys assigned"
    );
    Ok(pass.written)
}

/// Working state for one keying pass over a borrowed slice.
struct KeyPass<'a, T> {
    items: &'a mut [T],
    options: &'a SortOptions,
    /// First index for each id.
    by_id: HashMap<String, usize>,
    /// Parent id -> indices of records whose parent resolves to it.
    children: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
    in_progress: Vec<bool>,
    written: usize,
}

impl<'a, T: ThreadItem> KeyPass<'a, T> {
    fn new(items: &'a mut [T], options: &'a SortOptions) -> Self {
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            by_id.entry(item.id().to_string()).or_insert(idx);
        }

        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match item.parent() {
                Some(parent) if by_id.contains_key(parent) => {
                    children.entry(parent.to_string()).or_default().push(idx);
                }
                _ => roots.push(idx),
            }
        }

        let in_progress = vec![false; items.len()];
        Self {
            items,
            options,
            by_id,
            children,
            roots,
            in_progress,
            written: 0,
        }
    }

    /// Parent id of `idx` when it resolves to a record in the slice.
    fn resolvable_parent(&self, idx: usize) -> Option<String> {
        let item = &self.items[idx];
        match item.parent() {
            Some(parent) if self.by_id.contains_key(parent) => Some(parent.to_string()),
            Some(parent) => {
                debug!(
                    id = item.id(),
                    parent_id = parent,
                    "parent not found, keying as root"
                );
                None
            }
            None => None,
        }
    }

    fn assign(&mut self, idx: usize) -> Result<(), ThreadError> {
        if self.items[idx].key().is_some() {
            return Ok(());
        }
        if self.in_progress[idx] {
            return Err(ThreadError::Cycle {
                id: self.items[idx].id().to_string(),
            });
        }

        let key = match self.resolvable_parent(idx) {
            None => self.root_key(),
            Some(parent) => {
                self.in_progress[idx] = true;
                let key = self.child_key(idx, &parent);
                self.in_progress[idx] = false;
                key?
            }
        };

        trace!(id = self.items[idx].id(), key = %key, "assigned key");
        self.items[idx].set_key(key);
        if self.items[idx].key().is_none() {
            return Err(ThreadError::KeyNotStored {
                id: self.items[idx].id().to_string(),
            });
        }
        self.written += 1;
        Ok(())
    }

    fn root_key(&self) -> String {
        let previous = self
            .max_key(&self.roots)
            .and_then(|max| parse_or_restart(key::first_segment(max, self.options), max));
        key::compose("", key::next_index(previous), self.options)
    }

    fn child_key(&mut self, idx: usize, parent: &str) -> Result<String, ThreadError> {
        let Some(&parent_idx) = self.by_id.get(parent) else {
            return Err(ThreadError::MissingParent {
                id: self.items[idx].id().to_string(),
                parent: parent.to_string(),
            });
        };

        self.assign(parent_idx)?;

        let Some(parent_key) = self.items[parent_idx].key() else {
            return Err(ThreadError::KeyNotStored {
                id: self.items[parent_idx].id().to_string(),
            });
        };
        let prefix = key::child_prefix(parent_key, self.options);

        let siblings = self.children.get(parent).map_or(&[][..], Vec::as_slice);
        let previous = self
            .max_key(siblings)
            .and_then(|max| parse_or_restart(key::last_segment(max, self.options), max));

        Ok(key::compose(&prefix, key::next_index(previous), self.options))
    }

    /// Highest key among the keyed records of `group`.
    fn max_key(&self, group: &[usize]) -> Option<&str> {
        group
            .iter()
            .filter_map(|&i| self.items[i].key())
            .max_by(|a, b| key::compare_keys(Some(*a), Some(*b)))
    }
}

fn parse_or_restart(segment: &str, full_key: &str) -> Option<u64> {
    let parsed = key::parse_segment(segment);
    if parsed.is_none() {
        warn!(
            key = full_key,
            segment, "unparseable key segment, restarting sibling count"
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use threadkey_types::Item;

    use super::*;

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn key_of<'a>(items: &'a [Item], id: &str) -> &'a str {
        items
            .iter()
            .find(|i| i.id == id)
            .and_then(|i| i.key.as_deref())
            .unwrap()
    }

    #[test]
    fn test_empty_collection() {
        let mut items: Vec<Item> = Vec::new();
        let sorted = sort_thread(&mut items, &SortOptions::default()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_single_root() {
        let mut items = vec![Item::new("a")];
        sort_thread(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(items[0].key.as_deref(), Some("00."));
    }

    #[test]
    fn test_roots_keep_input_order() {
        let mut items = vec![Item::new("c"), Item::new("a"), Item::new("b")];
        sort_thread(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
        assert_eq!(key_of(&items, "c"), "00.");
        assert_eq!(key_of(&items, "a"), "01.");
        assert_eq!(key_of(&items, "b"), "02.");
    }

    #[test]
    fn test_children_follow_parent() {
        let mut items = vec![
            Item::new("a"),
            Item::new("b"),
            Item::new("a1").with_parent("a"),
            Item::new("a2").with_parent("a"),
            Item::new("a1x").with_parent("a1"),
        ];
        sort_thread(&mut items, &SortOptions::default()).unwrap();

        assert_eq!(ids(&items), vec!["a", "a1", "a1x", "a2", "b"]);
        assert_eq!(key_of(&items, "a1"), "00/00.");
        assert_eq!(key_of(&items, "a2"), "00/01.");
        assert_eq!(key_of(&items, "a1x"), "00/00/00.");
        assert_eq!(key_of(&items, "b"), "01.");
    }

    #[test]
    fn test_child_listed_before_parent() {
        let mut items = vec![Item::new("b").with_parent("a"), Item::new("a")];
        sort_thread(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(ids(&items), vec!["a", "b"]);
        assert_eq!(key_of(&items, "a"), "00.");
        assert_eq!(key_of(&items, "b"), "00/00.");
    }

    #[test]
    fn test_broken_parent_becomes_root() {
        let mut items = vec![Item::new("a"), Item::new("b").with_parent("missing")];
        sort_thread(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(key_of(&items, "b"), "01.");
    }

    #[test]
    fn test_existing_keys_are_kept() {
        let mut items = vec![
            Item::new("a").with_key("00."),
            Item::new("a1").with_parent("a").with_key("00/00."),
            Item::new("a2").with_parent("a"),
            Item::new("b"),
        ];
        let written = assign_keys(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(written, 2);
        assert_eq!(key_of(&items, "a1"), "00/00.");
        assert_eq!(key_of(&items, "a2"), "00/01.");
        assert_eq!(key_of(&items, "b"), "01.");
    }

    #[test]
    fn test_new_sibling_slots_after_gap() {
        // Sibling "a3" was keyed earlier at slot 5; new replies go after it.
        let mut items = vec![
            Item::new("a").with_key("00."),
            Item::new("a3").with_parent("a").with_key("00/05."),
            Item::new("a4").with_parent("a"),
        ];
        assign_keys(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(key_of(&items, "a4"), "00/06.");
    }

    #[test]
    fn test_assign_keys_does_not_reorder() {
        let mut items = vec![Item::new("b").with_parent("a"), Item::new("a")];
        assign_keys(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(ids(&items), vec!["b", "a"]);
    }

    #[test]
    fn test_custom_options() {
        let opts = SortOptions::new("!", ":").unwrap();
        let mut items = vec![Item::new("a"), Item::new("b").with_parent("a")];
        sort_thread(&mut items, &opts).unwrap();
        assert_eq!(key_of(&items, "a"), "00!");
        assert_eq!(key_of(&items, "b"), "00:00!");
    }

    #[test]
    fn test_duplicate_id_resolves_to_first() {
        let mut items = vec![
            Item::new("a"),
            Item::new("a"),
            Item::new("c").with_parent("a"),
        ];
        assign_keys(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(items[2].key.as_deref(), Some("00/00."));
    }

    #[test]
    fn test_unparseable_max_key_restarts_count() {
        let mut items = vec![Item::new("x").with_key("!!."), Item::new("y")];
        assign_keys(&mut items, &SortOptions::default()).unwrap();
        assert_eq!(key_of(&items, "y"), "00.");
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut items = vec![
            Item::new("a").with_parent("b"),
            Item::new("b").with_parent("a"),
        ];
        let err = sort_thread(&mut items, &SortOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ThreadError::Cycle {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_self_parent_is_reported() {
        let mut items = vec![Item::new("a").with_parent("a")];
        let err = assign_keys(&mut items, &SortOptions::default()).unwrap_err();
        assert!(matches!(err, ThreadError::Cycle { .. }));
    }

    #[test]
    fn test_fault_keeps_keys_written_before_it() {
        let mut items = vec![
            Item::new("ok"),
            Item::new("a").with_parent("b"),
            Item::new("b").with_parent("a"),
        ];
        assert!(assign_keys(&mut items, &SortOptions::default()).is_err());
        assert_eq!(items[0].key.as_deref(), Some("00."));
    }

    /// Parent resolution in the child path is re-checked even though the
    /// root-ness check already proved it; a miss there is a hard fault.
    #[test]
    fn test_missing_parent_during_child_keying_is_a_fault() {
        let mut items = vec![Item::new("a"), Item::new("b").with_parent("a")];
        let opts = SortOptions::default();
        let mut pass = KeyPass::new(&mut items, &opts);

        let err = pass.child_key(1, "ghost").unwrap_err();
        assert_eq!(
            err,
            ThreadError::MissingParent {
                id: "b".to_string(),
                parent: "ghost".to_string(),
            }
        );
        assert!(err.to_string().contains("internal consistency fault"));
    }

    /// A record type that drops whatever key it is given.
    struct Forgetful {
        id: String,
    }

    impl ThreadItem for Forgetful {
        fn id(&self) -> &str {
            &self.id
        }
        fn parent(&self) -> Option<&str> {
            None
        }
        fn key(&self) -> Option<&str> {
            None
        }
        fn set_key(&mut self, _key: String) {}
    }

    #[test]
    fn test_record_that_drops_key_is_a_fault() {
        let mut items = vec![Forgetful {
            id: "f".to_string(),
        }];
        let err = assign_keys(&mut items, &SortOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ThreadError::KeyNotStored {
                id: "f".to_string()
            }
        );
    }
}
