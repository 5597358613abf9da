// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Split assignment state
//
// The split map is the client's local projection of which friends are
// assigned to which receipt items. It is derived from server data exactly
// once, when a receipt is loaded; after that the local copy is authoritative
// and every change is pushed back whole (never as a diff).

use crate::types::Split;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from item id to the set of assigned friend ids.
///
/// Toggling is pure: callers get a new map back, so anything holding the
/// previous snapshot (aggregation, an in-flight sync) stays consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitMap {
    assignments: BTreeMap<String, BTreeSet<String>>,
}

/// One flattened assignment row for the replace-splits endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitItem {
    pub friend_id: String,
    pub item_id: String,
    pub quantity: i64,
}

impl SplitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project the server's split rows into a map. Used only at load time;
    /// later server responses never overwrite local state.
    pub fn from_splits(splits: &[Split]) -> Self {
        let mut assignments: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for split in splits {
            assignments
                .entry(split.order_item_id.clone())
                .or_default()
                .insert(split.friend_id.clone());
        }
        Self { assignments }
    }

    /// Flip a friend's assignment on an item: absent adds, present removes.
    /// Item ids that were never seen are treated as an empty set.
    pub fn toggle(&self, item_id: &str, friend_id: &str) -> Self {
        let mut next = self.clone();
        let assigned = next.assignments.entry(item_id.to_string()).or_default();

        if !assigned.remove(friend_id) {
            assigned.insert(friend_id.to_string());
        }

        // Drop empty sets so a toggled-off item compares equal to one that
        // was never touched.
        if assigned.is_empty() {
            next.assignments.remove(item_id);
        }

        next
    }

    /// Friends currently assigned to an item
    pub fn assigned(&self, item_id: &str) -> impl Iterator<Item = &str> {
        self.assignments
            .get(item_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of friends assigned to an item
    pub fn assignee_count(&self, item_id: &str) -> usize {
        self.assignments.get(item_id).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, item_id: &str, friend_id: &str) -> bool {
        self.assignments
            .get(item_id)
            .is_some_and(|set| set.contains(friend_id))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Flatten the full current state into sync rows, quantity fixed at 1.
    /// Deterministic order (item id, then friend id).
    pub fn sync_items(&self) -> Vec<SplitItem> {
        self.assignments
            .iter()
            .flat_map(|(item_id, friends)| {
                friends.iter().map(move |friend_id| SplitItem {
                    friend_id: friend_id.clone(),
                    item_id: item_id.clone(),
                    quantity: 1,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(id: &str, friend: &str, item: &str) -> Split {
        Split {
            id: id.to_string(),
            friend_id: friend.to_string(),
            order_item_id: item.to_string(),
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let map = SplitMap::new();
        let on = map.toggle("i1", "f1");
        assert!(on.contains("i1", "f1"));

        let off = on.toggle("i1", "f1");
        assert!(!off.contains("i1", "f1"));
    }

    #[test]
    fn test_double_toggle_restores_prior_state() {
        let map = SplitMap::from_splits(&[split("s1", "f1", "i1")]);
        let after = map.toggle("i2", "f2").toggle("i2", "f2");
        assert_eq!(after, map);
    }

    #[test]
    fn test_toggle_does_not_mutate_original() {
        let map = SplitMap::new();
        let _on = map.toggle("i1", "f1");
        assert!(map.is_empty());
    }

    #[test]
    fn test_friend_appears_at_most_once_per_item() {
        let map = SplitMap::from_splits(&[
            split("s1", "f1", "i1"),
            split("s2", "f1", "i1"),
            split("s3", "f2", "i1"),
        ]);
        assert_eq!(map.assignee_count("i1"), 2);

        // An odd number of toggles over duplicates still yields presence or
        // absence, never a count.
        let toggled = map.toggle("i1", "f1").toggle("i1", "f1").toggle("i1", "f1");
        assert_eq!(toggled.assignee_count("i1"), 1);
        assert!(!toggled.contains("i1", "f1"));
        assert!(toggled.contains("i1", "f2"));
    }

    #[test]
    fn test_unknown_item_is_empty_set() {
        let map = SplitMap::new();
        assert_eq!(map.assignee_count("nope"), 0);
        let on = map.toggle("nope", "f1");
        assert_eq!(on.assignee_count("nope"), 1);
    }

    #[test]
    fn test_sync_items_flatten_full_state() {
        let map = SplitMap::new()
            .toggle("i2", "f1")
            .toggle("i1", "f2")
            .toggle("i1", "f1");

        let items = map.sync_items();
        assert_eq!(
            items,
            vec![
                SplitItem {
                    friend_id: "f1".to_string(),
                    item_id: "i1".to_string(),
                    quantity: 1,
                },
                SplitItem {
                    friend_id: "f2".to_string(),
                    item_id: "i1".to_string(),
                    quantity: 1,
                },
                SplitItem {
                    friend_id: "f1".to_string(),
                    item_id: "i2".to_string(),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_from_splits_round_trips_through_sync_items() {
        let map = SplitMap::from_splits(&[split("s1", "f1", "i1"), split("s2", "f2", "i1")]);
        let items = map.sync_items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.quantity == 1));
    }
}
