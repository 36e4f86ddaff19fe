//! Diff engine for change log construction.
//!
//! Computes a deep, recursive structural comparison between two record
//! snapshots, producing three nested mappings that mirror the shape of the
//! compared records. Used only to build the change log attached to update
//! results; never consulted for control flow.

use bson::{Bson, Document};

/// Field-level difference between two record snapshots.
///
/// - `added`: keys/paths present in `after` but not `before`, with their new
///   values.
/// - `updated`: paths present in both with different values; the new value is
///   retained. Arrays are compared as whole values and appear here replaced
///   wholesale when unequal.
/// - `deleted`: keys/paths present in `before` but not `after`; removed paths
///   map to `Bson::Null` (there is no value left to carry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailedDiff {
    /// Paths introduced by the update.
    pub added: Document,
    /// Paths whose value changed, holding the new value.
    pub updated: Document,
    /// Paths removed by the update.
    pub deleted: Document,
}

impl DetailedDiff {
    /// Returns `true` when the two snapshots were identical.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Computes the detailed difference between two record snapshots.
pub fn detailed_diff(before: &Document, after: &Document) -> DetailedDiff {
    let mut diff = DetailedDiff::default();

    for (key, after_value) in after {
        match before.get(key) {
            None => {
                diff.added.insert(key.clone(), after_value.clone());
            }
            Some(before_value) if before_value == after_value => {}
            Some(Bson::Document(before_nested)) => {
                if let Bson::Document(after_nested) = after_value {
                    let nested = detailed_diff(before_nested, after_nested);

                    if !nested.added.is_empty() {
                        diff.added.insert(key.clone(), nested.added);
                    }
                    if !nested.updated.is_empty() {
                        diff.updated.insert(key.clone(), nested.updated);
                    }
                    if !nested.deleted.is_empty() {
                        diff.deleted.insert(key.clone(), nested.deleted);
                    }
                } else {
                    diff.updated.insert(key.clone(), after_value.clone());
                }
            }
            Some(_) => {
                diff.updated.insert(key.clone(), after_value.clone());
            }
        }
    }

    for key in before.keys() {
        if !after.contains_key(key) {
            diff.deleted.insert(key.clone(), Bson::Null);
        }
    }

    diff
}

/// Lists the top-level field names whose value differs between the two
/// snapshots, including fields present in only one of them.
///
/// Order: changed/added fields in `after` order, then removed fields in
/// `before` order.
pub fn modified_paths(before: &Document, after: &Document) -> Vec<String> {
    let mut paths: Vec<String> = after
        .iter()
        .filter(|(key, value)| before.get(key.as_str()) != Some(value))
        .map(|(key, _)| key.clone())
        .collect();

    paths.extend(
        before
            .keys()
            .filter(|key| !after.contains_key(key.as_str()))
            .cloned(),
    );

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn added_updated_deleted() {
        let before = doc! { "a": 1, "b": 2 };
        let after = doc! { "a": 1, "b": 3, "c": 4 };

        let diff = detailed_diff(&before, &after);
        assert_eq!(diff.added, doc! { "c": 4 });
        assert_eq!(diff.updated, doc! { "b": 3 });
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn deleted_paths_map_to_null() {
        let before = doc! { "a": 1, "b": 2 };
        let after = doc! { "a": 1 };

        let diff = detailed_diff(&before, &after);
        assert_eq!(diff.deleted, doc! { "b": Bson::Null });
    }

    #[test]
    fn nested_documents_diff_recursively() {
        let before = doc! { "meta": { "x": 1, "y": 2, "gone": true } };
        let after = doc! { "meta": { "x": 1, "y": 3, "new": "v" } };

        let diff = detailed_diff(&before, &after);
        assert_eq!(diff.added, doc! { "meta": { "new": "v" } });
        assert_eq!(diff.updated, doc! { "meta": { "y": 3 } });
        assert_eq!(diff.deleted, doc! { "meta": { "gone": Bson::Null } });
    }

    #[test]
    fn arrays_are_compared_as_whole_values() {
        let before = doc! { "tags": [1, 2] };
        let after = doc! { "tags": [1, 2, 3] };

        let diff = detailed_diff(&before, &after);
        assert_eq!(diff.updated, doc! { "tags": [1, 2, 3] });
        assert!(diff.added.is_empty());
    }

    #[test]
    fn identical_snapshots_yield_empty_diff() {
        let record = doc! { "a": 1, "nested": { "b": 2 } };
        assert!(detailed_diff(&record, &record).is_empty());
    }

    #[test]
    fn modified_paths_are_top_level_only() {
        let before = doc! { "a": 1, "meta": { "x": 1 }, "gone": true };
        let after = doc! { "a": 1, "meta": { "x": 2 }, "new": 5 };

        assert_eq!(modified_paths(&before, &after), vec!["meta", "new", "gone"]);
    }

    #[test]
    fn modified_paths_empty_when_nothing_changed() {
        let record = doc! { "a": 1 };
        assert!(modified_paths(&record, &record).is_empty());
    }
}
