//! Types shared by the attribute and numeric datasets.

use std::cmp::Ordering;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    /// Uniform choice between the two directions.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    /// Order two values so that a stable sort with this comparator yields the
    /// direction's order, equal values keeping their input order.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort of `items` by `key` in `direction`.
pub fn stable_sorted<T: Clone>(
    items: &[T],
    direction: SortDirection,
    key: impl Fn(&T) -> f64,
) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| direction.compare(key(a), key(b)));
    sorted
}

/// Render strings as a quoted list literal: `['Student A', 'Student B']`.
///
/// This is the canonical answer text the prompts ask models to reproduce.
pub fn list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_sort_keeps_ties_in_input_order_both_ways() {
        let items = vec![("a", 2.0), ("b", 1.0), ("c", 2.0), ("d", 1.0)];
        let asc = stable_sorted(&items, SortDirection::Ascending, |i| i.1);
        let names: Vec<_> = asc.iter().map(|i| i.0).collect();
        assert_eq!(names, ["b", "d", "a", "c"]);

        let desc = stable_sorted(&items, SortDirection::Descending, |i| i.1);
        let names: Vec<_> = desc.iter().map(|i| i.0).collect();
        assert_eq!(names, ["a", "c", "b", "d"]);
    }

    #[test]
    fn list_literal_quotes_each_entry() {
        assert_eq!(list_literal(&["Student A", "Student C"]), "['Student A', 'Student C']");
        assert_eq!(list_literal::<&str>(&[]), "[]");
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&SortDirection::Descending).unwrap();
        assert_eq!(json, "\"descending\"");
    }
}
