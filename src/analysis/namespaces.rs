//! Namespace filtering

use std::collections::{BTreeSet, HashSet};

/// Drop ignored namespaces and duplicates, keeping first-seen order.
///
/// Ignore entries that don't name any input namespace are simply unused.
pub fn filter_namespaces(all: &[String], ignore: &BTreeSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    all.iter()
        .filter(|ns| !ignore.contains(*ns))
        .filter(|ns| seen.insert(ns.as_str()))
        .cloned()
        .collect()
}
