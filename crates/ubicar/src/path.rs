//! Path algebra for dot-delimited locator schema paths.
//!
//! A path like `"main.form.button@submit"` names one schema; its *sub-paths*
//! are the ordered sequence of progressively longer prefixes:
//! `"main"`, `"main.form"`, `"main.form.button@submit"`. The `@variant`
//! suffix carries no meaning here beyond being part of the segment identity.
//!
//! All functions are pure; the builder and the legacy numeric addressing
//! mode both rely on the ordering produced by [`sub_paths`].

use std::collections::HashMap;

/// Returns the ordered list of prefixes of `path`.
///
/// `sub_paths("a.b.c")` yields `["a", "a.b", "a.b.c"]`.
#[must_use]
pub fn sub_paths(path: &str) -> Vec<String> {
    let mut cumulative = String::new();
    path.split('.')
        .map(|segment| {
            if cumulative.is_empty() {
                cumulative.push_str(segment);
            } else {
                cumulative.push('.');
                cumulative.push_str(segment);
            }
            cumulative.clone()
        })
        .collect()
}

/// True iff `candidate` equals `full_path` or `full_path` starts with
/// `candidate` followed by a dot.
///
/// Gates which paths an update/filter call may target.
#[must_use]
pub fn is_valid_sub_path(candidate: &str, full_path: &str) -> bool {
    candidate == full_path
        || full_path
            .strip_prefix(candidate)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Returns the 0-based position of `sub_path` within [`sub_paths`]`(path)`.
///
/// Only used to support the deprecated numeric-index addressing mode; agrees
/// exactly with the order sub-paths are produced in.
#[must_use]
pub fn segment_index_of(path: &str, sub_path: &str) -> Option<usize> {
    if !is_valid_sub_path(sub_path, path) {
        return None;
    }
    let segments = sub_path.split('.').count();
    // Prefix check above guarantees sub_path is the (segments - 1)th prefix.
    Some(segments - 1)
}

/// One step of a resolution chain: a sub-path and its optional
/// occurrence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathIndexPair {
    pub path: String,
    pub index: Option<usize>,
}

/// Splits `path` into incremental sub-paths and associates each with an
/// optional occurrence index keyed by chain position.
pub(crate) fn path_index_pairs(path: &str, indices: &HashMap<usize, usize>) -> Vec<PathIndexPair> {
    sub_paths(path)
        .into_iter()
        .enumerate()
        .map(|(position, sub_path)| PathIndexPair {
            path: sub_path,
            index: indices.get(&position).copied(),
        })
        .collect()
}
