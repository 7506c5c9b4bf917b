//! Session/persisted reconciliation
//!
//! Every list or detail read that spans both tiers goes through
//! [`merge_by_id`], so there is exactly one precedence rule: the session
//! copy of a record shadows the persisted one.

use std::collections::HashSet;

use crate::types::Identified;

/// Merge two record lists by id.
///
/// Session records come first in their own order (first occurrence wins),
/// followed by remote records whose id has not been seen yet. Merging the
/// output with either input again changes nothing.
pub fn merge_by_id<T>(session: Vec<T>, remote: Vec<T>) -> Vec<T>
where
    T: Identified,
{
    let mut seen: HashSet<String> = HashSet::with_capacity(session.len() + remote.len());
    let mut merged = Vec::with_capacity(session.len() + remote.len());

    for item in session.into_iter().chain(remote) {
        if seen.insert(item.id().to_string()) {
            merged.push(item);
        }
    }
    merged
}
