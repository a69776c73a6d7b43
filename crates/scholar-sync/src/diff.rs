//! Append-only mark diff.
//!
//! Marks in one period differ only by subject, so identity is the subject
//! name. Marks already stored are never overwritten, even when Engage
//! reports a different percentage or teacher for them.

use scholar_core::Mark;
use std::collections::HashSet;

/// Upstream marks whose subject has no local mark, in upstream order.
///
/// A subject listed twice upstream yields only its first mark.
pub fn new_marks<'a>(local: &[Mark], upstream: &'a [Mark]) -> Vec<&'a Mark> {
    let mut known: HashSet<&str> = local.iter().map(|m| m.subject.name.as_str()).collect();
    upstream
        .iter()
        .filter(|m| known.insert(m.subject.name.as_str()))
        .collect()
}
