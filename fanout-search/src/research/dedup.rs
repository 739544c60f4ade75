//! Cross-section result deduplication.
//!
//! A page returned by several sub-queries is kept only in the earliest
//! section (plan order) that returned it. Sections emptied by this pass
//! stay in the report so the caller can see the sub-query ran.

use std::collections::HashSet;

use crate::url_normalize::dedup_key;

use super::{ResearchSection, SectionOutcome};

/// Remove items whose URL already appeared in an earlier position.
///
/// Returns the number of items removed.
pub(crate) fn dedup_sections(sections: &mut [ResearchSection]) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut removed = 0;

    for section in sections.iter_mut() {
        let SectionOutcome::Found(ref mut set) = section.outcome else {
            continue;
        };
        let before = set.len();
        set.retain_items(|item| seen.insert(dedup_key(&item.url)));
        removed += before - set.len();
    }

    removed
}
