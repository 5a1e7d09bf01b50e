//! Target-range computation (component C5).
//!
//! Walks the class hierarchy super-first, assigning the innermost concrete
//! override to each class-id for every selector it provides, then coalesces
//! contiguous equal-target class-ids into ranges.

use std::collections::HashMap;

use dispatch_types::{ClassId, Range, ReferenceId, SelectorId};

use crate::hierarchy::ClassHierarchy;
use crate::metadata::{ReferenceTable, SelectorCallCounts};
use crate::selector::SelectorRegistry;

/// Runs the class-hierarchy walk and fills every selector's `target_ranges`
/// and `concrete_classes` in the given registry.
pub struct TargetRangeBuilder<'a> {
    hierarchy: &'a ClassHierarchy,
    references: &'a ReferenceTable,
    call_counts: &'a SelectorCallCounts,
}

impl<'a> TargetRangeBuilder<'a> {
    pub fn new(
        hierarchy: &'a ClassHierarchy,
        references: &'a ReferenceTable,
        call_counts: &'a SelectorCallCounts,
    ) -> Self {
        Self {
            hierarchy,
            references,
            call_counts,
        }
    }

    /// Run the walk, registering every reachable target's selector in
    /// `registry` and filling in `target_ranges`/`concrete_classes`.
    /// Note on the synthetic `#Top` class `spec.md` §4.2 mentions: it has no
    /// special case here. It's just another `ClassInfo` the front end hands
    /// in with `super_id` pointing at `Object`; "inherits Object's member
    /// set" falls out of the ordinary super-first walk below.
    pub fn build(&self, registry: &mut SelectorRegistry) {
        let mut per_class: HashMap<ClassId, HashMap<SelectorId, ReferenceId>> = HashMap::new();
        // (selector, class_id, reference) triples for concrete classes, in
        // hierarchy-walk order; sorted and coalesced per selector below.
        let mut raw: HashMap<SelectorId, Vec<(u32, ReferenceId)>> = HashMap::new();

        for class in self.hierarchy.iter_super_first() {
            // The root and the low-level base class always start from an
            // empty map; every other class starts from its direct
            // superclass's finalized map.
            let mut selectors_for_c: HashMap<SelectorId, ReferenceId> = if class.is_low_level_base
            {
                HashMap::new()
            } else {
                class
                    .super_id
                    .and_then(|super_id| per_class.get(&super_id))
                    .cloned()
                    .unwrap_or_default()
            };

            for member in &class.members {
                for reference in member.references() {
                    let selector_id =
                        registry.get_or_create(reference, self.references, self.call_counts);
                    let record = self.references.get(reference);
                    if record.is_abstract {
                        selectors_for_c.entry(selector_id).or_insert(reference);
                    } else {
                        selectors_for_c.insert(selector_id, reference);
                    }
                }
            }

            if !class.is_abstract {
                for (&selector_id, &reference) in &selectors_for_c {
                    if !self.references.get(reference).is_abstract {
                        raw.entry(selector_id)
                            .or_default()
                            .push((class.class_id.0, reference));
                    }
                }
            }

            per_class.insert(class.class_id, selectors_for_c);
        }

        for (selector_id, mut entries) in raw {
            entries.sort_by_key(|&(class_id, _)| class_id);
            let ranges = coalesce(entries);
            let selector = registry.get_mut(selector_id);
            selector.concrete_classes = ranges.iter().map(|(r, _)| r.len()).sum();
            selector.target_ranges = ranges;
        }
    }
}

/// Merge adjacent `(class_id, reference)` pairs that share the same
/// reference into maximal ranges.
fn coalesce(entries: Vec<(u32, ReferenceId)>) -> Vec<(Range, ReferenceId)> {
    let mut ranges: Vec<(Range, ReferenceId)> = Vec::new();
    for (class_id, reference) in entries {
        if let Some((last_range, last_ref)) = ranges.last_mut() {
            if *last_ref == reference && last_range.end + 1 == class_id {
                *last_range = Range::new(last_range.start, class_id);
                continue;
            }
        }
        ranges.push((Range::single(class_id), reference));
    }
    ranges
}
