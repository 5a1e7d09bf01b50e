//! Row-displacement packing (component C6).
//!
//! Selects which selectors need a physical table presence, orders them by
//! a size heuristic, then first-fits each selector's target ranges into a
//! single shared table using a moving cursor.

use dispatch_types::{Range, ReferenceId};

use crate::metadata::ReferenceTable;
use crate::options::{BuildOptions, PackingStats};
use crate::selector::{SelectorInfo, SelectorRegistry};

/// Packs selected selectors' target ranges into one shared `funcref` table.
pub struct RowDisplacementPacker<'a> {
    references: &'a ReferenceTable,
    options: &'a BuildOptions,
}

impl<'a> RowDisplacementPacker<'a> {
    pub fn new(references: &'a ReferenceTable, options: &'a BuildOptions) -> Self {
        Self {
            references,
            options,
        }
    }

    /// Compute `static_dispatch_ranges` for every selector, select which
    /// selectors need a table row, order them, and first-fit pack them.
    /// Selectors that aren't selected keep an empty `target_ranges`-shaped
    /// table row: callers reach them through a direct call, never the
    /// table, so `offset` stays `None`.
    pub fn pack(&self, registry: &mut SelectorRegistry) -> (Vec<Option<ReferenceId>>, PackingStats) {
        let ids: Vec<_> = registry.iter().map(|s| s.id).collect();
        for id in &ids {
            self.compute_static_dispatch_ranges(registry.get_mut(*id));
        }

        let mut selected: Vec<_> = registry
            .iter()
            .filter(|s| self.should_pack(s))
            .map(|s| s.id)
            .collect();

        // Descending by `concreteClasses * 10 + callCount`: the literal `* 10`
        // weight is preserved verbatim rather than re-derived, matching a
        // deliberately-undocumented constant in the original ordering rule.
        // Ties (common for equal-fanout, equal-call-count selectors) break on
        // `id` ascending rather than `HashMap` iteration order, which is
        // re-randomized per `SelectorRegistry`/`HashMap` construction and
        // would otherwise make packing order (and therefore offsets) vary
        // between equal-input `build()` calls.
        selected.sort_by_key(|&id| {
            let s = registry.get(id);
            (std::cmp::Reverse(s.concrete_classes as u64 * 10 + s.call_count as u64), id.0)
        });

        let mut table: Vec<Option<ReferenceId>> = Vec::new();
        let mut first_available: u32 = 0;
        let mut considered: u32 = 0;

        for id in &selected {
            considered += 1;
            let offset = {
                let selector = registry.get(*id);
                self.find_offset(selector, &table, first_available)
            };
            self.place(&registry.get(*id).target_ranges, offset, &mut table);
            registry.get_mut(*id).offset = Some(offset);
            first_available = self.advance_cursor(&table, first_available);
        }

        let holes = table.iter().filter(|s| s.is_none()).count() as u32;
        let stats = PackingStats {
            selectors_considered: considered,
            table_length: table.len() as u32,
            holes,
        };
        (table, stats)
    }

    fn compute_static_dispatch_ranges(&self, selector: &mut SelectorInfo) {
        if self.options.whole_program_polymorphic_specialization || selector.target_ranges.len() <= 1
        {
            selector.static_dispatch_ranges = selector.target_ranges.clone();
            return;
        }
        selector.static_dispatch_ranges = selector
            .target_ranges
            .iter()
            .filter(|(_, reference)| self.references.get(*reference).static_dispatch_pragma)
            .cloned()
            .collect();
    }

    /// A selector occupies a table row iff it's the universal
    /// `noSuchMethod` fallback (packed even with zero observed calls, since
    /// a dynamically-dispatched call reaching an unhandled class must
    /// always find a slot), or it's genuinely polymorphic at a call site
    /// that isn't fully resolved to static dispatch.
    fn should_pack(&self, selector: &SelectorInfo) -> bool {
        selector.is_no_such_method
            || (selector.call_count > 0
                && selector.target_ranges.len() > 1
                && !selector.entirely_statically_dispatched())
    }

    fn fits(&self, selector: &SelectorInfo, offset: u32, table: &[Option<ReferenceId>]) -> bool {
        selector.target_ranges.iter().all(|(range, _)| {
            range
                .class_ids()
                .all(|cid| table.get((offset + cid.0) as usize).map_or(true, |slot| slot.is_none()))
        })
    }

    fn find_offset(&self, selector: &SelectorInfo, table: &[Option<ReferenceId>], start: u32) -> u32 {
        let mut offset = start;
        while !self.fits(selector, offset, table) {
            offset += 1;
        }
        offset
    }

    fn place(&self, ranges: &[(Range, ReferenceId)], offset: u32, table: &mut Vec<Option<ReferenceId>>) {
        for (range, reference) in ranges {
            for cid in range.class_ids() {
                let idx = (offset + cid.0) as usize;
                if idx >= table.len() {
                    table.resize(idx + 1, None);
                }
                table[idx] = Some(*reference);
            }
        }
    }

    /// Skip past the table's leading occupied run so the next selector
    /// doesn't rescan cells that are already known to be taken.
    fn advance_cursor(&self, table: &[Option<ReferenceId>], from: u32) -> u32 {
        let mut i = from as usize;
        while i < table.len() && table[i].is_some() {
            i += 1;
        }
        i as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ReferenceKind, ReferenceRecord};
    use crate::selector::{SelectorInfo, SelectorKind};
    use dispatch_types::{ClassId, ParameterInfo, SelectorId, Ty, ValueType};

    fn ty() -> Ty {
        Ty::non_nullable(ValueType::Top)
    }

    fn dummy_reference(refs: &mut ReferenceTable, pragma: bool) -> ReferenceId {
        refs.push(ReferenceRecord {
            kind: ReferenceKind::Method,
            enclosing_class: ClassId(0),
            enclosing_class_is_low_level_base: false,
            member_name: "foo".into(),
            is_abstract: false,
            getter_selector_id: SelectorId(999),
            method_or_setter_selector_id: SelectorId(0),
            getter_called_dynamically: false,
            method_or_setter_called_dynamically: false,
            has_tear_off_uses: false,
            has_non_this_uses: false,
            static_dispatch_pragma: pragma,
            param_info: ParameterInfo::new(0, 0),
            param_types: vec![],
            return_type: Some(ty()),
            receiver_type: ty(),
        })
    }

    fn selector(id: u32, target_ranges: Vec<(Range, ReferenceId)>, call_count: u32) -> SelectorInfo {
        let concrete_classes = target_ranges.iter().map(|(r, _)| r.len()).sum();
        SelectorInfo {
            id: SelectorId(id),
            name: "foo".into(),
            kind: SelectorKind::Method,
            call_count,
            param_info: ParameterInfo::new(0, 0),
            has_tear_off_uses: false,
            has_non_this_uses: false,
            is_no_such_method: false,
            target_ranges,
            static_dispatch_ranges: Vec::new(),
            concrete_classes,
            signature: None,
            offset: None,
        }
    }

    #[test]
    fn monomorphic_selector_is_not_packed() {
        let mut refs = ReferenceTable::new();
        let r = dummy_reference(&mut refs, false);
        let mut sel = selector(0, vec![(Range::new(0, 2), r)], 5);
        sel.static_dispatch_ranges = sel.target_ranges.clone();
        let options = BuildOptions::default();
        let packer = RowDisplacementPacker::new(&refs, &options);
        assert!(!packer.should_pack(&sel));
    }

    #[test]
    fn no_such_method_is_always_packed() {
        let refs = ReferenceTable::new();
        let options = BuildOptions::default();
        let packer = RowDisplacementPacker::new(&refs, &options);
        let mut sel = selector(0, vec![], 0);
        sel.is_no_such_method = true;
        assert!(packer.should_pack(&sel));
    }

    #[test]
    fn first_fit_avoids_occupying_slots() {
        let mut refs = ReferenceTable::new();
        let ra = dummy_reference(&mut refs, false);
        let rb = dummy_reference(&mut refs, false);
        let options = BuildOptions::default();
        let packer = RowDisplacementPacker::new(&refs, &options);

        let mut table = Vec::new();
        packer.place(&[(Range::new(0, 2), ra)], 0, &mut table);
        assert_eq!(table, vec![Some(ra), Some(ra), Some(ra)]);

        let sel = selector(1, vec![(Range::new(0, 2), rb)], 1);
        let offset = packer.find_offset(&sel, &table, 0);
        assert_eq!(offset, 3);
    }
}
