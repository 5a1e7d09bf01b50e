//! Uniform call signature synthesis (component C4).
//!
//! Computes one target-level function type per selector by taking a
//! structural least upper bound over every distinct target's signature,
//! with special-case rules for the equality operator, tear-offs, setters,
//! and defaulted parameters.

use std::collections::{BTreeMap, HashSet};

use dispatch_types::{ReferenceId, Ty, TypeLattice, ValueType};

use crate::metadata::ReferenceTable;
use crate::selector::{SelectorInfo, SelectorKind};

/// The uniform call signature synthesized for one selector.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Arity of the prepended type-reflection run.
    pub type_params: u32,
    /// Receiver, positional, then named inputs, in slot order.
    pub inputs: Vec<Ty>,
    /// Absent for setters.
    pub output: Option<Ty>,
}

/// The textual name of the equality operator, whose right-hand slot is
/// always forced non-nullable regardless of what individual targets report.
pub const EQUALITY_OPERATOR_NAME: &str = "==";

/// Computes and caches `SelectorInfo::signature`. Stateless: all state it
/// needs (the reference table, the type lattice) is passed per call.
pub struct SignatureSynthesizer<'a> {
    references: &'a ReferenceTable,
    lattice: &'a TypeLattice,
}

impl<'a> SignatureSynthesizer<'a> {
    pub fn new(references: &'a ReferenceTable, lattice: &'a TypeLattice) -> Self {
        Self {
            references,
            lattice,
        }
    }

    /// Compute `selector.signature`. Must run exactly once per selector,
    /// strictly after `target_ranges` is final — both preconditions are
    /// asserted, since a violation is a compiler bug with no recovery path.
    pub fn compute(&self, selector: &mut SelectorInfo) {
        assert!(
            selector.signature.is_none(),
            "signature computed more than once for selector {}",
            selector.id
        );

        let distinct: Vec<ReferenceId> = {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for &(_, reference) in &selector.target_ranges {
                if seen.insert(reference) {
                    out.push(reference);
                }
            }
            out
        };
        let targets: Vec<_> = distinct.iter().map(|&r| self.references.get(r)).collect();

        let mut inputs = Vec::new();

        // Prepended type-reflection run.
        for _ in 0..selector.param_info.type_param_count {
            inputs.push(Ty::non_nullable(ValueType::TypeParam));
        }

        // Slot 0: receiver.
        let receiver_values: Vec<Ty> = targets.iter().map(|t| t.receiver_type.clone()).collect();
        inputs.push(self.join_slot(&receiver_values, false));

        // Positional and named slots, keyed by absolute slot index so the
        // two interleave exactly as the merged `ParameterInfo` dictates.
        let mut param_slots: BTreeMap<u32, Ty> = BTreeMap::new();

        for p in 0..selector.param_info.positional_count {
            let values: Vec<Ty> = targets
                .iter()
                .filter_map(|t| t.param_types.get(p as usize).cloned())
                .collect();
            let ensure_boxed = selector.param_info.slot_needs_sentinel(p as usize);
            let mut joined = self.join_slot(&values, ensure_boxed);
            if selector.name == EQUALITY_OPERATOR_NAME && p == 0 {
                joined.nullable = false;
            }
            param_slots.insert(p, joined);
        }

        for (name, &idx) in &selector.param_info.named {
            let values: Vec<Ty> = targets
                .iter()
                .filter_map(|t| {
                    t.param_info
                        .named
                        .get(name)
                        .and_then(|&local| t.param_types.get(local as usize).cloned())
                })
                .collect();
            let ensure_boxed = selector.param_info.slot_needs_sentinel(idx as usize);
            param_slots.insert(idx, self.join_slot(&values, ensure_boxed));
        }

        inputs.extend(param_slots.into_values());

        // Return slot: absent for setters.
        let output = if selector.kind == SelectorKind::Setter {
            None
        } else {
            let return_values: Vec<Ty> = targets
                .iter()
                .map(|t| {
                    t.return_type
                        .clone()
                        .unwrap_or_else(|| self.lattice.top_nullable())
                })
                .collect();
            Some(self.join_slot(&return_values, false))
        };

        selector.signature = Some(FunctionType {
            type_params: selector.param_info.type_param_count,
            inputs,
            output,
        });
    }

    /// Per-slot upper bound over a set of target value types (`spec.md`
    /// §4.3's algorithm, without the name).
    fn join_slot(&self, values: &[Ty], ensure_boxed: bool) -> Ty {
        if values.is_empty() {
            return self.lattice.top_nullable();
        }
        if values.len() == 1 && self.lattice.is_unboxed_primitive(&values[0]) && !ensure_boxed {
            return values[0].clone();
        }

        let nullable = values.iter().any(|v| v.nullable);
        let boxed: Vec<ValueType> = values
            .iter()
            .map(|v| match &v.value {
                ValueType::Primitive(p) => self.lattice.boxed_struct_for(*p).value,
                other => other.clone(),
            })
            .collect();

        Ty::new(self.join_struct_values(boxed), nullable)
    }

    /// Common supertype of a set of boxed struct heap types: replace
    /// already done by the caller; here we repeatedly walk the deeper
    /// types up their super-chain until all have equal depth, then walk
    /// all in lockstep until only one remains.
    fn join_struct_values(&self, mut values: Vec<ValueType>) -> ValueType {
        if values.iter().any(|v| !matches!(v, ValueType::Struct(_))) {
            return ValueType::Top;
        }
        let mut ids: Vec<_> = values
            .drain(..)
            .map(|v| match v {
                ValueType::Struct(id) => id,
                _ => unreachable!(),
            })
            .collect();
        ids.dedup();

        loop {
            if ids.len() == 1 {
                return ValueType::Struct(ids[0]);
            }
            let depths: Vec<u32> = ids.iter().map(|&id| self.lattice.struct_depth(id)).collect();
            let max_depth = *depths.iter().max().unwrap();

            let mut next = Vec::with_capacity(ids.len());
            let mut reached_top = false;
            for (&id, &depth) in ids.iter().zip(depths.iter()) {
                if depth == max_depth {
                    match self.lattice.super_type_of(id) {
                        Some(parent) => next.push(parent),
                        None => reached_top = true,
                    }
                } else {
                    next.push(id);
                }
            }
            if reached_top {
                return ValueType::Top;
            }
            next.dedup();
            // Ensure progress: if nothing changed (all ids were already at
            // equal depth and distinct with no common root above), bail to
            // Top rather than loop forever on malformed lattice input.
            if next == ids {
                return ValueType::Top;
            }
            ids = next;
        }
    }
}
