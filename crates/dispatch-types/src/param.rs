//! Normalized parameter schema for a selector, merged across every target
//! that shares the selector id.

use std::collections::BTreeMap;

/// Parameter schema shared by every target of one selector.
///
/// Merging two `ParameterInfo`s widens arities and unions the named-parameter
/// map; a slot's default-sentinel flag becomes `true` if any merged target
/// requires a default-value sentinel in that slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterInfo {
    /// Positional parameter count (receiver excluded).
    pub positional_count: u32,
    /// Named parameter → its slot index, past the positional run.
    pub named: BTreeMap<String, u32>,
    /// Type-parameter arity.
    pub type_param_count: u32,
    /// Per-slot "requires a default-value sentinel" flag, indexed by slot.
    pub needs_sentinel: Vec<bool>,
}

impl ParameterInfo {
    pub fn new(positional_count: u32, type_param_count: u32) -> Self {
        Self {
            positional_count,
            named: BTreeMap::new(),
            type_param_count,
            needs_sentinel: vec![false; positional_count as usize],
        }
    }

    /// Total number of slots this parameter info describes (positional + named).
    pub fn slot_count(&self) -> usize {
        self.positional_count as usize + self.named.len()
    }

    fn ensure_len(&mut self, len: usize) {
        if self.needs_sentinel.len() < len {
            self.needs_sentinel.resize(len, false);
        }
    }

    pub fn mark_sentinel(&mut self, slot: usize) {
        self.ensure_len(slot + 1);
        self.needs_sentinel[slot] = true;
    }

    pub fn slot_needs_sentinel(&self, slot: usize) -> bool {
        self.needs_sentinel.get(slot).copied().unwrap_or(false)
    }

    /// Merge `other` into `self` in place: widen arities, union named
    /// parameters, OR the sentinel flags slot-wise.
    pub fn merge(&mut self, other: &ParameterInfo) {
        self.positional_count = self.positional_count.max(other.positional_count);
        self.type_param_count = self.type_param_count.max(other.type_param_count);

        for (name, &idx) in &other.named {
            self.named.entry(name.clone()).or_insert(idx);
        }

        let len = self
            .positional_count
            .max(self.named.values().copied().max().map(|m| m + 1).unwrap_or(0))
            as usize;
        self.ensure_len(len.max(other.needs_sentinel.len()));
        for (slot, &flag) in other.needs_sentinel.iter().enumerate() {
            if flag {
                self.mark_sentinel(slot);
            }
        }
    }
}
