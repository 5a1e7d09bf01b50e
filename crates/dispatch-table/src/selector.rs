//! Selector grouping and interning (component C3).
//!
//! A selector is the equivalence class of every dispatchable member that
//! shares a front-end-assigned selector id. `SelectorRegistry` interns
//! `SelectorInfo` by that id, merging parameter metadata and usage flags
//! across every target that creates or re-creates the same selector, and
//! indexes selectors by member name for dynamic dispatch lowering.

use std::collections::{HashMap, HashSet};

use dispatch_types::{ParameterInfo, Range, ReferenceId, SelectorId};

use crate::error::{DispatchError, DispatchResult};
use crate::metadata::{ReferenceKind, ReferenceTable, SelectorCallCounts};
use crate::signature::FunctionType;

/// The canonical member name a runtime looks for when an otherwise
/// unresolvable dynamic call or member access reaches a class: the
/// selector is never missing from the table so dynamic-call lowering can
/// always synthesize a fallback dispatch.
pub const NO_SUCH_METHOD_NAME: &str = "noSuchMethod";

/// `SelectorInfo.kind`, derived from the first member that created the
/// selector. All later merges into the same id must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Getter,
    Setter,
    Method,
}

/// The central per-selector record.
///
/// `target_ranges`, `static_dispatch_ranges`, `concrete_classes`,
/// `signature`, and `offset` start empty/`None` and are filled in by later
/// build phases (`TargetRangeBuilder`, `SignatureSynthesizer`,
/// `RowDisplacementPacker`) — never observed by a reader before `build()`
/// returns.
#[derive(Debug, Clone)]
pub struct SelectorInfo {
    pub id: SelectorId,
    pub name: String,
    pub kind: SelectorKind,
    pub call_count: u32,
    pub param_info: ParameterInfo,
    pub has_tear_off_uses: bool,
    pub has_non_this_uses: bool,
    pub is_no_such_method: bool,
    pub target_ranges: Vec<(Range, ReferenceId)>,
    pub static_dispatch_ranges: Vec<(Range, ReferenceId)>,
    pub concrete_classes: u32,
    pub signature: Option<FunctionType>,
    pub offset: Option<u32>,
}

impl SelectorInfo {
    fn new(id: SelectorId, name: String, kind: SelectorKind, call_count: u32) -> Self {
        let is_no_such_method = kind == SelectorKind::Method && name == NO_SUCH_METHOD_NAME;
        Self {
            id,
            name,
            kind,
            call_count,
            param_info: ParameterInfo::default(),
            has_tear_off_uses: false,
            has_non_this_uses: false,
            is_no_such_method,
            target_ranges: Vec::new(),
            static_dispatch_ranges: Vec::new(),
            concrete_classes: 0,
            signature: None,
            offset: None,
        }
    }

    /// A selector "entirely statically dispatched" has every range covered
    /// by a static-dispatch-pragma'd target.
    pub fn entirely_statically_dispatched(&self) -> bool {
        self.static_dispatch_ranges.len() == self.target_ranges.len()
    }
}

/// Interns [`SelectorInfo`] by selector id and indexes dynamically-callable
/// members by name.
#[derive(Debug, Default)]
pub struct SelectorRegistry {
    selectors: HashMap<SelectorId, SelectorInfo>,
    dynamic_getters: HashMap<String, HashSet<SelectorId>>,
    dynamic_setters: HashMap<String, HashSet<SelectorId>>,
    dynamic_methods: HashMap<String, HashSet<SelectorId>>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the selector id a reference belongs to: the getter-selector
    /// id for getters and tear-offs, otherwise the method-or-setter-selector
    /// id.
    fn selector_id_for(record: &crate::metadata::ReferenceRecord) -> SelectorId {
        if record.is_getter() || record.is_tear_off() {
            record.getter_selector_id
        } else {
            record.method_or_setter_selector_id
        }
    }

    fn kind_for(record: &crate::metadata::ReferenceRecord) -> SelectorKind {
        if record.is_getter() || record.is_tear_off() {
            SelectorKind::Getter
        } else if record.is_setter() {
            SelectorKind::Setter
        } else {
            SelectorKind::Method
        }
    }

    /// Get or create the selector for `reference`, merging its parameter
    /// shape and usage flags in.
    ///
    /// Panics (an internal assertion failure, not a `DispatchError`) if a
    /// merge disagrees with a prior target on whether the selector is a
    /// setter — per the data model's invariant, every merged target must
    /// agree.
    pub fn get_or_create(
        &mut self,
        reference: ReferenceId,
        table: &ReferenceTable,
        call_counts: &SelectorCallCounts,
    ) -> SelectorId {
        let record = table.get(reference);
        let id = Self::selector_id_for(record);
        let kind = Self::kind_for(record);

        let selector = self.selectors.entry(id).or_insert_with(|| {
            SelectorInfo::new(id, record.member_name.clone(), kind, call_counts.get(id))
        });

        assert_eq!(
            selector.kind, kind,
            "selector {id} merged a setter target with a non-setter target"
        );

        selector.param_info.merge(&record.param_info);
        selector.has_tear_off_uses |= record.has_tear_off_uses;
        selector.has_non_this_uses |= record.has_non_this_uses;

        self.index_for_dynamic_dispatch(id, kind, record);

        id
    }

    /// Lookup-only variant: fails if `get_or_create` never saw this
    /// reference.
    pub fn selector_for_target(
        &self,
        reference: ReferenceId,
        table: &ReferenceTable,
    ) -> DispatchResult<SelectorId> {
        let record = table.get(reference);
        let id = Self::selector_id_for(record);
        if self.selectors.contains_key(&id) {
            Ok(id)
        } else {
            Err(DispatchError::UnknownSelector(record.member_name.clone()))
        }
    }

    /// Indexing rule: a target is indexed under its member name iff its
    /// enclosing class is not the low-level base class and front-end
    /// metadata marks it (or its getter/method-or-setter sibling) as
    /// dynamically called, or its name is the canonical callable name.
    fn index_for_dynamic_dispatch(
        &mut self,
        id: SelectorId,
        kind: SelectorKind,
        record: &crate::metadata::ReferenceRecord,
    ) {
        if record.enclosing_class_is_low_level_base {
            return;
        }
        let is_call_operator = record.member_name == crate::CALL_OPERATOR_NAME;
        let dynamically_called = match kind {
            SelectorKind::Getter => record.getter_called_dynamically,
            SelectorKind::Setter | SelectorKind::Method => {
                record.method_or_setter_called_dynamically
            }
        };
        if !dynamically_called && !is_call_operator {
            return;
        }
        let bucket = match kind {
            SelectorKind::Getter => &mut self.dynamic_getters,
            SelectorKind::Setter => &mut self.dynamic_setters,
            SelectorKind::Method => &mut self.dynamic_methods,
        };
        bucket
            .entry(record.member_name.clone())
            .or_default()
            .insert(id);
    }

    pub fn dynamic_getter_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.dynamic_getters.get(name).cloned().unwrap_or_default()
    }

    pub fn dynamic_setter_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.dynamic_setters.get(name).cloned().unwrap_or_default()
    }

    pub fn dynamic_method_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.dynamic_methods.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, id: SelectorId) -> &SelectorInfo {
        &self.selectors[&id]
    }

    pub fn get_mut(&mut self, id: SelectorId) -> &mut SelectorInfo {
        self.selectors.get_mut(&id).expect("selector must exist")
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectorInfo> {
        self.selectors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SelectorInfo> {
        self.selectors.values_mut()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn into_map(self) -> HashMap<SelectorId, SelectorInfo> {
        self.selectors
    }
}
