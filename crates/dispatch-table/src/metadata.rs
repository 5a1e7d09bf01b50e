//! Front-end metadata: the per-member facts the core reads through opaque
//! predicates rather than inspecting member bodies, plus the tagged
//! `Field`/`Procedure` variant a class declares its members as.

use dispatch_types::{ClassId, ParameterInfo, ReferenceId, SelectorId, Ty};

/// One member a class declares, distinguishing fields (which contribute a
/// getter and an optional setter) from procedures (which contribute
/// themselves and an optional tear-off).
#[derive(Debug, Clone)]
pub enum MemberDecl {
    Field {
        getter: ReferenceId,
        setter: Option<ReferenceId>,
    },
    Procedure {
        reference: ReferenceId,
        tear_off: Option<ReferenceId>,
    },
}

impl MemberDecl {
    /// All references this member contributes, in a stable order.
    pub fn references(&self) -> Vec<ReferenceId> {
        match self {
            MemberDecl::Field { getter, setter } => {
                let mut v = vec![*getter];
                v.extend(*setter);
                v
            }
            MemberDecl::Procedure {
                reference,
                tear_off,
            } => {
                let mut v = vec![*reference];
                v.extend(*tear_off);
                v
            }
        }
    }
}

/// What a single reference is, as read from its `ReferenceRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Getter,
    Setter,
    Method,
    TearOff,
}

/// Per-reference metadata supplied by the front end. The core only ever
/// reads these fields through the predicates named in `spec.md` §3
/// (`isGetter`, `isSetter`, `isTearOff`, `isAbstract`, `enclosingClassId`,
/// `memberName`, `parameterShape`) plus the dynamic-call and pragma facts
/// from `procedureAttributesMetadata`/`pragmaLookup`.
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub kind: ReferenceKind,
    pub enclosing_class: ClassId,
    /// Cached from the class hierarchy: true iff `enclosing_class` is the
    /// special low-level base class, which dynamic dispatch never indexes.
    pub enclosing_class_is_low_level_base: bool,
    pub member_name: String,
    pub is_abstract: bool,
    pub getter_selector_id: SelectorId,
    pub method_or_setter_selector_id: SelectorId,
    pub getter_called_dynamically: bool,
    pub method_or_setter_called_dynamically: bool,
    pub has_tear_off_uses: bool,
    pub has_non_this_uses: bool,
    pub static_dispatch_pragma: bool,
    pub param_info: ParameterInfo,
    /// Parameter types in positional-then-named slot order (receiver
    /// excluded), as already translated by the type lattice.
    pub param_types: Vec<Ty>,
    /// Return type, absent for setters.
    pub return_type: Option<Ty>,
    /// This target's own (non-nullable) instance type, used as the
    /// receiver slot's contribution to the joined signature.
    pub receiver_type: Ty,
}

impl ReferenceRecord {
    pub fn is_getter(&self) -> bool {
        self.kind == ReferenceKind::Getter
    }

    pub fn is_setter(&self) -> bool {
        self.kind == ReferenceKind::Setter
    }

    pub fn is_tear_off(&self) -> bool {
        self.kind == ReferenceKind::TearOff
    }
}

/// The front-end metadata side table, keyed by [`ReferenceId`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: Vec<ReferenceRecord>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reference record, returning its assigned id. Callers must
    /// register references in `ReferenceId` order (0, 1, 2, ...).
    pub fn push(&mut self, record: ReferenceRecord) -> ReferenceId {
        let id = ReferenceId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    pub fn get(&self, id: ReferenceId) -> &ReferenceRecord {
        &self.records[id.index()]
    }
}

/// Call-count metadata per selector (`tableSelectorMetadata` in `spec.md`
/// §6), indexed by [`SelectorId`].
#[derive(Debug, Clone, Default)]
pub struct SelectorCallCounts {
    counts: Vec<u32>,
}

impl SelectorCallCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: SelectorId, count: u32) {
        if self.counts.len() <= id.index() {
            self.counts.resize(id.index() + 1, 0);
        }
        self.counts[id.index()] = count;
    }

    /// Zero ("statically unreachable") for any selector id never set.
    pub fn get(&self, id: SelectorId) -> u32 {
        self.counts.get(id.index()).copied().unwrap_or(0)
    }
}
