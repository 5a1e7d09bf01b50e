//! The target-side value type lattice (component C1, an external
//! collaborator per `spec.md` §2). The dispatch-table builder never
//! constructs source types itself — it only ever widens [`Ty`] values it
//! receives from the front end — so this module models just enough of the
//! lattice for the uniform-signature join in `dispatch-table`'s
//! `SignatureSynthesizer`: unboxed primitives, boxed struct heap types with
//! a nominal depth/supertype chain, and the top-nullable placeholder.

use std::collections::HashMap;

/// An unboxed primitive value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    I32,
    I64,
    F64,
    Bool,
}

/// Id of a nominal boxed struct heap type in the target type lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructTypeId(pub u32);

/// A target-level value type: a [`ValueType`] plus its own nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ty {
    pub value: ValueType,
    pub nullable: bool,
}

impl Ty {
    pub fn new(value: ValueType, nullable: bool) -> Self {
        Self { value, nullable }
    }

    pub fn non_nullable(value: ValueType) -> Self {
        Self::new(value, false)
    }

    pub fn with_nullable(&self, nullable: bool) -> Self {
        Self::new(self.value.clone(), nullable)
    }

    /// Equality ignoring nullability — used when deciding whether a set of
    /// target types is a single distinct `ValueType` (`spec.md` §4.3).
    pub fn same_value(&self, other: &Ty) -> bool {
        self.value == other.value
    }
}

/// The shape of a value in the target type lattice, independent of
/// nullability (tracked separately on [`Ty`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// An unboxed primitive (e.g. i32, f64).
    Primitive(PrimitiveType),
    /// A nominal boxed struct heap type (instance type, boxed primitive, ...).
    Struct(StructTypeId),
    /// A type-reflection slot, used for the prepended type-parameter run.
    TypeParam,
    /// Top of the lattice. Used as a placeholder for unreachable slots and
    /// as the fallback return type for no-output selectors with missing
    /// returns in sibling targets.
    Top,
}

/// The nominal struct hierarchy: per-struct depth and immediate supertype.
#[derive(Debug, Clone)]
struct StructRecord {
    depth: u32,
    super_id: Option<StructTypeId>,
}

/// The external type-lattice collaborator (C1).
///
/// Holds just the facts the core needs: each primitive's boxed struct
/// representation, and each struct's depth/supertype in the nominal
/// hierarchy (both needed by the structural least-upper-bound walk in
/// `dispatch-table`'s `SignatureSynthesizer`).
#[derive(Debug, Clone, Default)]
pub struct TypeLattice {
    structs: Vec<StructRecord>,
    boxed_for: HashMap<PrimitiveType, StructTypeId>,
}

impl TypeLattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct type at `depth` with an optional supertype. Callers
    /// must register supertypes before their subtypes so depths are
    /// consistent; the root of any chain has `super_id = None`, `depth = 0`.
    pub fn define_struct(&mut self, depth: u32, super_id: Option<StructTypeId>) -> StructTypeId {
        let id = StructTypeId(self.structs.len() as u32);
        self.structs.push(StructRecord { depth, super_id });
        id
    }

    pub fn register_boxed(&mut self, primitive: PrimitiveType, struct_id: StructTypeId) {
        self.boxed_for.insert(primitive, struct_id);
    }

    pub fn top_nullable(&self) -> Ty {
        Ty::new(ValueType::Top, true)
    }

    pub fn boxed_struct_for(&self, primitive: PrimitiveType) -> Ty {
        match self.boxed_for.get(&primitive) {
            Some(&id) => Ty::non_nullable(ValueType::Struct(id)),
            None => self.top_nullable(),
        }
    }

    pub fn struct_depth(&self, id: StructTypeId) -> u32 {
        self.structs[id.index()].depth
    }

    pub fn super_type_of(&self, id: StructTypeId) -> Option<StructTypeId> {
        self.structs[id.index()].super_id
    }

    pub fn is_unboxed_primitive(&self, ty: &Ty) -> bool {
        matches!(ty.value, ValueType::Primitive(_))
    }
}

impl StructTypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}
