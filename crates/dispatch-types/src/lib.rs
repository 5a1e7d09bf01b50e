//! Shared types for the virtual dispatch table builder.
//!
//! This crate defines the id newtypes, the class-id range type, the merged
//! parameter schema, the target type lattice, and the error type shared
//! across the `dispatch-table` crate's components.

mod ids;
mod param;
mod range;
mod value_type;

pub use ids::{ClassId, ReferenceId, SelectorId};
pub use param::ParameterInfo;
pub use range::Range;
pub use value_type::{PrimitiveType, StructTypeId, Ty, TypeLattice, ValueType};
