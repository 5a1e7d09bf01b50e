//! Virtual dispatch table builder for a closed-world OO-to-WASM compiler.
//!
//! [`build`] is the single entry point: given a finalized class hierarchy,
//! front-end member metadata, a target type lattice, and per-selector call
//! counts, it groups members into selectors, computes each selector's
//! per-class target ranges, synthesizes a uniform call signature, and packs
//! the polymorphic selectors into one shared `funcref` table via row
//! displacement. Table emission to wasm sections is a separate step
//! ([`DispatchTable::emit_wasm`]) since it needs module-linking state that
//! isn't available until the rest of the module is being written out.

mod emitter;
mod error;
mod hierarchy;
mod metadata;
mod options;
mod packer;
mod ranges;
mod selector;
mod signature;
mod table;

pub use emitter::FunctionResolver;
pub use error::{DispatchError, DispatchResult};
pub use hierarchy::{ClassHierarchy, ClassInfo};
pub use metadata::{MemberDecl, ReferenceKind, ReferenceRecord, ReferenceTable, SelectorCallCounts};
pub use options::{BuildOptions, PackingStats};
pub use packer::RowDisplacementPacker;
pub use ranges::TargetRangeBuilder;
pub use selector::{SelectorInfo, SelectorKind, SelectorRegistry, NO_SUCH_METHOD_NAME};
pub use signature::{FunctionType, SignatureSynthesizer, EQUALITY_OPERATOR_NAME};
pub use table::DispatchTable;

use dispatch_types::TypeLattice;

/// The call-operator member name (`call` in source, the selector a closure
/// invocation dispatches through): always indexed for dynamic dispatch
/// regardless of whether the front end separately marked it as dynamically
/// called, since closures are invoked indirectly by construction.
pub const CALL_OPERATOR_NAME: &str = "call";

/// Build the dispatch table for one closed-world program.
///
/// Runs, strictly in this order: selector population via the
/// [`TargetRangeBuilder`] walk, per-selector signature synthesis, then
/// row-displacement packing. The result is an immutable [`DispatchTable`];
/// nothing about it can change after this call returns.
pub fn build(
    hierarchy: &ClassHierarchy,
    references: &ReferenceTable,
    lattice: &TypeLattice,
    selector_metadata: &SelectorCallCounts,
    options: &BuildOptions,
) -> DispatchResult<DispatchTable> {
    let mut registry = SelectorRegistry::new();
    TargetRangeBuilder::new(hierarchy, references, selector_metadata).build(&mut registry);

    let synthesizer = SignatureSynthesizer::new(references, lattice);
    for selector in registry.iter_mut() {
        synthesizer.compute(selector);
    }

    let packer = RowDisplacementPacker::new(references, options);
    let (table, stats) = packer.pack(&mut registry);

    Ok(DispatchTable::new(registry, table, stats))
}
