//! The immutable build result: a packed dispatch table plus the selector
//! metadata accumulated while building it.

use std::collections::HashSet;

use dispatch_types::{ReferenceId, SelectorId};

use crate::emitter::{FunctionResolver, TableEmitter};
use crate::error::DispatchResult;
use crate::options::PackingStats;
use crate::selector::{SelectorInfo, SelectorRegistry};

/// Snapshot returned by [`crate::build`]. Read-only: every field that was
/// mutable during construction (`SelectorInfo::target_ranges`, `signature`,
/// `offset`, ...) is only ever reached here through `&self` accessors.
#[derive(Debug)]
pub struct DispatchTable {
    registry: SelectorRegistry,
    table: Vec<Option<ReferenceId>>,
    stats: PackingStats,
}

impl DispatchTable {
    pub(crate) fn new(registry: SelectorRegistry, table: Vec<Option<ReferenceId>>, stats: PackingStats) -> Self {
        Self {
            registry,
            table,
            stats,
        }
    }

    pub fn selector(&self, id: SelectorId) -> &SelectorInfo {
        self.registry.get(id)
    }

    pub fn selectors(&self) -> impl Iterator<Item = &SelectorInfo> {
        self.registry.iter()
    }

    pub fn dynamic_getter_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.registry.dynamic_getter_selectors(name)
    }

    pub fn dynamic_setter_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.registry.dynamic_setter_selectors(name)
    }

    pub fn dynamic_method_selectors(&self, name: &str) -> HashSet<SelectorId> {
        self.registry.dynamic_method_selectors(name)
    }

    /// The packed table, indexed by `offset + class_id`. `None` entries are
    /// holes the row-displacement packer left unused.
    pub fn table(&self) -> &[Option<ReferenceId>] {
        &self.table
    }

    pub fn stats(&self) -> PackingStats {
        self.stats
    }

    /// Lower the packed table to wasm `TableSection`/`ElementSection`s,
    /// resolving each live entry through `resolver`. Kept separate from
    /// `build()` because function-index resolution needs per-module linker
    /// state that isn't available until module emission time.
    pub fn emit_wasm<R: FunctionResolver>(
        &self,
        resolver: &R,
    ) -> DispatchResult<(wasm_encoder::TableSection, wasm_encoder::ElementSection)> {
        TableEmitter::new(resolver).emit(&self.table)
    }
}
