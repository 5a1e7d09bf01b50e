//! Wasm table and element section emission (component C7).

use wasm_encoder::{ConstExpr, ElementSection, Elements, HeapType, RefType, TableSection, TableType};

use dispatch_types::ReferenceId;

use crate::error::{DispatchError, DispatchResult};

/// Abstracts module/function resolution so `TableEmitter` doesn't need a
/// real multi-module front end to be exercised in isolation.
pub trait FunctionResolver {
    /// True iff `reference`'s defining module is the one currently being
    /// emitted, so its function index is directly usable here.
    fn is_main_module(&self, reference: ReferenceId) -> bool;

    /// True iff `reference`'s defining module hasn't been loaded yet. A
    /// deferred module's targets are written as empty table slots rather
    /// than resolved eagerly.
    fn is_deferred(&self, reference: ReferenceId) -> bool;

    /// The function index for `reference`, if its defining module is
    /// already loaded (main module or an already-loaded import).
    fn existing_function(&self, reference: ReferenceId) -> Option<u32>;
}

/// Emits a packed table as a wasm `TableSection` plus an active
/// `ElementSection`, resolving each entry through a [`FunctionResolver`].
pub struct TableEmitter<'a, R: FunctionResolver> {
    resolver: &'a R,
}

impl<'a, R: FunctionResolver> TableEmitter<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    pub fn emit(&self, table: &[Option<ReferenceId>]) -> DispatchResult<(TableSection, ElementSection)> {
        let table_len = table.len() as u64;

        let mut table_section = TableSection::new();
        table_section.table(TableType {
            element_type: RefType::FUNCREF,
            minimum: table_len,
            maximum: Some(table_len),
            table64: false,
            shared: false,
        });

        let mut exprs = Vec::with_capacity(table.len());
        for slot in table {
            exprs.push(self.resolve_slot(*slot)?);
        }

        let mut element_section = ElementSection::new();
        element_section.active(
            Some(0),
            &ConstExpr::i32_const(0),
            Elements::Expressions(RefType::FUNCREF, &exprs),
        );

        Ok((table_section, element_section))
    }

    fn resolve_slot(&self, slot: Option<ReferenceId>) -> DispatchResult<ConstExpr> {
        let Some(reference) = slot else {
            return Ok(ConstExpr::ref_null(HeapType::FUNC));
        };

        if self.resolver.is_main_module(reference) {
            return match self.resolver.existing_function(reference) {
                Some(index) => Ok(ConstExpr::ref_func(index)),
                None => Err(DispatchError::UnresolvedTarget(reference.to_string())),
            };
        }

        match self.resolver.existing_function(reference) {
            Some(index) => Ok(ConstExpr::ref_func(index)),
            None if self.resolver.is_deferred(reference) => Ok(ConstExpr::ref_null(HeapType::FUNC)),
            None => Err(DispatchError::UnresolvedTarget(reference.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeResolver {
        main_module: std::collections::HashSet<u32>,
        deferred: std::collections::HashSet<u32>,
        functions: HashMap<u32, u32>,
    }

    impl FunctionResolver for FakeResolver {
        fn is_main_module(&self, reference: ReferenceId) -> bool {
            self.main_module.contains(&reference.0)
        }

        fn is_deferred(&self, reference: ReferenceId) -> bool {
            self.deferred.contains(&reference.0)
        }

        fn existing_function(&self, reference: ReferenceId) -> Option<u32> {
            self.functions.get(&reference.0).copied()
        }
    }

    #[test]
    fn main_module_targets_resolve_to_ref_func() {
        let resolver = FakeResolver {
            main_module: [0].into_iter().collect(),
            deferred: Default::default(),
            functions: HashMap::from([(0, 7)]),
        };
        let emitter = TableEmitter::new(&resolver);
        let (_table_section, _elements) = emitter.emit(&[Some(ReferenceId(0))]).unwrap();
    }

    #[test]
    fn deferred_module_target_leaves_slot_empty_instead_of_erroring() {
        let resolver = FakeResolver {
            main_module: Default::default(),
            deferred: [0].into_iter().collect(),
            functions: HashMap::new(),
        };
        let emitter = TableEmitter::new(&resolver);
        assert!(emitter.emit(&[Some(ReferenceId(0))]).is_ok());
    }

    #[test]
    fn unresolved_non_deferred_target_is_an_error() {
        let resolver = FakeResolver {
            main_module: Default::default(),
            deferred: Default::default(),
            functions: HashMap::new(),
        };
        let emitter = TableEmitter::new(&resolver);
        assert!(matches!(
            emitter.emit(&[Some(ReferenceId(0))]),
            Err(DispatchError::UnresolvedTarget(_))
        ));
    }

    #[test]
    fn hole_emits_ref_null() {
        let resolver = FakeResolver {
            main_module: Default::default(),
            deferred: Default::default(),
            functions: HashMap::new(),
        };
        let emitter = TableEmitter::new(&resolver);
        assert!(emitter.emit(&[None]).is_ok());
    }

    /// Wrap an emitted `TableSection`/`ElementSection` into a minimal
    /// complete module (one defined `() -> ()` function, referenced by the
    /// table) and check it with `wasmparser::validate`, the same way
    /// `pepl-codegen`'s own tests assert on emitted sections rather than
    /// just trusting `wasm_encoder` not to panic.
    #[test]
    fn emitted_sections_form_a_valid_module() {
        use wasm_encoder::{CodeSection, Function, FunctionSection, Instruction, Module, TypeSection};

        let resolver = FakeResolver {
            main_module: [0].into_iter().collect(),
            deferred: Default::default(),
            functions: HashMap::from([(0, 0)]),
        };
        let emitter = TableEmitter::new(&resolver);
        let (table_section, element_section) = emitter.emit(&[Some(ReferenceId(0)), None]).unwrap();

        let mut types = TypeSection::new();
        types.ty().function(vec![], vec![]);

        let mut functions = FunctionSection::new();
        functions.function(0);

        let mut code = CodeSection::new();
        let mut body = Function::new(vec![]);
        body.instruction(&Instruction::End);
        code.function(&body);

        let mut module = Module::new();
        module.section(&types);
        module.section(&functions);
        module.section(&table_section);
        module.section(&element_section);
        module.section(&code);

        let bytes = module.finish();
        assert!(wasmparser::validate(&bytes).is_ok());
    }
}
