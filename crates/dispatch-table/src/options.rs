//! Build-time options and the stats artifact `build()` returns alongside
//! the finished table.

/// Options controlling packing and static-dispatch elision.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// When set, every selector's `target_ranges` counts as statically
    /// dispatchable (ranges are treated as call-site-specialized rather
    /// than requiring the shared table), regardless of per-target
    /// static-dispatch pragmas.
    pub whole_program_polymorphic_specialization: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            whole_program_polymorphic_specialization: false,
        }
    }
}

/// Packing diagnostics, returned alongside the table so callers can report
/// on table density without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackingStats {
    pub selectors_considered: u32,
    pub table_length: u32,
    pub holes: u32,
}
