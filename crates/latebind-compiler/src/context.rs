//! Analysis context: the registry plus the script's local variables.

use rustc_hash::FxHashMap;

use latebind_core::{CompilationError, DataType, Span};
use latebind_registry::TypeRegistry;

/// A declared local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub slot: u32,
    pub data_type: DataType,
    /// Where the variable was declared.
    pub span: Span,
}

/// State threaded through analysis of one script.
pub struct AnalysisContext<'r> {
    registry: &'r TypeRegistry,
    locals: FxHashMap<String, LocalVar>,
    next_slot: u32,
}

impl<'r> AnalysisContext<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            locals: FxHashMap::default(),
            next_slot: 0,
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Declare a local and allocate its slot.
    pub fn declare_local(
        &mut self,
        name: &str,
        data_type: DataType,
        span: Span,
    ) -> Result<u32, CompilationError> {
        if let Some(existing) = self.locals.get(name) {
            return Err(CompilationError::VariableRedeclaration {
                name: name.to_string(),
                original_span: existing.span,
                new_span: span,
            });
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        self.locals.insert(
            name.to_string(),
            LocalVar {
                slot,
                data_type,
                span,
            },
        );
        Ok(slot)
    }

    pub fn get_local(&self, name: &str) -> Option<&LocalVar> {
        self.locals.get(name)
    }

    /// Number of slots allocated so far.
    pub fn local_count(&self) -> u32 {
        self.next_slot
    }

    /// Resolve a declared type name.
    pub fn resolve_type(&self, name: &str, span: Span) -> Result<DataType, CompilationError> {
        match self.registry.resolve(name) {
            Some(DataType::Void) | None => Err(CompilationError::UnknownType {
                name: name.to_string(),
                span,
            }),
            Some(ty) => Ok(ty),
        }
    }
}
