//! `InterpreterBuilder` for creating `Interpreter` instances.

use kiln_ir::Name;
use kiln_value::{EvalError, FunctionRef, Type, Value};

use super::{EvalOptions, Interpreter};
use crate::environment::{Environment, FrameLayout, Slot};

/// Builder for an [`Interpreter`] and its global frame.
///
/// Globals live in one frame in declaration order; declaring a name twice
/// keeps the later declaration.
#[derive(Debug, Default)]
pub struct InterpreterBuilder {
    options: EvalOptions,
    globals: Vec<(Slot, Value)>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn optimization_level(mut self, level: u8) -> Self {
        self.options.optimization_level = level;
        self
    }

    #[must_use]
    pub fn max_link_level(mut self, level: u32) -> Self {
        self.options.max_link_level = level;
        self
    }

    /// Declare a mutable global.
    #[must_use]
    pub fn global(mut self, name: impl Into<Name>, ty: Type, value: Value) -> Self {
        self.globals.push((Slot::new(name, ty), value));
        self
    }

    /// Declare a global that assignments cannot change.
    #[must_use]
    pub fn constant(mut self, name: impl Into<Name>, ty: Type, value: Value) -> Self {
        self.globals.push((Slot::constant(name, ty), value));
        self
    }

    /// Declare a constant global holding `function`, under its own name.
    #[must_use]
    pub fn function(self, function: FunctionRef) -> Self {
        let name = Name::intern(function.name());
        let ty = Type::function(function.return_type());
        self.constant(name, ty, Value::function(function))
    }

    /// Create the global frame, casting every initial value to its slot type.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let (slots, values): (Vec<Slot>, Vec<Value>) = self.globals.into_iter().unzip();
        let names: Vec<Name> = slots.iter().map(|slot| slot.name).collect();
        let layout = FrameLayout::new(slots);
        let globals = Environment::root(layout);
        for (name, value) in names.into_iter().zip(values) {
            let Some((address, slot)) = globals.layout().lookup(name) else {
                continue;
            };
            let value = slot
                .ty
                .cast(value)
                .map_err(|e| e.with_note(format!("initial value of global `{name}`")))?;
            if let Some(cell) = globals.get(address) {
                cell.set(value);
            }
        }
        tracing::debug!(globals = globals.layout().len(), "interpreter built");
        Ok(Interpreter {
            options: self.options,
            globals,
        })
    }
}
