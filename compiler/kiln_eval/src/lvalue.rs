//! Assignable locations.
//!
//! Assignment-like nodes address their target exactly once:
//! [`LValue::resolve_target`] evaluates the addressing subexpressions
//! (`arr` and `i` in `arr[i]`) and captures the result in a [`Place`];
//! reads and writes then go through the place without re-evaluating
//! anything. Since `read`/`write` need a `Place`, using one without a prior
//! resolve cannot be expressed.

use kiln_ir::Name;
use kiln_value::errors::{
    cannot_assign_immutable, host_dispatch_failed, invalid_assignment_target, no_such_member,
    null_reference, undefined_variable,
};
use kiln_value::{EvalError, EvalResult, HostClassRef, HostRef, Type, Value, Variable};

use crate::environment::{Environment, Modifiers};
use crate::expr::{
    ClassMemberExpr, Expr, ExprKind, HostFieldExpr, IndexExpr, MapMemberExpr, StaticFieldExpr,
    VarRef,
};
use crate::indexable::Indexable;

/// A resolved location, valid for one assignment operation.
#[derive(Clone, Debug)]
pub enum Place {
    /// Frame slot or object member.
    Cell {
        cell: Variable,
        name: Name,
        ty: Type,
        modifiers: Modifiers,
    },
    /// Element of an indexable container.
    Element { container: Indexable, key: Value },
    HostField { object: HostRef, field: Name },
    StaticField { class: HostClassRef, field: Name },
}

impl Place {
    pub fn read(&self) -> EvalResult {
        match self {
            Place::Cell { cell, .. } => Ok(cell.get()),
            Place::Element { container, key } => container.get(key),
            Place::HostField { object, field } => object
                .get_field(field.as_str())
                .map_err(|e| host_dispatch_failed(format!("{}.{field}", object.class_name()), e)),
            Place::StaticField { class, field } => class
                .get_static(field.as_str())
                .map_err(|e| host_dispatch_failed(format!("{}.{field}", class.name()), e)),
        }
    }

    /// Assign `value`, returning what was stored.
    pub fn write(&self, value: Value) -> EvalResult {
        if let Place::Cell {
            name, modifiers, ..
        } = self
        {
            if modifiers.contains(Modifiers::FINAL) {
                return Err(cannot_assign_immutable(name));
            }
        }
        self.store(value)
    }

    /// Initialising write; allowed on `FINAL` cells.
    pub fn initialize(&self, value: Value) -> EvalResult {
        self.store(value)
    }

    fn store(&self, value: Value) -> EvalResult {
        match self {
            Place::Cell { cell, name, ty, .. } => {
                let value = ty
                    .cast(value)
                    .map_err(|e| e.with_note(format!("assignment to `{name}`")))?;
                cell.set(value.clone());
                Ok(value)
            }
            Place::Element { container, key } => container.set(key, value),
            Place::HostField { object, field } => {
                object
                    .set_field(field.as_str(), value.clone())
                    .map_err(|e| {
                        host_dispatch_failed(format!("{}.{field}", object.class_name()), e)
                    })?;
                Ok(value)
            }
            Place::StaticField { class, field } => {
                class
                    .set_static(field.as_str(), value.clone())
                    .map_err(|e| host_dispatch_failed(format!("{}.{field}", class.name()), e))?;
                Ok(value)
            }
        }
    }
}

/// Capability of nodes that can be assigned to.
pub trait LValue: Send + Sync {
    /// Evaluate the addressing subexpressions, once.
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError>;

    fn read(&self, place: &Place) -> EvalResult {
        place.read()
    }

    fn write(&self, place: &Place, value: Value) -> EvalResult {
        place.write(value)
    }

    fn initialize(&self, place: &Place, value: Value) -> EvalResult {
        place.initialize(value)
    }
}

/// The l-value view of an assignment target.
///
/// A `Name` left unresolved by the resolution pass is reported as an
/// undefined variable; any other non-l-value is rejected.
pub(crate) fn target_of(target: &Expr) -> Result<&dyn LValue, EvalError> {
    match target.as_lvalue() {
        Some(lvalue) => Ok(lvalue),
        None => match target.kind() {
            ExprKind::Name(name) => Err(undefined_variable(name)),
            _ => Err(invalid_assignment_target()),
        },
    }
}

impl LValue for VarRef {
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError> {
        let cell = env.lookup(self.depth, self.address).ok_or_else(|| {
            undefined_variable(self.name).with_note(format!(
                "no slot {} at depth {}",
                self.address, self.depth
            ))
        })?;
        Ok(Place::Cell {
            cell: cell.clone(),
            name: self.name,
            ty: self.ty.clone(),
            modifiers: self.modifiers,
        })
    }
}

impl LValue for IndexExpr {
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError> {
        let base = self.base.evaluate(env)?;
        let key = self.index.evaluate(env)?;
        Ok(Place::Element {
            container: Indexable::of(base)?,
            key,
        })
    }
}

impl LValue for HostFieldExpr {
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError> {
        match self.object.evaluate(env)? {
            Value::Host(object) => Ok(Place::HostField {
                object,
                field: self.field,
            }),
            Value::Null => Err(null_reference("field access")),
            other => Err(no_such_member(self.field, other.type_name())),
        }
    }
}

impl LValue for StaticFieldExpr {
    fn resolve_target(&self, _env: &Environment) -> Result<Place, EvalError> {
        Ok(Place::StaticField {
            class: self.class.clone(),
            field: self.field,
        })
    }
}

impl LValue for MapMemberExpr {
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError> {
        match self.map.evaluate(env)? {
            Value::Map(entries) => Ok(Place::Element {
                container: Indexable::Map(entries),
                key: Value::string(self.key.as_str()),
            }),
            Value::Null => Err(null_reference("member access")),
            other => Err(no_such_member(self.key, other.type_name())),
        }
    }
}

impl LValue for ClassMemberExpr {
    fn resolve_target(&self, env: &Environment) -> Result<Place, EvalError> {
        match self.object.evaluate(env)? {
            Value::Object(object) => {
                let (cell, ty) = object
                    .member(self.member)
                    .ok_or_else(|| no_such_member(self.member, object.class()))?;
                Ok(Place::Cell {
                    cell: cell.clone(),
                    name: self.member,
                    ty: ty.clone(),
                    modifiers: Modifiers::empty(),
                })
            }
            Value::Null => Err(null_reference("member access")),
            other => Err(no_such_member(self.member, other.type_name())),
        }
    }
}
