//! Node constructors.

use std::sync::Arc;

use kiln_ir::Name;
use kiln_value::errors::{invalid_assignment_target, invalid_operand};
use kiln_value::{EvalError, HostClassRef, OperatorRef, Type, Value};

use super::infer::infer;
use super::{
    ClassMemberExpr, Expr, ExprKind, ExprRef, HostFieldExpr, IndexExpr, MapMemberExpr,
    StaticFieldExpr, VarRef,
};
use crate::environment::{FrameLayout, Slot};

/// Increment/decrement variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IncDecOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl IncDecOp {
    /// `+1` or `-1`.
    pub fn delta(self) -> i32 {
        match self {
            IncDecOp::PreInc | IncDecOp::PostInc => 1,
            IncDecOp::PreDec | IncDecOp::PostDec => -1,
        }
    }

    /// True if the node yields the updated value.
    pub fn is_prefix(self) -> bool {
        matches!(self, IncDecOp::PreInc | IncDecOp::PreDec)
    }
}

/// Lambda parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Type,
    /// Value used when the caller omits this argument.
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Param {
            name: name.into(),
            ty,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Everything a lambda literal carries into the closures it creates.
///
/// The body is kept as written; free variables bound outside the lambda are
/// resolved each time a closure is created.
#[derive(Clone, Debug)]
pub struct LambdaDef {
    pub name: Option<Name>,
    pub params: Vec<Param>,
    /// Name of the list collecting extra arguments.
    pub rest: Option<Name>,
    pub ret: Type,
    pub layout: Arc<FrameLayout>,
    pub body: ExprRef,
}

impl LambdaDef {
    /// The frame holds the parameters in order, then the variadic list.
    pub fn new(params: Vec<Param>, rest: Option<Name>, ret: Type, body: ExprRef) -> Self {
        let mut slots: Vec<Slot> = params
            .iter()
            .map(|param| Slot::new(param.name, param.ty.clone()))
            .collect();
        if let Some(rest) = rest {
            slots.push(Slot::new(rest, Type::list(Type::Any)));
        }
        LambdaDef {
            name: None,
            params,
            rest,
            ret,
            layout: FrameLayout::new(slots),
            body,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub(crate) fn with_body(&self, body: ExprRef) -> Self {
        LambdaDef {
            body,
            ..self.clone()
        }
    }
}

/// A frame-creating block evaluated as an expression.
#[derive(Clone, Debug)]
pub struct LetBlock {
    pub layout: Arc<FrameLayout>,
    pub body: Box<[ExprRef]>,
    /// Result type; `void` makes the block a statement.
    pub ret: Type,
}

impl LetBlock {
    pub fn new(layout: Arc<FrameLayout>, body: Vec<ExprRef>, ret: Type) -> Self {
        LetBlock {
            layout,
            body: body.into_boxed_slice(),
            ret,
        }
    }

    #[must_use]
    pub(crate) fn with_body(&self, body: Box<[ExprRef]>) -> Self {
        LetBlock {
            body,
            ..self.clone()
        }
    }
}

impl Expr {
    fn infallible(kind: ExprKind) -> ExprRef {
        let ty = match infer(&kind) {
            Ok(ty) => ty,
            Err(_) => Type::Any,
        };
        Expr::new(kind, ty)
    }

    fn checked(kind: ExprKind) -> Result<ExprRef, EvalError> {
        let ty = infer(&kind)?;
        Ok(Expr::new(kind, ty))
    }

    /// Rebuild a node whose children were rewritten.
    ///
    /// Types are inferred again from the new children; when the operator
    /// rejects them the node falls back to `any` and the mismatch surfaces
    /// at evaluation instead.
    pub(crate) fn rebuilt(kind: ExprKind) -> ExprRef {
        match infer(&kind) {
            Ok(ty) => Expr::new(kind, ty),
            Err(error) => {
                tracing::debug!(%error, "re-inference failed, using `any`");
                Expr::new(kind, Type::Any)
            }
        }
    }

    // Leaves

    /// A literal typed by its value.
    pub fn literal(value: Value) -> ExprRef {
        let ty = Type::of(&value);
        Expr::new(ExprKind::Literal(value), ty)
    }

    /// A literal cast to `ty`.
    pub fn typed_literal(value: Value, ty: Type) -> Result<ExprRef, EvalError> {
        let value = ty.cast(value)?;
        Ok(Expr::new(ExprKind::Literal(value), ty))
    }

    pub fn null() -> ExprRef {
        Expr::literal(Value::Null)
    }

    /// Free variable.
    pub fn name(name: impl Into<Name>) -> ExprRef {
        Expr::infallible(ExprKind::Name(name.into()))
    }

    /// Resolved slot reference.
    pub fn var(var: VarRef) -> ExprRef {
        Expr::infallible(ExprKind::Var(var))
    }

    /// Placeholder for the scope `length` frames out.
    pub fn scope_ref(length: u32) -> ExprRef {
        Expr::infallible(ExprKind::ScopeRef { length })
    }

    // Operators

    pub fn unary(op: OperatorRef, operand: ExprRef) -> Result<ExprRef, EvalError> {
        Expr::checked(ExprKind::Unary { op, operand })
    }

    pub fn binary(op: OperatorRef, lhs: ExprRef, rhs: ExprRef) -> Result<ExprRef, EvalError> {
        Expr::checked(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn ternary(
        op: OperatorRef,
        first: ExprRef,
        second: ExprRef,
        third: Option<ExprRef>,
    ) -> Result<ExprRef, EvalError> {
        Expr::checked(ExprKind::Ternary {
            op,
            first,
            second,
            third,
        })
    }

    /// Short-circuit conjunction over truthiness.
    pub fn and(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::And { lhs, rhs })
    }

    /// Short-circuit disjunction over truthiness.
    pub fn or(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Or { lhs, rhs })
    }

    /// Conditional typed by the union of its branches.
    pub fn if_then_else(cond: ExprRef, then_branch: ExprRef, else_branch: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn sequence(items: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::Sequence(items.into_boxed_slice()))
    }

    pub fn before(first: ExprRef, second: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Before { first, second })
    }

    pub fn cast(target: Type, operand: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Cast { target, operand })
    }

    pub fn instance_of(operand: ExprRef, target: Type) -> ExprRef {
        Expr::infallible(ExprKind::InstanceOf { operand, target })
    }

    // Assignment

    pub fn assign(target: ExprRef, value: ExprRef) -> Result<ExprRef, EvalError> {
        check_assignable(&target)?;
        Expr::checked(ExprKind::Assign { target, value })
    }

    pub fn declare(target: ExprRef, value: ExprRef) -> Result<ExprRef, EvalError> {
        check_assignable(&target)?;
        Expr::checked(ExprKind::Declare { target, value })
    }

    /// `target op= value`, optionally casting the result before the write.
    pub fn compound_assign(
        op: OperatorRef,
        target: ExprRef,
        value: ExprRef,
        cast: Option<Type>,
    ) -> Result<ExprRef, EvalError> {
        check_assignable(&target)?;
        Expr::checked(ExprKind::CompoundAssign {
            op,
            target,
            value,
            cast,
        })
    }

    pub fn inc_dec(op: IncDecOp, target: ExprRef) -> Result<ExprRef, EvalError> {
        check_assignable(&target)?;
        let ty = target.inferred_type();
        if !(ty.is_numeric() || *ty == Type::Any) {
            return Err(invalid_operand(if op.delta() > 0 { "++" } else { "--" }, ty));
        }
        Expr::checked(ExprKind::IncDec { op, target })
    }

    // Access

    pub fn index(base: ExprRef, index: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Index(IndexExpr { base, index }))
    }

    pub fn index_range(base: ExprRef, lo: ExprRef, hi: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::IndexRange { base, lo, hi })
    }

    pub fn host_field(object: ExprRef, field: impl Into<Name>) -> ExprRef {
        Expr::infallible(ExprKind::HostField(HostFieldExpr {
            object,
            field: field.into(),
        }))
    }

    pub fn static_field(class: HostClassRef, field: impl Into<Name>) -> ExprRef {
        Expr::infallible(ExprKind::StaticField(StaticFieldExpr {
            class,
            field: field.into(),
        }))
    }

    pub fn map_member(map: ExprRef, key: impl Into<Name>) -> ExprRef {
        Expr::infallible(ExprKind::MapMember(MapMemberExpr {
            map,
            key: key.into(),
        }))
    }

    pub fn class_member(object: ExprRef, member: impl Into<Name>) -> ExprRef {
        Expr::infallible(ExprKind::ClassMember(ClassMemberExpr {
            object,
            member: member.into(),
        }))
    }

    pub fn method_call(receiver: ExprRef, method: impl Into<Name>, args: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::MethodCall {
            receiver,
            method: method.into(),
            args: args.into_boxed_slice(),
        })
    }

    pub fn static_call(class: HostClassRef, method: impl Into<Name>, args: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::StaticCall {
            class,
            method: method.into(),
            args: args.into_boxed_slice(),
        })
    }

    /// Host constructor call.
    pub fn new_instance(class: HostClassRef, args: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::New {
            class,
            args: args.into_boxed_slice(),
        })
    }

    // Functions and blocks

    pub fn apply(callee: ExprRef, args: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::Apply {
            callee,
            args: args.into_boxed_slice(),
        })
    }

    pub fn lambda(def: LambdaDef) -> ExprRef {
        Expr::infallible(ExprKind::Lambda(Arc::new(def)))
    }

    pub fn let_block(block: LetBlock) -> ExprRef {
        Expr::infallible(ExprKind::Let(Arc::new(block)))
    }

    /// Early return from the innermost `let` block or closure body.
    pub fn early_return(value: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Return(value))
    }

    // Construction

    pub fn array_literal(elem: Type, items: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::ArrayLiteral {
            elem,
            items: items.into_boxed_slice(),
        })
    }

    /// `new elem[len]`, every element at the type's default.
    pub fn array_alloc(elem: Type, len: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::ArrayAlloc { elem, len })
    }

    /// List literal; `create` supplies the list to fill instead of a new one.
    pub fn list_literal(create: Option<ExprRef>, elem: Type, items: Vec<ExprRef>) -> ExprRef {
        Expr::infallible(ExprKind::ListLiteral {
            create,
            elem,
            items: items.into_boxed_slice(),
        })
    }

    /// Map literal; `create` supplies the map to fill instead of a new one.
    pub fn map_literal(
        create: Option<ExprRef>,
        value_ty: Type,
        entries: Vec<(ExprRef, ExprRef)>,
    ) -> ExprRef {
        Expr::infallible(ExprKind::MapLiteral {
            create,
            value_ty,
            entries: entries.into_boxed_slice(),
        })
    }

    // Control

    pub fn while_loop(cond: ExprRef, body: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::While { cond, body })
    }

    pub fn try_catch(
        body: ExprRef,
        binding: ExprRef,
        handler: ExprRef,
    ) -> Result<ExprRef, EvalError> {
        check_assignable(&binding)?;
        Expr::checked(ExprKind::TryCatch {
            body,
            binding,
            handler,
        })
    }

    pub fn throw(value: ExprRef) -> ExprRef {
        Expr::infallible(ExprKind::Throw(value))
    }
}

/// Assignment targets are l-values, or free names that will resolve to one.
fn check_assignable(target: &Expr) -> Result<(), EvalError> {
    if target.as_lvalue().is_some() || matches!(target.kind(), ExprKind::Name(_)) {
        Ok(())
    } else {
        Err(invalid_assignment_target())
    }
}
