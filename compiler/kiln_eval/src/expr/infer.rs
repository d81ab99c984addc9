//! Static type and constness of a node, computed from its children.

use kiln_value::{EvalError, Type};

use super::{ExprKind, ExprRef, MapMemberExpr};

fn ty(expr: &ExprRef) -> Type {
    expr.inferred_type().clone()
}

pub(super) fn infer(kind: &ExprKind) -> Result<Type, EvalError> {
    let inferred = match kind {
        ExprKind::Literal(value) => Type::of(value),
        ExprKind::Name(_) | ExprKind::ScopeRef { .. } => Type::Any,
        ExprKind::Var(var) => var.ty.clone(),

        ExprKind::Unary { op, operand } => op.infer_type(&[ty(operand)])?,
        ExprKind::Binary { op, lhs, rhs } => op.infer_type(&[ty(lhs), ty(rhs)])?,
        ExprKind::Ternary {
            op,
            first,
            second,
            third,
        } => {
            let mut args = vec![ty(first), ty(second)];
            if let Some(third) = third {
                args.push(ty(third));
            }
            op.infer_type(&args)?
        }
        ExprKind::And { .. } | ExprKind::Or { .. } | ExprKind::InstanceOf { .. } => Type::Bool,
        ExprKind::IfThenElse {
            then_branch,
            else_branch,
            ..
        } => then_branch.inferred_type().union(else_branch.inferred_type()),
        ExprKind::Sequence(items) => items.last().map_or(Type::Void, ty),
        ExprKind::Before { first, .. } => ty(first),
        ExprKind::Cast { target, .. } => target.clone(),

        ExprKind::Assign { target, .. }
        | ExprKind::Declare { target, .. }
        | ExprKind::IncDec { target, .. } => ty(target),
        ExprKind::CompoundAssign {
            op,
            target,
            value,
            cast,
        } => {
            op.infer_type(&[ty(target), ty(value)])?;
            cast.clone().unwrap_or_else(|| ty(target))
        }

        ExprKind::Index(index) => element_of(index.base.inferred_type()),
        ExprKind::IndexRange { base, .. } => match base.inferred_type() {
            Type::Str | Type::CharBuffer => Type::Str,
            list @ (Type::List(_) | Type::Array(_)) => list.clone(),
            _ => Type::Any,
        },
        ExprKind::MapMember(MapMemberExpr { map, .. }) => match map.inferred_type() {
            Type::Map(value) => (**value).clone(),
            _ => Type::Any,
        },
        ExprKind::HostField(_)
        | ExprKind::StaticField(_)
        | ExprKind::ClassMember(_)
        | ExprKind::MethodCall { .. }
        | ExprKind::StaticCall { .. } => Type::Any,
        ExprKind::New { class, .. } => Type::Host(class.name().into()),

        ExprKind::Apply { callee, .. } => callee
            .inferred_type()
            .return_type()
            .cloned()
            .unwrap_or(Type::Any),
        ExprKind::Lambda(def) => Type::function(def.ret.clone()),
        ExprKind::Let(block) => block.ret.clone(),
        ExprKind::Return(_) | ExprKind::While { .. } | ExprKind::Throw(_) => Type::Void,

        ExprKind::ArrayLiteral { elem, .. } | ExprKind::ArrayAlloc { elem, .. } => {
            Type::array(elem.clone())
        }
        ExprKind::ListLiteral { elem, .. } => Type::list(elem.clone()),
        ExprKind::MapLiteral { value_ty, .. } => Type::map(value_ty.clone()),
        ExprKind::TryCatch { body, handler, .. } => {
            body.inferred_type().union(handler.inferred_type())
        }
    };
    Ok(inferred)
}

/// Constness from the children's cached flags.
pub(super) fn constness(kind: &ExprKind) -> bool {
    let constant = |expr: &ExprRef| expr.is_constant();
    match kind {
        ExprKind::Literal(_) => true,
        ExprKind::Unary { op, operand } => op.is_pure() && constant(operand),
        ExprKind::Binary { op, lhs, rhs } => op.is_pure() && constant(lhs) && constant(rhs),
        ExprKind::Ternary {
            op,
            first,
            second,
            third,
        } => {
            op.is_pure()
                && constant(first)
                && constant(second)
                && third.as_ref().map_or(true, constant)
        }
        ExprKind::And { lhs, rhs } | ExprKind::Or { lhs, rhs } => constant(lhs) && constant(rhs),
        ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        } => constant(cond) && constant(then_branch) && constant(else_branch),
        ExprKind::Sequence(items) => items.iter().all(constant),
        ExprKind::Before { first, second } => constant(first) && constant(second),
        ExprKind::Cast { operand, .. } | ExprKind::InstanceOf { operand, .. } => {
            constant(operand)
        }
        _ => false,
    }
}

/// Element type produced by indexing a value of type `base`.
fn element_of(base: &Type) -> Type {
    base.element_type().cloned().unwrap_or(Type::Any)
}
