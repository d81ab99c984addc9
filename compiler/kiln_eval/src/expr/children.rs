//! Generic child traversal shared by the rewrite passes.

use std::sync::Arc;

use super::{
    ClassMemberExpr, Expr, ExprKind, ExprRef, HostFieldExpr, IndexExpr, MapMemberExpr,
};

/// Applies the rewrite to each child and remembers whether any changed.
struct Rewriter<'f> {
    f: &'f mut dyn FnMut(&ExprRef) -> ExprRef,
    changed: bool,
}

impl Rewriter<'_> {
    fn one(&mut self, child: &ExprRef) -> ExprRef {
        let new = (self.f)(child);
        if !Arc::ptr_eq(&new, child) {
            self.changed = true;
        }
        new
    }

    fn opt(&mut self, child: Option<&ExprRef>) -> Option<ExprRef> {
        child.map(|child| self.one(child))
    }

    fn all(&mut self, children: &[ExprRef]) -> Box<[ExprRef]> {
        children.iter().map(|child| self.one(child)).collect()
    }
}

impl Expr {
    /// Rewrite every direct child with `f`.
    ///
    /// Returns the new kind only when some child came back as a different
    /// node; arity never changes. Lambda and let bodies are children too:
    /// passes that need a different scope for them handle those kinds first.
    pub(crate) fn map_children(
        &self,
        f: &mut dyn FnMut(&ExprRef) -> ExprRef,
    ) -> Option<ExprKind> {
        let mut rw = Rewriter { f, changed: false };
        let kind = match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Name(_)
            | ExprKind::Var(_)
            | ExprKind::ScopeRef { .. }
            | ExprKind::StaticField(_) => return None,

            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: Arc::clone(op),
                operand: rw.one(operand),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: Arc::clone(op),
                lhs: rw.one(lhs),
                rhs: rw.one(rhs),
            },
            ExprKind::Ternary {
                op,
                first,
                second,
                third,
            } => ExprKind::Ternary {
                op: Arc::clone(op),
                first: rw.one(first),
                second: rw.one(second),
                third: rw.opt(third.as_ref()),
            },
            ExprKind::And { lhs, rhs } => ExprKind::And {
                lhs: rw.one(lhs),
                rhs: rw.one(rhs),
            },
            ExprKind::Or { lhs, rhs } => ExprKind::Or {
                lhs: rw.one(lhs),
                rhs: rw.one(rhs),
            },
            ExprKind::IfThenElse {
                cond,
                then_branch,
                else_branch,
            } => ExprKind::IfThenElse {
                cond: rw.one(cond),
                then_branch: rw.one(then_branch),
                else_branch: rw.one(else_branch),
            },
            ExprKind::Sequence(items) => ExprKind::Sequence(rw.all(items)),
            ExprKind::Before { first, second } => ExprKind::Before {
                first: rw.one(first),
                second: rw.one(second),
            },
            ExprKind::Cast { target, operand } => ExprKind::Cast {
                target: target.clone(),
                operand: rw.one(operand),
            },
            ExprKind::InstanceOf { operand, target } => ExprKind::InstanceOf {
                operand: rw.one(operand),
                target: target.clone(),
            },

            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: rw.one(target),
                value: rw.one(value),
            },
            ExprKind::Declare { target, value } => ExprKind::Declare {
                target: rw.one(target),
                value: rw.one(value),
            },
            ExprKind::CompoundAssign {
                op,
                target,
                value,
                cast,
            } => ExprKind::CompoundAssign {
                op: Arc::clone(op),
                target: rw.one(target),
                value: rw.one(value),
                cast: cast.clone(),
            },
            ExprKind::IncDec { op, target } => ExprKind::IncDec {
                op: *op,
                target: rw.one(target),
            },

            ExprKind::Index(IndexExpr { base, index }) => ExprKind::Index(IndexExpr {
                base: rw.one(base),
                index: rw.one(index),
            }),
            ExprKind::IndexRange { base, lo, hi } => ExprKind::IndexRange {
                base: rw.one(base),
                lo: rw.one(lo),
                hi: rw.one(hi),
            },
            ExprKind::HostField(HostFieldExpr { object, field }) => {
                ExprKind::HostField(HostFieldExpr {
                    object: rw.one(object),
                    field: *field,
                })
            }
            ExprKind::MapMember(MapMemberExpr { map, key }) => ExprKind::MapMember(MapMemberExpr {
                map: rw.one(map),
                key: *key,
            }),
            ExprKind::ClassMember(ClassMemberExpr { object, member }) => {
                ExprKind::ClassMember(ClassMemberExpr {
                    object: rw.one(object),
                    member: *member,
                })
            }
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => ExprKind::MethodCall {
                receiver: rw.one(receiver),
                method: *method,
                args: rw.all(args),
            },
            ExprKind::StaticCall {
                class,
                method,
                args,
            } => ExprKind::StaticCall {
                class: Arc::clone(class),
                method: *method,
                args: rw.all(args),
            },
            ExprKind::New { class, args } => ExprKind::New {
                class: Arc::clone(class),
                args: rw.all(args),
            },

            ExprKind::Apply { callee, args } => ExprKind::Apply {
                callee: rw.one(callee),
                args: rw.all(args),
            },
            ExprKind::Lambda(def) => ExprKind::Lambda(Arc::new(def.with_body(rw.one(&def.body)))),
            ExprKind::Let(block) => ExprKind::Let(Arc::new(block.with_body(rw.all(&block.body)))),
            ExprKind::Return(value) => ExprKind::Return(rw.one(value)),

            ExprKind::ArrayLiteral { elem, items } => ExprKind::ArrayLiteral {
                elem: elem.clone(),
                items: rw.all(items),
            },
            ExprKind::ArrayAlloc { elem, len } => ExprKind::ArrayAlloc {
                elem: elem.clone(),
                len: rw.one(len),
            },
            ExprKind::ListLiteral {
                create,
                elem,
                items,
            } => ExprKind::ListLiteral {
                create: rw.opt(create.as_ref()),
                elem: elem.clone(),
                items: rw.all(items),
            },
            ExprKind::MapLiteral {
                create,
                value_ty,
                entries,
            } => ExprKind::MapLiteral {
                create: rw.opt(create.as_ref()),
                value_ty: value_ty.clone(),
                entries: entries
                    .iter()
                    .map(|(key, value)| (rw.one(key), rw.one(value)))
                    .collect(),
            },

            ExprKind::While { cond, body } => ExprKind::While {
                cond: rw.one(cond),
                body: rw.one(body),
            },
            ExprKind::TryCatch {
                body,
                binding,
                handler,
            } => ExprKind::TryCatch {
                body: rw.one(body),
                binding: rw.one(binding),
                handler: rw.one(handler),
            },
            ExprKind::Throw(value) => ExprKind::Throw(rw.one(value)),
        };
        rw.changed.then_some(kind)
    }
}
