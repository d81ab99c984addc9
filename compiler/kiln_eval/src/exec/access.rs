//! Variable, element and member reads.

use kiln_value::coerce::to_int;
use kiln_value::errors::undefined_variable;
use kiln_value::EvalResult;

use crate::environment::Environment;
use crate::expr::{ExprRef, VarRef};
use crate::indexable::Indexable;
use crate::lvalue::LValue;

/// Read a resolved slot, walking `depth` parent links.
pub(super) fn eval_var(var: &VarRef, env: &Environment) -> EvalResult {
    env.lookup(var.depth, var.address)
        .map(kiln_value::Variable::get)
        .ok_or_else(|| {
            undefined_variable(var.name).with_note(format!(
                "no slot {} at depth {}",
                var.address, var.depth
            ))
        })
}

/// Read through the l-value protocol: address once, then read.
pub(super) fn read(target: &dyn LValue, env: &Environment) -> EvalResult {
    let place = target.resolve_target(env)?;
    target.read(&place)
}

/// `base[lo..hi]`.
pub(super) fn eval_index_range(
    base: &ExprRef,
    lo: &ExprRef,
    hi: &ExprRef,
    env: &Environment,
) -> EvalResult {
    let container = Indexable::of(base.evaluate(env)?)?;
    let lo = to_int(&lo.evaluate(env)?)?;
    let hi = to_int(&hi.evaluate(env)?)?;
    container.slice(lo, hi)
}
