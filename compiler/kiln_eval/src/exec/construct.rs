//! Container literals.
//!
//! Elements are cast to the declared element type before insertion; list
//! and map literals may fill a container supplied by a `create` expression
//! instead of allocating one.

use kiln_value::coerce::to_int;
use kiln_value::errors::{index_out_of_bounds, map_keys_must_be_strings, type_mismatch};
use kiln_value::{EvalError, EvalResult, Type, Value};
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::expr::ExprRef;

fn eval_elements(elem: &Type, items: &[ExprRef], env: &Environment) -> Result<Vec<Value>, EvalError> {
    items
        .iter()
        .map(|item| elem.cast(item.evaluate(env)?))
        .collect()
}

pub(super) fn eval_array_literal(elem: &Type, items: &[ExprRef], env: &Environment) -> EvalResult {
    let values = items
        .iter()
        .map(|item| item.evaluate(env))
        .collect::<Result<Vec<_>, _>>()?;
    Value::array(elem.clone(), values)
}

pub(super) fn eval_array_alloc(elem: &Type, len: &ExprRef, env: &Environment) -> EvalResult {
    let requested = to_int(&len.evaluate(env)?)?;
    let len = usize::try_from(requested).map_err(|_| index_out_of_bounds(requested, 0))?;
    Ok(Value::array_filled(elem.clone(), len))
}

pub(super) fn eval_list_literal(
    create: Option<&ExprRef>,
    elem: &Type,
    items: &[ExprRef],
    env: &Environment,
) -> EvalResult {
    let target = match create {
        Some(create) => match create.evaluate(env)? {
            Value::List(list) => Some(list),
            other => return Err(type_mismatch("List", other.type_name())),
        },
        None => None,
    };
    let values = eval_elements(elem, items, env)?;
    match target {
        Some(list) => {
            list.write().extend(values);
            Ok(Value::List(list))
        }
        None => Ok(Value::list(values)),
    }
}

pub(super) fn eval_map_literal(
    create: Option<&ExprRef>,
    value_ty: &Type,
    entries: &[(ExprRef, ExprRef)],
    env: &Environment,
) -> EvalResult {
    let target = match create {
        Some(create) => match create.evaluate(env)? {
            Value::Map(map) => Some(map),
            other => return Err(type_mismatch("Map", other.type_name())),
        },
        None => None,
    };
    let mut pairs = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key = match key.evaluate(env)? {
            Value::Str(key) => key.to_string(),
            other => return Err(map_keys_must_be_strings(other.type_name())),
        };
        let value = value_ty.cast(value.evaluate(env)?)?;
        pairs.push((key, value));
    }
    match target {
        Some(map) => {
            map.write().extend(pairs);
            Ok(Value::Map(map))
        }
        None => Ok(Value::map(pairs.into_iter().collect::<FxHashMap<_, _>>())),
    }
}
