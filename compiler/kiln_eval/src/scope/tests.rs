use super::*;
use kiln_value::Value;
use pretty_assertions::assert_eq;

use crate::environment::Slot;

fn layout(names: &[&str]) -> Arc<FrameLayout> {
    FrameLayout::new(names.iter().map(|n| Slot::new(*n, Type::Int)).collect())
}

#[test]
fn test_lookup_counts_frame_hops() {
    let env = CompileEnv::root(layout(&["a"]))
        .block(layout(&["b"]))
        .block(layout(&["c"]));

    let a = env.lookup(Name::intern("a"));
    assert_eq!(a.as_ref().map(|b| (b.depth, b.address, b.level)), Some((2, 0, 0)));
    let c = env.lookup(Name::intern("c"));
    assert_eq!(c.map(|b| b.depth), Some(0));
    assert!(env.lookup(Name::intern("missing")).is_none());
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let env = CompileEnv::root(FrameLayout::new(vec![Slot::new("x", Type::Str)]))
        .block(layout(&["x"]));
    let x = env.lookup(Name::intern("x"));
    assert_eq!(x.map(|b| (b.depth, b.ty)), Some((0, Type::Int)));
}

#[test]
fn test_function_scope_opens_a_level() {
    let outer = CompileEnv::root(layout(&["g"]));
    let inner = outer.function(layout(&["p"])).block(layout(&["l"]));
    assert_eq!(inner.level(), 1);

    let g = inner.lookup(Name::intern("g"));
    assert_eq!(g.map(|b| (b.depth, b.level)), Some((2, 0)));
    let p = inner.lookup(Name::intern("p"));
    assert_eq!(p.map(|b| (b.depth, b.level)), Some((1, 1)));
}

#[test]
fn test_runtime_scope_walks_live_frames() {
    let globals = Environment::root(FrameLayout::new(vec![Slot::constant("k", Type::Long)]));
    let local = globals.child(layout(&["i"]));
    local.get(0).map(|cell| cell.set(Value::Int(3)));

    let env = CompileEnv::runtime(local).function(layout(&["arg"]));
    let k = env.lookup(Name::intern("k"));
    assert_eq!(
        k.map(|b| (b.depth, b.level, b.modifiers)),
        Some((2, 0, Modifiers::FINAL))
    );
    let i = env.lookup(Name::intern("i"));
    assert_eq!(i.map(|b| b.depth), Some(1));
}

#[test]
fn test_lookup_at_only_searches_one_frame() {
    let env = CompileEnv::root(layout(&["a"])).block(layout(&["b"]));
    assert_eq!(env.lookup_at(1, Name::intern("a")).map(|b| b.depth), Some(1));
    assert!(env.lookup_at(0, Name::intern("a")).is_none());
    assert!(env.lookup_at(5, Name::intern("a")).is_none());
}
