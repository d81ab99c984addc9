use super::*;
use kiln_value::Value;
use pretty_assertions::assert_eq;

fn layout(names: &[&str]) -> Arc<FrameLayout> {
    FrameLayout::new(names.iter().map(|n| Slot::new(*n, Type::Int)).collect())
}

#[test]
fn test_slots_start_at_type_default() {
    let frame = Environment::root(FrameLayout::new(vec![
        Slot::new("n", Type::Int),
        Slot::new("s", Type::Str),
        Slot::new("d", Type::Double),
    ]));
    assert_eq!(frame.get(0).map(Variable::get), Some(Value::Int(0)));
    assert_eq!(frame.get(1).map(Variable::get), Some(Value::Null));
    assert_eq!(frame.get(2).map(Variable::get), Some(Value::Double(0.0)));
    assert!(frame.get(3).is_none());
}

#[test]
fn test_layout_lookup() {
    let layout = layout(&["a", "b"]);
    assert_eq!(layout.lookup(Name::intern("b")).map(|(i, _)| i), Some(1));
    assert!(layout.lookup(Name::intern("c")).is_none());
    assert_eq!(layout.len(), 2);
}

#[test]
fn test_redeclared_name_resolves_to_last_slot() {
    let layout = layout(&["x", "x"]);
    assert_eq!(layout.lookup(Name::intern("x")).map(|(i, _)| i), Some(1));
}

#[test]
fn test_depth_addressing() {
    let outer = Environment::root(layout(&["x"]));
    let middle = outer.child(layout(&["y"]));
    let inner = middle.child(layout(&["z"]));

    outer.get(0).map(|cell| cell.set(Value::Int(1)));
    middle.get(0).map(|cell| cell.set(Value::Int(2)));

    assert_eq!(inner.lookup(2, 0).map(Variable::get), Some(Value::Int(1)));
    assert_eq!(inner.lookup(1, 0).map(Variable::get), Some(Value::Int(2)));
    assert_eq!(inner.lookup(0, 0).map(Variable::get), Some(Value::Int(0)));
    assert!(inner.lookup(3, 0).is_none());
    assert_eq!(inner.frames().count(), 3);
}

#[test]
fn test_child_frames_alias_parent_cells() {
    let outer = Environment::root(layout(&["x"]));
    let inner = outer.child(FrameLayout::empty());
    inner.lookup(1, 0).map(|cell| cell.set(Value::Int(9)));
    assert_eq!(outer.get(0).map(Variable::get), Some(Value::Int(9)));
    assert!(inner.parent().is_some_and(|p| p.ptr_eq(&outer)));
}

#[test]
fn test_frame_outlives_its_evaluation() {
    let captured = {
        let outer = Environment::root(layout(&["x"]));
        outer.get(0).map(|cell| cell.set(Value::Int(42)));
        outer.child(FrameLayout::empty())
    };
    assert_eq!(captured.lookup(1, 0).map(Variable::get), Some(Value::Int(42)));
}

#[test]
fn test_constant_slot_modifiers() {
    let slot = Slot::constant("pi", Type::Double);
    assert!(slot.modifiers.contains(Modifiers::FINAL));
    assert!(Slot::new("x", Type::Int).modifiers.is_empty());
}
