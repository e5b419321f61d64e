use super::*;

fn store_with(f: impl FnOnce(&mut ParameterManager<'_>)) -> ParameterStore {
    let mut store = ParameterStore::default();
    let mut m = ParameterManager::new(&mut store);
    f(&mut m);
    store
}

#[test]
fn names_follow_the_naming_rule() {
    store_with(|m| {
        assert_eq!(m.append_float("Speed", "Speed", 1.0, 0.0, 10.0), AppendResult::Success);
        assert_eq!(m.append_float("Speed2", "Speed 2", 1.0, 0.0, 10.0), AppendResult::Success);
        assert_eq!(m.append_float("speed", "x", 1.0, 0.0, 1.0), AppendResult::InvalidName);
        assert_eq!(m.append_float("SpeedX", "x", 1.0, 0.0, 1.0), AppendResult::InvalidName);
        assert_eq!(m.append_float("", "x", 1.0, 0.0, 1.0), AppendResult::InvalidName);
        assert_eq!(m.append_toggle("Speed", "again", true), AppendResult::DuplicateName);
    });
}

#[test]
fn defaults_are_stored_and_clamped() {
    let store = store_with(|m| {
        m.append_float("Gain", "Gain", 5.0, 0.0, 2.0);
        m.append_int("Count", "Count", 3, 0, 10);
        m.append_menu("Shape", "Shape", &["Circle", "Square"], 1);
        m.append_text("Label", "Label", "hi");
        m.append_pulse("Reset", "Reset");
    });
    assert_eq!(store.float("Gain"), Some(2.0));
    assert_eq!(store.int("Count"), Some(3));
    assert_eq!(store.float("Count"), Some(3.0));
    assert_eq!(store.int("Shape"), Some(1));
    assert_eq!(store.text("Shape"), Some("Square"));
    assert_eq!(store.text("Label"), Some("hi"));
    assert!(store.value("Reset").is_none());
    assert!(store.is_pulse("Reset"));
    assert!(!store.is_pulse("Gain"));
    assert_eq!(store.defs().len(), 5);
}

#[test]
fn inconsistent_ranges_are_rejected() {
    store_with(|m| {
        assert_eq!(m.append_float("Bad", "x", 0.0, 2.0, 1.0), AppendResult::InvalidRange);
        assert_eq!(m.append_menu("Menu", "x", &["A"], 3), AppendResult::InvalidRange);
    });
}

#[test]
fn set_clamps_and_type_checks() {
    let mut store = store_with(|m| {
        m.set_page("Main");
        m.append_float("Gain", "Gain", 1.0, 0.0, 2.0);
        m.append_menu("Shape", "Shape", &["Circle", "Square"], 0);
        m.append_pulse("Reset", "Reset");
    });
    assert_eq!(store.def("Gain").unwrap().page, "Main");

    store.set("Gain", ParameterValue::Float(9.0)).unwrap();
    assert_eq!(store.float("Gain"), Some(2.0));
    store.set("Gain", ParameterValue::Int(1)).unwrap();
    assert_eq!(store.float("Gain"), Some(1.0));

    store
        .set("Shape", ParameterValue::Text("Square".to_string()))
        .unwrap();
    assert_eq!(store.int("Shape"), Some(1));
    assert!(store.set("Shape", ParameterValue::Int(5)).is_err());
    assert!(store.set("Gain", ParameterValue::Toggle(true)).is_err());
    assert!(store.set("Reset", ParameterValue::Toggle(true)).is_err());
    assert!(store.set("Missing", ParameterValue::Int(0)).is_err());
}
