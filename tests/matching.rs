use teeny::{Engine, ScriptError, Value};

#[test]
fn test_literal_patterns() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("a := 3; match a { 1: 1, 2: 2, _: 3 }")?.to_string(),
        "3"
    );
    assert_eq!(
        engine.eval(r#"a := "a"; match a { "a": 1, _: 3 }"#)?.to_string(),
        "1"
    );

    Ok(())
}

#[test]
fn test_no_match_yields_nil() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert!(matches!(engine.eval("a := 3; match a { 1: 1 }")?, Value::Nil));

    Ok(())
}

#[test]
fn test_arms_try_in_source_order() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("match 1 { _: 10, 1: 20 }")?.to_string(),
        "10"
    );

    Ok(())
}

#[test]
fn test_predicate_patterns() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("isEven := (a) => a % 2; a := 3; match a { 1: 1, isEven: 2 }")?
            .to_string(),
        "2"
    );
    assert_eq!(
        engine
            .eval("match 4 { (x) => x > 10: 1, (x) => x > 3: 2, _: 3 }")?
            .to_string(),
        "2"
    );

    Ok(())
}

#[test]
fn test_table_patterns_match_supersets() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("a := 15; match [a % 3, a % 5] { [1, 1]: 1, [0, _]: 2, _: 3 }")?
            .to_string(),
        "2"
    );
    // A pattern's entries must all be present; extra scrutinee keys are fine.
    assert_eq!(
        engine.eval("match [1, 2, 3] { [1, 2]: 1, _: 0 }")?.to_string(),
        "1"
    );
    assert_eq!(
        engine.eval("match [x: 1, y: 2] { [x: 1]: 7, _: 0 }")?.to_string(),
        "7"
    );
    assert_eq!(
        engine.eval("match [x: 1] { [x: 2]: 7, _: 0 }")?.to_string(),
        "0"
    );
    // Nested patterns recurse.
    assert_eq!(
        engine.eval("match [[1, 2], 3] { [[1, _], 3]: 1, _: 0 }")?.to_string(),
        "1"
    );

    Ok(())
}

#[test]
fn test_match_binder() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("match 2 + 3 as v { 5: v * 2, _: 0 }")?.to_string(),
        "10"
    );

    Ok(())
}

#[test]
fn test_logical_pattern_composition() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("match 2 { 1 || 2: 10, _: 0 }")?.to_string(),
        "10"
    );
    assert_eq!(
        engine
            .eval("big := (x) => x > 1; match 2 { big && 2: 10, _: 0 }")?
            .to_string(),
        "10"
    );
    assert_eq!(engine.eval("match 5 { !1: 10, _: 0 }")?.to_string(), "10");
    assert_eq!(engine.eval("match 1 { !1: 10, _: 0 }")?.to_string(), "0");

    Ok(())
}

#[test]
fn test_pattern_errors_propagate() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("match 1 { boom: 1, _: 0 }")?.to_string(),
        "Error(Runtime Error, read from non-existing variable)"
    );

    Ok(())
}
