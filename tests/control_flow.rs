use teeny::{Engine, ScriptError, Value};

#[test]
fn test_blocks() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("{1 + 2}")?.to_string(), "3");
    assert_eq!(engine.eval("{1 + 1; 1 + 2}")?.to_string(), "3");
    // Declarations inside a block stay inside the block.
    assert_eq!(engine.eval("a := 1; {a := 2}; a")?.to_string(), "1");
    // Writes reach the enclosing scope.
    assert_eq!(engine.eval("a := 1; {a = 2}; a")?.to_string(), "2");

    Ok(())
}

#[test]
fn test_if_elif_else() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("a := 1; if a { 1 } else { 2 }")?.to_string(), "1");
    assert_eq!(engine.eval("a := 0; if a { 1 } else { 2 }")?.to_string(), "2");
    assert_eq!(
        engine
            .eval("a := 1; if a - 1 { 1 } elif a { 2 } else { 3 }")?
            .to_string(),
        "2"
    );
    assert!(matches!(engine.eval("a := 1; if a - 1 { 1 }")?, Value::Nil));
    assert_eq!(engine.eval("if 1 then { 5 }")?.to_string(), "5");

    Ok(())
}

#[test]
fn test_truthiness_drives_branching() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("a := []; if a { 1 } else { 2 }")?.to_string(), "2");
    assert_eq!(engine.eval("a := [1]; if a { 1 } else { 2 }")?.to_string(), "1");
    assert_eq!(engine.eval("a := nil; if a { 1 } else { 2 }")?.to_string(), "2");
    assert_eq!(engine.eval(r#"a := ""; if a { 1 } else { 2 }"#)?.to_string(), "2");
    assert_eq!(engine.eval("a := () => {}; if a { 1 } else { 2 }")?.to_string(), "1");

    Ok(())
}

#[test]
fn test_while_returns_last_body_value() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("a := 2; while a { a = a - 1; a - 1 }")?.to_string(),
        "-1"
    );
    assert!(matches!(engine.eval("while 0 { 1 }")?, Value::Nil));

    Ok(())
}

#[test]
fn test_while_break_and_continue_carry_values() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("a := 0; while 1 { a = a + 1; if a == 3 { break a * 10 } else { a } }")?
            .to_string(),
        "30"
    );
    assert_eq!(
        engine
            .eval("a := 0; while a < 3 { a = a + 1; if a == 1 { continue 9 } else { a } }")?
            .to_string(),
        "3"
    );

    Ok(())
}

#[test]
fn test_for_collects_body_values() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("for i in 1 .. 3 { i * i }")?.to_string(), "[1, 4, 9]");
    assert_eq!(engine.eval("for _ in 3.times() { 1 }")?.to_string(), "[1, 1, 1]");
    assert_eq!(
        engine.eval("for i in 1 { i }")?.to_string(),
        "Error(Runtime Error, iterate non-Table)"
    );

    Ok(())
}

#[test]
fn test_for_destructures_binders() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval(r#"for [k, v] in [a: 1, b: 2].pairs() { "{k}={v}" }"#)?
            .to_string(),
        "[a=1, b=2]"
    );

    Ok(())
}

#[test]
fn test_for_break_and_continue() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("for i in 1 .. 5 { if i == 3 { break 99 } else { i } }")?
            .to_string(),
        "[1, 2, 99]"
    );
    assert_eq!(
        engine
            .eval("for i in 1 .. 3 { if i == 2 { continue 0 } else { i } }")?
            .to_string(),
        "[1, 0, 3]"
    );

    Ok(())
}

#[test]
fn test_loop_scopes_are_fresh_per_iteration() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("fns := []; for i in 1 .. 3 { fns.push(() @=> i) }; fns[0]() + fns[2]()")?
            .to_string(),
        "4"
    );

    Ok(())
}

#[test]
fn test_nested_loops() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("for i in 1 .. 2 { for j in 1 .. 2 { i * 10 + j } }")?
            .to_string(),
        "[[11, 12], [21, 22]]"
    );

    Ok(())
}
