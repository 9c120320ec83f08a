use teeny::{Engine, ScriptError, Value};

#[test]
fn test_arithmetic() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("1 + 2")?.to_string(), "3");
    assert_eq!(engine.eval("2 + 3 * 4")?.to_string(), "14");
    assert_eq!(engine.eval("(2 + 3) * 4")?.to_string(), "20");
    assert_eq!(engine.eval("7 % 3")?.to_string(), "1");
    // Remainder takes the sign of the divisor.
    assert_eq!(engine.eval("(0 - 1) % 3")?.to_string(), "2");
    assert_eq!(engine.eval("10 / 4")?.to_string(), "2.5");
    assert_eq!(engine.eval("a := 5; a - a")?.to_string(), "0");
    assert_eq!(engine.eval("a := 5; a * 1")?.to_string(), "5");

    Ok(())
}

#[test]
fn test_division_by_zero_is_an_error() -> Result<(), ScriptError> {
    let engine = Engine::new();

    let result = engine.eval("1 / 0")?;
    assert!(result.is_error());
    assert_eq!(result.to_string(), "Error(Runtime Error, divide by zero)");

    Ok(())
}

#[test]
fn test_type_mismatch_errors() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval(r#"1 + "a""#)?.to_string(),
        "Error(Runtime Error, add a non-Number to a Number)"
    );
    assert_eq!(
        engine.eval(r#""a" - 1"#)?.to_string(),
        "Error(Runtime Error, minus a non-Number from a Number)"
    );

    Ok(())
}

#[test]
fn test_comparisons_return_numbers() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("1 < 2")?.to_string(), "1");
    assert_eq!(engine.eval("2 <= 1")?.to_string(), "0");
    assert_eq!(engine.eval("2 >= 2")?.to_string(), "1");
    assert_eq!(engine.eval(r#""a" < "b""#)?.to_string(), "1");
    assert_eq!(engine.eval("1 == 1")?.to_string(), "1");
    assert_eq!(engine.eval(r#"1 == "1""#)?.to_string(), "0");
    assert_eq!(engine.eval(r#"1 != "1""#)?.to_string(), "1");

    Ok(())
}

#[test]
fn test_logical_operators_short_circuit() -> Result<(), ScriptError> {
    let engine = Engine::new();

    // The right side would blow up if evaluated.
    assert_eq!(engine.eval("0 && (1 / 0)")?.to_string(), "0");
    assert_eq!(engine.eval("1 || (1 / 0)")?.to_string(), "1");
    assert_eq!(engine.eval("1 && 2")?.to_string(), "1");
    assert_eq!(engine.eval("0 || 0")?.to_string(), "0");

    Ok(())
}

#[test]
fn test_coalescing_operators() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("nil ?? 5")?.to_string(), "5");
    assert_eq!(engine.eval("3 ?? 5")?.to_string(), "3");
    assert_eq!(engine.eval("0 ?? 5")?.to_string(), "0");
    assert_eq!(engine.eval("0 ?: 5")?.to_string(), "5");
    assert_eq!(engine.eval("3 ?: 5")?.to_string(), "3");

    Ok(())
}

#[test]
fn test_unary_operators() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("-3 + 5")?.to_string(), "2");
    assert_eq!(engine.eval("!0")?.to_string(), "1");
    assert_eq!(engine.eval("!3")?.to_string(), "0");
    assert_eq!(engine.eval("5!")?.to_string(), "120");
    assert_eq!(engine.eval("0!")?.to_string(), "1");

    Ok(())
}

#[test]
fn test_range_operator_is_inclusive() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("1 .. 3")?.to_string(), "[1, 2, 3]");
    assert_eq!(engine.eval("3 .. 1")?.to_string(), "[]");

    Ok(())
}

#[test]
fn test_regex_matching() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""abc123" =~ `\d+`"#)?.to_string(), "1");
    assert_eq!(engine.eval(r#""abc" =~ `^\d+$`"#)?.to_string(), "0");
    assert!(engine.eval(r#"1 =~ `\d`"#)?.is_error());

    Ok(())
}

#[test]
fn test_assignment_forms() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("a := 1; a = 2; a")?.to_string(), "2");
    assert_eq!(engine.eval("a := 1; a += 2; a")?.to_string(), "3");
    assert_eq!(engine.eval("a := 10; a -= 2; a *= 3; a")?.to_string(), "24");
    assert_eq!(engine.eval("a := 9; a /= 3; a")?.to_string(), "3");
    assert_eq!(engine.eval("a := 9; a %= 4; a")?.to_string(), "1");

    // Writing to an undeclared name is an error; declaring is not.
    assert!(engine.eval("zzz = 1")?.is_error());
    assert_eq!(engine.eval("zzz := 1")?.to_string(), "1");

    Ok(())
}

#[test]
fn test_soft_assignment() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("a := nil; a ?= 5; a")?.to_string(), "5");
    assert_eq!(engine.eval("a := 1; a ?= 5; a")?.to_string(), "1");
    assert_eq!(engine.eval("b ?= 7; b")?.to_string(), "7");

    Ok(())
}

#[test]
fn test_custom_infix_operator() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("infix_add := (a, b) => a + b; 1 add 2")?.to_string(),
        "3"
    );
    assert!(engine.eval("1 add 2")?.is_error());

    Ok(())
}

#[test]
fn test_left_to_right_evaluation() -> Result<(), ScriptError> {
    let engine = Engine::new();

    // Side effects in arguments happen in source order.
    assert_eq!(
        engine
            .eval(
                "order := []
                 note := (x) => { order.push(x); x }
                 f := (a, b, c) => order
                 f(note(1), note(2), note(3))"
            )?
            .to_string(),
        "[1, 2, 3]"
    );

    Ok(())
}

#[test]
fn test_statement_separation() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("a := 1; b := 2; a + b")?.to_string(), "3");
    assert_eq!(engine.eval("a := 1\nb := 2\na + b")?.to_string(), "3");

    Ok(())
}

#[test]
fn test_syntax_errors_abort() {
    let engine = Engine::new();

    assert!(matches!(
        engine.eval("a := )"),
        Err(ScriptError::Syntax { .. })
    ));
    assert!(matches!(
        engine.eval("a $ b"),
        Err(ScriptError::Lexical { .. })
    ));
}

#[test]
fn test_numeric_printing() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("3.0")?.to_string(), "3");
    assert_eq!(engine.eval("1.5")?.to_string(), "1.5");
    assert_eq!(engine.eval("2e3")?.to_string(), "2000");
    assert_eq!(engine.eval(".5")?.to_string(), "0.5");

    Ok(())
}

#[test]
fn test_determinism() -> Result<(), ScriptError> {
    let engine = Engine::new();

    let script = "t := [3, 1, 2]; [t.sort(), t.sum(), \"x{t.keys()}\"]";
    let first = engine.eval(script)?.to_string();
    let second = engine.eval(script)?.to_string();
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_leftover_bubble_surfaces_value() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("break 5")?.to_string(), "5");
    assert!(matches!(engine.eval("break")?, Value::Nil));

    Ok(())
}
