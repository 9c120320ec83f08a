use teeny::{Engine, ScriptError};

#[test]
fn test_function_forms() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("sum := fn (a, b) a + b; sum(1, 2)")?.to_string(),
        "3"
    );
    assert_eq!(
        engine.eval("sum := (a, b) => a + b; sum(1, 2)")?.to_string(),
        "3"
    );
    assert_eq!(engine.eval("double := x => x * 2; double(4)")?.to_string(), "8");

    Ok(())
}

#[test]
fn test_defaults_and_kwargs() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("sum := (a, b = 1) => a + b; sum(1)")?.to_string(),
        "2"
    );
    assert_eq!(
        engine.eval("sum := (a, b) => a + b; sum(a = 2, b = 1)")?.to_string(),
        "3"
    );
    assert_eq!(
        engine.eval("sum := (a, b = 1) => a + b; sum(1, 5)")?.to_string(),
        "6"
    );
    // Defaults are evaluated at definition time.
    assert_eq!(
        engine
            .eval("d := 10; f := (x = d) => x; d = 20; f()")?
            .to_string(),
        "10"
    );

    Ok(())
}

#[test]
fn test_rest_parameters() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("f := (a, rest...) => rest; f(1, 2, 3)")?.to_string(),
        "[2, 3]"
    );
    assert_eq!(
        engine.eval("f := (a, rest...) => rest; f(1)")?.to_string(),
        "[]"
    );

    Ok(())
}

#[test]
fn test_spread_arguments() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("f := (a, b, c) => a + b + c; t := [1, 2, 3]; f(...t)")?
            .to_string(),
        "6"
    );
    assert_eq!(
        engine
            .eval("f := (a, b) => a - b; t := [1, b: 4]; f(...t)")?
            .to_string(),
        "-3"
    );

    Ok(())
}

#[test]
fn test_surplus_arguments_are_dropped() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("f := (a) => a; f(1, 2, 3)")?.to_string(), "1");

    Ok(())
}

#[test]
fn test_lexical_closures_share_the_defining_scope() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("a := 1; f := () => a = a + 1; f(); a")?.to_string(),
        "2"
    );

    Ok(())
}

#[test]
fn test_dynamic_closures_snapshot_the_defining_scope() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("a := 1; f := () @=> a = a + 1; f(); a")?.to_string(),
        "1"
    );
    assert_eq!(
        engine.eval("a := 1; f := (c) @=> a = c + 1; f(1); a")?.to_string(),
        "1"
    );
    assert_eq!(
        engine.eval("a := 1; f := fn@ (c = 1) a = a + 1; f(); a")?.to_string(),
        "1"
    );

    Ok(())
}

#[test]
fn test_closure_identity() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("f1 := (a) => a + 1; f2 := (a) => a + 1; f1 == f2")?
            .to_string(),
        "0"
    );
    assert_eq!(engine.eval("f := (x) => x; f == f")?.to_string(), "1");
    assert_eq!(engine.eval("f := (x) => x; f != f")?.to_string(), "0");

    Ok(())
}

#[test]
fn test_pipe_operator() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("sum := fn (a, b) a + b; 1 |> sum(2)")?.to_string(),
        "3"
    );
    assert_eq!(
        engine.eval("f := fn (a, b) a + 2 * b; 1 |> f(2)")?.to_string(),
        "5"
    );
    assert_eq!(
        engine.eval("f := fn (a, b) a + 2 * b; 1 |> f(2, _)")?.to_string(),
        "4"
    );
    assert_eq!(engine.eval("1 |> ((a, b) => a + 2 * b)(2, _)")?.to_string(), "4");
    // Piping into a bare callable.
    assert_eq!(engine.eval("inc := (x) => x + 1; 5 |> inc")?.to_string(), "6");
    // Pipelines chain left-to-right.
    assert_eq!(
        engine
            .eval("inc := (x) => x + 1; dbl := (x) => x * 2; 3 |> inc(_) |> dbl(_)")?
            .to_string(),
        "8"
    );

    Ok(())
}

#[test]
fn test_return_unwinds_the_function_body() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("f := () => { return 7; 9 }; f()")?.to_string(),
        "7"
    );
    assert_eq!(
        engine
            .eval("f := (n) => { for i in 1 .. 10 { if i == n { return i * 100 } else { i } }; 0 }; f(3)")?
            .to_string(),
        "300"
    );

    Ok(())
}

#[test]
fn test_this_binds_the_closure_itself() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("fact := (n) => if n { n * this(n - 1) } else { 1 }; fact(5)")?
            .to_string(),
        "120"
    );

    Ok(())
}

#[test]
fn test_recursion() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval("fib := (n) => if n < 2 { n } else { fib(n - 1) + fib(n - 2) }; fib(10)")?
            .to_string(),
        "55"
    );

    Ok(())
}

#[test]
fn test_compose() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval(
                "inc := (x) => x + 1
                 dbl := (x) => x * 2
                 f := func.compose(inc, dbl)
                 f(5)"
            )?
            .to_string(),
        "11"
    );

    Ok(())
}

#[test]
fn test_errors_propagate_through_calls() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("f := () => 1 / 0; g := () => f(); g()")?.to_string(),
        "Error(Runtime Error, divide by zero)"
    );

    Ok(())
}
