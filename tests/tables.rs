use teeny::{Engine, ScriptError};

#[test]
fn test_table_literals() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("[1, 2, 3]")?.to_string(), "[1, 2, 3]");
    assert_eq!(engine.eval("[]")?.to_string(), "[]");
    assert_eq!(
        engine.eval(r#"[1, "two", [3]]"#)?.to_string(),
        "[1, two, [3]]"
    );
    assert_eq!(engine.eval("[a: 1, b: 2]")?.to_string(), "[a: 1, b: 2]");
    assert_eq!(
        engine.eval(r#"["key": 9, 5]"#)?.to_string(),
        "[5, key: 9]"
    );

    Ok(())
}

#[test]
fn test_table_spread() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("t := [1, 2]; [0, ...t, 9]")?.to_string(),
        "[0, 1, 2, 9]"
    );
    assert_eq!(
        engine.eval("t := [a: 1]; [...t, b: 2]")?.to_string(),
        "[a: 1, b: 2]"
    );
    assert!(engine.eval("[...5]")?.is_error());

    Ok(())
}

#[test]
fn test_indexing_and_members() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("t := [10, 20]; t[1]")?.to_string(), "20");
    assert_eq!(engine.eval("t := [x: 5]; t.x")?.to_string(), "5");
    assert_eq!(engine.eval(r#"t := [x: 5]; t["x"]"#)?.to_string(), "5");
    assert_eq!(engine.eval("t := []; t.missing")?.to_string(), "nil");

    Ok(())
}

#[test]
fn test_member_assignment() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("t := [x: 1]; t.x = 2; t.x")?.to_string(), "2");
    assert_eq!(engine.eval("t := [x: 1]; t.x += 4; t.x")?.to_string(), "5");
    assert_eq!(engine.eval("t := []; t.y := 3; t.y")?.to_string(), "3");
    assert_eq!(engine.eval("t := [1, 2]; t[0] = 9; t")?.to_string(), "[9, 2]");

    // `=` requires the key to already exist.
    assert_eq!(
        engine.eval("t := []; t.y = 3")?.to_string(),
        "Error(Runtime Error, setting non-existing property)"
    );

    Ok(())
}

#[test]
fn test_push_and_size() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("t := []; t.push(1); t.push(2); t")?.to_string(), "[1, 2]");
    assert_eq!(engine.eval("t := []; t.push(7)")?.to_string(), "7");

    Ok(())
}

#[test]
fn test_insertion_order_is_preserved() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("[b: 1, a: 2, c: 3].keys()")?.to_string(),
        "[b, a, c]"
    );
    assert_eq!(
        engine.eval("[b: 1, a: 2, c: 3].values()")?.to_string(),
        "[1, 2, 3]"
    );
    assert_eq!(
        engine.eval("[x: 1, y: 2].pairs()")?.to_string(),
        "[[x, 1], [y, 2]]"
    );

    Ok(())
}

#[test]
fn test_table_addition_concatenates() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("[1, 2, 3] + [4, 5, 6]")?.to_string(),
        "[1, 2, 3, 4, 5, 6]"
    );
    assert_eq!(
        engine
            .eval("([1, 2, 3] + [4, 5, 6]) == [1, 2, 3, 4, 5, 6]")?
            .to_string(),
        "1"
    );
    assert_eq!(
        engine.eval("[1, a: 1] + [2, b: 2]")?.to_string(),
        "[1, 2, a: 1, b: 2]"
    );

    Ok(())
}

#[test]
fn test_table_equality_is_structural() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("[1, [2]] == [1, [2]]")?.to_string(), "1");
    assert_eq!(engine.eval("[1, 2] == [1]")?.to_string(), "0");
    assert_eq!(engine.eval("[a: 1] == [a: 2]")?.to_string(), "0");

    Ok(())
}

#[test]
fn test_map_filter_sort() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval("[1, 2, 3].map((x) => x * 10)")?.to_string(),
        "[10, 20, 30]"
    );
    assert_eq!(
        engine.eval("[1, 2, 3].filter((x) => x % 2)")?.to_string(),
        "[1, 3]"
    );
    assert_eq!(
        engine.eval("[3, 1, 2].sort()")?.to_string(),
        "[1, 2, 3]"
    );
    assert_eq!(
        engine.eval(r#"["b", "a"].sort()"#)?.to_string(),
        "[a, b]"
    );

    Ok(())
}

#[test]
fn test_statistics() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("[1, 2, 3].sum()")?.to_string(), "6");
    assert_eq!(engine.eval("[1, 2, 3].mean()")?.to_string(), "2");
    assert_eq!(engine.eval("[1, 2, 3].median()")?.to_string(), "2");
    assert_eq!(engine.eval("[1, 2, 3, 4].median()")?.to_string(), "2.5");
    assert_eq!(engine.eval("[2, 2, 2].stdev()")?.to_string(), "0");
    assert_eq!(engine.eval("[1, 2, 3].describe().mean")?.to_string(), "2");
    assert!(engine.eval("[].mean()")?.is_error());

    Ok(())
}

#[test]
fn test_has_consults_methods_too() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#"[a: 1].has("a")"#)?.to_string(), "1");
    assert_eq!(engine.eval(r#"[a: 1].has("b")"#)?.to_string(), "0");
    // Method lookup is part of `get`, so method names count as present.
    assert_eq!(engine.eval(r#"[].has("push")"#)?.to_string(), "1");

    Ok(())
}

#[test]
fn test_destructuring() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval("[a, b] := [1, 2]; a + b")?.to_string(), "3");
    assert_eq!(engine.eval("[x: v] := [x: 10]; v")?.to_string(), "10");
    assert_eq!(engine.eval("[a, b] := [b: 5, 1]; a + b")?.to_string(), "6");
    assert_eq!(
        engine.eval("[[a, b], c] := [[1, 2], 3]; a + b + c")?.to_string(),
        "6"
    );

    Ok(())
}

#[test]
fn test_table_call_goes_through_call_member() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine
            .eval(r#"t := ["_call_": (x) => x * 2]; t(21)"#)?
            .to_string(),
        "42"
    );
    assert_eq!(
        engine.eval("t := []; t(1)")?.to_string(),
        "Error(Runtime Error, call a non-Closure value)"
    );

    Ok(())
}
