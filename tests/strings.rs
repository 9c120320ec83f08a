use teeny::{Engine, ScriptError};

#[test]
fn test_literals_and_escapes() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""hello""#)?.to_string(), "hello");
    assert_eq!(engine.eval(r#"'hello'"#)?.to_string(), "hello");
    assert_eq!(engine.eval(r#""a\tb""#)?.to_string(), "a\tb");
    assert_eq!(engine.eval(r#""line\nbreak""#)?.to_string(), "line\nbreak");
    assert_eq!(engine.eval(r#""""#)?.to_string(), "");

    Ok(())
}

#[test]
fn test_interpolation() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#"name := 1; "a{name}b""#)?.to_string(), "a1b");
    assert_eq!(engine.eval(r#""sum: {1 + 2}""#)?.to_string(), "sum: 3");
    assert_eq!(
        engine.eval(r#"x := 2; "{x}{x * 2}{x * 3}""#)?.to_string(),
        "246"
    );
    // Escaped braces stay literal.
    assert_eq!(engine.eval(r#""a\{b\}c""#)?.to_string(), "a{b}c");
    // Any value renders through its printed form.
    assert_eq!(
        engine.eval(r#"t := [1, 2]; "t = {t}""#)?.to_string(),
        "t = [1, 2]"
    );

    Ok(())
}

#[test]
fn test_concat_and_repeat() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""ab" + "cd""#)?.to_string(), "abcd");
    assert_eq!(engine.eval(r#""ab" * 3"#)?.to_string(), "ababab");
    assert!(engine.eval(r#""ab" + 1"#)?.is_error());

    Ok(())
}

#[test]
fn test_length_and_slice() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""a".len()"#)?.to_string(), "1");
    assert_eq!(engine.eval(r#""hello".len()"#)?.to_string(), "5");
    assert_eq!(engine.eval(r#""abcde".slice(1, 3)"#)?.to_string(), "bcd");
    assert_eq!(engine.eval(r#""abcde".slice(0, -1)"#)?.to_string(), "abcde");
    assert_eq!(engine.eval(r#""abcde".slice(3, 1)"#)?.to_string(), "");

    Ok(())
}

#[test]
fn test_indexing() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""abc"[1]"#)?.to_string(), "b");
    assert_eq!(engine.eval(r#""abc"[-1]"#)?.to_string(), "c");
    assert_eq!(engine.eval(r#""abc"[9]"#)?.to_string(), "nil");
    assert_eq!(engine.eval(r#"s := "abc"; s[1] = "X"; s"#)?.to_string(), "aXc");

    Ok(())
}

#[test]
fn test_case_and_trim() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""aBc".upper()"#)?.to_string(), "ABC");
    assert_eq!(engine.eval(r#""aBc".lower()"#)?.to_string(), "abc");
    assert_eq!(engine.eval(r#""hello WORLD".cap()"#)?.to_string(), "Hello world");
    assert_eq!(engine.eval(r#""  pad  ".trim()"#)?.to_string(), "pad");

    Ok(())
}

#[test]
fn test_find_split_join() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(engine.eval(r#""hello".find("ll")"#)?.to_string(), "2");
    assert_eq!(engine.eval(r#""hello".find("zz")"#)?.to_string(), "-1");
    assert_eq!(
        engine.eval(r#""a,b,c".split(",")"#)?.to_string(),
        "[a, b, c]"
    );
    assert_eq!(
        engine.eval(r#""-".join(["a", "b", "c"])"#)?.to_string(),
        "a-b-c"
    );

    Ok(())
}

#[test]
fn test_format() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval(r#""{} + {} = {}".format([1, 2, 3])"#)?.to_string(),
        "1 + 2 = 3"
    );
    assert_eq!(
        engine
            .eval(r#""hello {name}!".format([name: "world"])"#)?
            .to_string(),
        "hello world!"
    );
    assert_eq!(
        engine.eval(r#""{{}}".format([])"#)?.to_string(),
        "{}"
    );

    Ok(())
}
