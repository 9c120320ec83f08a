use teeny::{Engine, ScriptError};

fn engine_in(dir: &std::path::Path) -> Engine {
    let engine = Engine::new();
    engine.set_base_path(dir);
    engine
}

#[test]
fn test_write_and_read_text() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(r#"fs.writeText("out.txt", "hello"); fs.readText("out.txt")"#)?
            .to_string(),
        "hello"
    );
    assert_eq!(
        engine
            .eval(r#"fs.writeText("out.txt", " again", append = 1); fs.readText("out.txt")"#)?
            .to_string(),
        "hello again"
    );

    Ok(())
}

#[test]
fn test_read_missing_file_is_an_io_error() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let result = engine.eval(r#"fs.readText("missing.txt")"#)?;
    assert!(result.is_error());
    assert_eq!(result.get_member(&teeny::Value::string("type")).to_string(), "IOError");

    Ok(())
}

#[test]
fn test_lines_round_trip() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(r#"fs.writeLines("lines.txt", ["a", "b", "c"]); fs.readLines("lines.txt")"#)?
            .to_string(),
        "[a, b, c]"
    );

    Ok(())
}

#[test]
fn test_json_file_round_trip() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(
                r#"fs.writeJson("data.json", [x: 1, y: [2, 3]])
                   t := fs.readJson("data.json")
                   t == [x: 1, y: [2, 3]]"#
            )?
            .to_string(),
        "1"
    );

    Ok(())
}

#[test]
fn test_directory_operations() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(engine.eval(r#"fs.exists("sub")"#)?.to_string(), "0");
    assert_eq!(
        engine
            .eval(r#"fs.mkdir("sub"); [fs.exists("sub"), fs.isDir("sub"), fs.isFile("sub")]"#)?
            .to_string(),
        "[1, 1, 0]"
    );
    assert_eq!(
        engine.eval(r#"fs.rmdir("sub"); fs.exists("sub")"#)?.to_string(),
        "0"
    );

    Ok(())
}

#[test]
fn test_list_and_find_files() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.log"), "").unwrap();
    std::fs::write(dir.path().join("c.txt"), "").unwrap();

    let engine = engine_in(dir.path());
    assert_eq!(
        engine.eval(r#"fs.listDir(".")"#)?.to_string(),
        "[a.txt, b.log, c.txt]"
    );
    assert_eq!(
        engine
            .eval(r#"fs.findFiles(".", (name) => name =~ `\.txt$`)"#)?
            .to_string(),
        "[a.txt, c.txt]"
    );

    Ok(())
}

#[test]
fn test_copy_move_and_size() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(
                r#"fs.writeText("src.txt", "12345")
                   fs.copy("src.txt", "dup.txt")
                   fs.move("dup.txt", "moved.txt")
                   [fs.fileSize("moved.txt"), fs.exists("dup.txt")]"#
            )?
            .to_string(),
        "[5, 0]"
    );

    Ok(())
}

#[test]
fn test_env_store() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(r#"os.setEnv("TOKEN", "abc"); os.getEnv("TOKEN")"#)?
            .to_string(),
        "abc"
    );
    assert_eq!(
        engine
            .eval(r#"os.setEnv("TOKEN", "xyz"); os.getEnv("TOKEN")"#)?
            .to_string(),
        "xyz"
    );
    assert_eq!(engine.eval(r#"os.getEnv("MISSING")"#)?.to_string(), "nil");

    Ok(())
}

#[test]
fn test_os_run_captures_stdout() -> Result<(), ScriptError> {
    let engine = Engine::new();

    assert_eq!(
        engine.eval(r#"os.run("echo hi").trim()"#)?.to_string(),
        "hi"
    );
    assert_eq!(engine.eval("type(os.platform())")?.to_string(), "string");

    Ok(())
}

#[test]
fn test_sql_round_trip() -> Result<(), ScriptError> {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    assert_eq!(
        engine
            .eval(
                r#"sql.init("test.db")
                   sql.execute("CREATE TABLE people (id INTEGER, name TEXT)")
                   sql.execute("INSERT INTO people VALUES (1, 'ada')")
                   sql.execute("INSERT INTO people VALUES (2, 'bob')")
                   sql.execute("SELECT * FROM people ORDER BY id")"#
            )?
            .to_string(),
        "(1, 'ada')\n(2, 'bob')"
    );

    Ok(())
}
