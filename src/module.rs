//! Module resolution for `import`.
//!
//! `import("name")` searches, in order: `./name`, `./name/index.ty`,
//! `<global>/name`, `<global>/name/index.ty`, where `./` is the engine's
//! base path and `<global>` the per-user package directory. The resolved
//! file runs in a fresh global environment and the value bound to `export`
//! is returned. Resolved modules are cached by absolute path, so re-imports
//! return the same value.

use crate::engine::KEYWORD_EXPORT;
use crate::{Engine, Value};
use std::path::PathBuf;

/// The extension of Teeny module sources.
pub const TEENY_SCRIPT_EXTENSION: &str = "ty";

/// Resolve a module name to an existing file, or `None`.
fn resolve(engine: &Engine, name: &str) -> Option<PathBuf> {
    let index = format!("index.{}", TEENY_SCRIPT_EXTENSION);
    let candidates = [
        engine.base_path().join(name),
        engine.base_path().join(name).join(&index),
        engine.global_lib_path().join(name),
        engine.global_lib_path().join(name).join(&index),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

/// Load a module by name, consulting the engine's path-keyed cache first.
pub(crate) fn import(engine: &Engine, name: &str) -> Value {
    let Some(path) = resolve(engine, name) else {
        return Value::error("Import Error", format!("Module {} not found", name));
    };
    let path = path.canonicalize().unwrap_or(path);

    if let Some(cached) = engine.modules.borrow().get(&path) {
        return cached.clone();
    }

    tracing::debug!(module = name, path = %path.display(), "loading module");
    let exported = load(engine, &path);
    engine
        .modules
        .borrow_mut()
        .insert(path, exported.clone());
    exported
}

/// Load a module's raw text instead of running it.
pub(crate) fn import_raw(engine: &Engine, name: &str) -> Value {
    let Some(path) = resolve(engine, name) else {
        return Value::error("Import Error", format!("Module {} not found", name));
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => Value::string(text),
        Err(error) => Value::error("Import Error", error.to_string()),
    }
}

fn load(engine: &Engine, path: &PathBuf) -> Value {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => return Value::error("Import Error", error.to_string()),
    };

    // A module runs in its own fresh global environment; whatever it binds
    // to `export` is its public value.
    let module_env = engine.new_env();
    match engine.eval_with_env(&module_env, &source) {
        Ok(result) if result.is_error() => result,
        Ok(_) => {
            let exported = module_env.borrow().read(KEYWORD_EXPORT);
            exported.unwrap_or(Value::Nil)
        }
        Err(error) => Value::error("Import Error", error.to_string()),
    }
}
