mod args;
mod repl;

use anyhow::{bail, Context, Result};
use args::{Args, Command};
use clap::Parser;
use std::path::{Path, PathBuf};
use teeny::Engine;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Some(Command::Install { dir }) => install(dir.unwrap_or_else(|| PathBuf::from("."))),
        None => match args.script {
            Some(script) => run_file(&script, args.script_args),
            None => repl::run(),
        },
    }
}

fn run_file(script: &Path, script_args: Vec<String>) -> Result<()> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("cannot read {}", script.display()))?;

    let engine = Engine::new();
    let resolved = script.canonicalize().unwrap_or_else(|_| script.to_path_buf());
    if let Some(parent) = resolved.parent() {
        engine.set_base_path(parent);
    }
    let mut argv = vec![script.display().to_string().into()];
    argv.extend(script_args.into_iter().map(Into::into));
    engine.set_argv(argv);

    match engine.eval(&source) {
        Ok(value) if value.is_error() => {
            eprintln!("{}", value);
            std::process::exit(1);
        }
        Ok(_) => Ok(()),
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}

/// `teeny install <dir>` — copy the package into the global package path.
fn install(dir: PathBuf) -> Result<()> {
    if !dir.is_dir() {
        bail!("Module didn't exists or is not a folder");
    }
    let source = dir.canonicalize().context("cannot resolve module directory")?;
    let name = source
        .file_name()
        .context("module directory has no name")?
        .to_owned();

    let destination = Engine::new().global_lib_path().join(&name);
    copy_tree(&source, &destination)
        .with_context(|| format!("cannot install into {}", destination.display()))?;

    println!("Module {} installed successfully.", name.to_string_lossy());
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
