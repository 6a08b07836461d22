//! Entry point: a zero-or-one-argument CLI — run a script file if one is
//! given, otherwise start the interactive REPL. No `clap`: arguments are
//! parsed from `std::env::args` by hand.

use std::env::{args, current_exe, var};

use rlogo::error::{self, LogoError};
use rlogo::Interpreter;

/// Directory to search for `.lg` library files, overridden by `RLOGO_LIB_PATH`.
fn lib_directory() -> error::Result<String> {
    if let Ok(lib_path) = var("RLOGO_LIB_PATH") {
        return Ok(lib_path);
    }

    match current_exe() {
        Ok(exe_path) => match exe_path.parent() {
            Some(directory) => match directory.to_str() {
                Some(dir_str) => Ok(dir_str.to_string()),
                None => Err(LogoError::new(
                    error::ErrorCode::FileSystem,
                    None,
                    "executable directory path includes invalid characters".to_string(),
                )),
            },
            None => Err(LogoError::new(
                error::ErrorCode::FileSystem,
                None,
                "could not get the directory of the running executable".to_string(),
            )),
        },
        Err(err) => Err(LogoError::new(
            error::ErrorCode::FileSystem,
            None,
            format!("could not get the current executable path: {}", err),
        )),
    }
}

/// Load `startup.lg` from the library directory if one happens to be
/// present; a crate with no bundled standard library has nothing to load
/// most of the time, so a missing file is not an error.
fn run_optional_startup_file(interp: &mut Interpreter, lib_dir: &str) -> error::Result<()> {
    let path = format!("{}/startup.lg", lib_dir);
    match std::fs::read_to_string(&path) {
        Ok(text) => interp.run_source(&path, &text),
        Err(_) => Ok(()),
    }
}

fn main() -> error::Result<()> {
    let mut interp = Interpreter::new();

    let lib_dir = lib_directory()?;
    run_optional_startup_file(&mut interp, &lib_dir)?;

    let cli_args: Vec<String> = args().collect();

    if cli_args.len() >= 2 {
        let path = &cli_args[1];
        let text = std::fs::read_to_string(path)?;
        interp.run_source(path, &text)
    } else {
        interp.run_repl()
    }
}
