//! Command line (`:`) parsing and execution.
//!
//! The line is split shell-style: an unescaped space separates arguments and a
//! backslash escapes the next character, so `cd foo\ bar` has the single
//! argument `foo bar`.

use crate::app::explorer::Explorer;
use crate::core::error::{CommandError, Error};
use crate::core::proc::Launcher;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
}

/// Splits `line` into tokens. Returns `None` for a blank line.
pub fn parse(line: &str) -> Option<CommandLine> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ' ' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    let mut tokens = tokens.into_iter();
    let name = tokens.next()?;
    Some(CommandLine {
        name,
        args: tokens.collect(),
    })
}

fn expect_args(cmd: &CommandLine, expected: usize) -> Result<(), CommandError> {
    if cmd.args.len() == expected {
        Ok(())
    } else {
        Err(CommandError::ArgCount {
            cmd: cmd.name.clone(),
            expected,
            got: cmd.args.len(),
        })
    }
}

/// Parses and runs a command line against the explorer.
///
/// Argument and selection checks happen before anything is touched, so a
/// rejected command changes nothing.
pub fn execute(line: &str, explorer: &mut Explorer, launcher: &mut Launcher) -> Result<(), Error> {
    let Some(cmd) = parse(line) else {
        return Ok(());
    };

    match cmd.name.as_str() {
        "cd" => {
            expect_args(&cmd, 1)?;
            explorer.change_directory(&cmd.args[0])?;
        }
        "rm" => {
            expect_args(&cmd, 0)?;
            let paths = selection(&cmd, explorer)?;
            launcher.trash(&paths, explorer.cwd())?;
            explorer.refresh()?;
        }
        "mv" => {
            expect_args(&cmd, 1)?;
            let paths = selection(&cmd, explorer)?;
            launcher.move_paths(&paths, &cmd.args[0], explorer.cwd())?;
            explorer.refresh()?;
        }
        "cwd" => {
            expect_args(&cmd, 0)?;
            let dir = launcher
                .working_dir()
                .map_err(|e| crate::core::error::PathError::new(".", e))?;
            explorer.change_directory(dir)?;
        }
        "opendir" => {
            expect_args(&cmd, 0)?;
            launcher.open_dir(explorer.cwd())?;
        }
        _ => return Err(CommandError::Unknown(cmd.name).into()),
    }
    Ok(())
}

fn selection(
    cmd: &CommandLine,
    explorer: &Explorer,
) -> Result<Vec<std::path::PathBuf>, CommandError> {
    let paths = explorer.selected_paths();
    if paths.is_empty() {
        return Err(CommandError::EmptySelection(cmd.name.clone()));
    }
    Ok(paths)
}
