//! Command-line argument parsing and help for fex.
//!
//! This module handles all CLI flag parsing used for config initialization and help.
//!
//! When invoked with no args/flags (fex), fex simply opens the working directory

use crate::config::Config;

#[derive(Debug, PartialEq)]
pub enum CliAction {
    RunApp,
    RunAppAtPath(String),
    Exit,
}

pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args)
}

fn parse_args(args: &[String]) -> CliAction {
    let Some(arg) = args.first() else {
        return CliAction::RunApp;
    };

    if args.len() > 1 {
        eprintln!("Error: fex accepts only one argument at a time.");
        eprintln!("Usage: fex [PATH] or fex [OPTION]");
        return CliAction::Exit;
    }

    match arg.as_str() {
        "--version" | "-v" => {
            print_version();
            CliAction::Exit
        }
        "-h" | "--help" => {
            print_help();
            CliAction::Exit
        }
        "--keybinds" | "--keys" => {
            print_keybinds();
            CliAction::Exit
        }
        "--init" => {
            if let Err(e) = Config::generate_default(&Config::default_path()) {
                eprintln!("Error: {}", e);
            }
            CliAction::Exit
        }
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliAction::RunAppAtPath(arg.to_string())
        }
        arg => {
            eprintln!("Unknown argument: {}", arg);
            eprintln!("Try --help for available options");
            CliAction::Exit
        }
    }
}

fn print_version() {
    println!("fex {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"fex - A modal terminal file explorer with vim-style keys

USAGE:
  fex [PATH]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --init              Generate the default configuration
      --keybinds          Display all the default keybinds
  -h, --help              Print help information
  -v, --version           Display the current installed version of fex

CONFIG:
  ~/.config/fex/fex.toml
"#
    );
}

const KEYBINDS_TEXT: &str = r##"
=========================
 Key Bindings
=========================
Normal mode ([N] = optional repeat count)
  [N]j / [N]k        Move down / up
  gg                 Go to top
  [N]G               Go to entry N, or the last entry
  <enter>            Open selected entries, or the entry under the cursor
  d                  Show the file description
  b                  Go back in history
  x                  Cycle sort mode
  s / S              Toggle selection / clear selection
  R                  Refresh
  ~                  Go to the home directory
  v                  Select mode (movement toggles the swept range)
  /                  Search (live filter; prefix "r:" for regex)
  ?                  Recursive search (runs on <enter>)
  :                  Command line
  q                  Quit
  <esc>              Clear pending keys / leave select mode

Commands
  :cd <dir>          Change directory
  :rm                Move selection to the trash
  :mv <dest>         Move selection to <dest>
  :cwd               Go to the working directory fex was started from
  :opendir           Open the current directory in the system file manager

  Syntax Reference (for [keys] in fex.toml):
    Plain characters, "gg", "<enter>", "<esc>", "<space>", "<tab>", "<del>", "<c-x>"
    Sequences may not start with a digit.
"##;

fn print_keybinds() {
    println!("{}", KEYBINDS_TEXT);
}
