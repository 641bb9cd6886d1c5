//! main.rs
//! Entry point for fex

use fex_tui::app::{Controller, Explorer, ExplorerOptions, Keymap};
use fex_tui::config::Config;
use fex_tui::core::Diagnostics;
use fex_tui::core::proc::{Launcher, SystemShell, TrashTarget};
use fex_tui::core::terminal;
use fex_tui::ui::Win;
use fex_tui::utils::cli::{CliAction, handle_args};
use fex_tui::utils::expand_home_path;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn main() -> std::io::Result<()> {
    let action = handle_args();

    let start = match action {
        CliAction::Exit => return Ok(()),
        CliAction::RunApp => PathBuf::from("."),
        CliAction::RunAppAtPath(path_arg) => expand_home_path(&path_arg),
    };

    let config = Config::load();
    let general = config.general();

    if let Some(path) = general.log_file() {
        init_log_file(path);
    }

    let diag = Diagnostics::new(general.logging(), general.force_exit_on_error());
    install_panic_hook(general.print_log_on_crash().then(|| diag.clone()));

    let explorer = Explorer::new(&start, ExplorerOptions::from_config(&config, &diag), diag.clone());
    let mut explorer = match explorer {
        Ok(ex) => ex,
        Err(e) => {
            eprintln!("\n[fex] Error: {e}");
            std::process::exit(1);
        }
    };

    let keymap = Keymap::from_keys(config.keys());
    for binding in keymap.rejected() {
        eprintln!("[fex] Warning: ignoring invalid key binding {binding:?}");
        diag.note(format!("rejected binding: {binding}"));
    }

    if !config.programs().editor_exists() {
        eprintln!(
            "[fex] Warning: editor {:?} not found in PATH",
            config.programs().editor()
        );
        diag.note(format!("editor not found: {}", config.programs().editor()));
    }

    let trash = if general.system_trash() {
        TrashTarget::System
    } else {
        TrashTarget::Dir(general.trash_dir().clone())
    };
    let launcher = Launcher::new(Box::new(SystemShell::new(true)), config.programs(), trash);

    let mut controller = Controller::new(keymap, launcher, diag.clone());
    let mut win = Win::new(0, 0, config.display(), diag.clone());

    let result = terminal::run_terminal(&mut explorer, &mut controller, &mut win, &diag);

    let mut out: Box<dyn Write> = if general.print_log_on_exit() {
        Box::new(std::io::stdout())
    } else {
        Box::new(std::io::stderr())
    };
    let fatal = diag.finish(general.print_log_on_exit(), &mut out)?;
    result?;

    if let Some(err) = fatal {
        eprintln!("[fex] Error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

/// Sends `tracing` events to `path`. Failures only print a warning.
fn init_log_file(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[fex] Warning: cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Restores the terminal before printing a panic, then dumps the trail when
/// one is passed.
fn install_panic_hook(trail: Option<Diagnostics>) {
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        eprintln!("\n[fex] Error occurred: {}", info);

        if let Some(diag) = &trail {
            let _ = diag.dump(&mut std::io::stderr());
        }

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));
}
