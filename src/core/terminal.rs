//! Terminal setup and the event loop for fex.
//!
//! Handles raw mode and the alternate screen, turns crossterm events into
//! [InputEvent]s and drives the draw / read / dispatch cycle until quit.

use crate::app::keymap::key_to_code;
use crate::app::{Controller, Explorer, Flow};
use crate::core::diagnostics::Diagnostics;
use crate::ui::Win;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;

/// One unit of input for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(char),
    Resize,
}

/// Blocking source of input events.
pub trait InputSource {
    fn next_event(&mut self) -> io::Result<InputEvent>;
}

/// Reads key presses and resizes from the terminal.
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_event(&mut self) -> io::Result<InputEvent> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(code) = key_to_code(key) {
                        return Ok(InputEvent::Key(code));
                    }
                }
                Event::Resize(_, _) => return Ok(InputEvent::Resize),
                _ => {}
            }
        }
    }
}

/// Initializes the terminal in raw mode and alternate screen and runs the
/// event loop.
///
/// Blocks until quit or until a fatal error is reported. The terminal is
/// restored before returning, also when the loop failed.
pub fn run_terminal(
    explorer: &mut Explorer,
    controller: &mut Controller,
    win: &mut Win,
    diag: &Diagnostics,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(
        &mut terminal,
        &mut CrosstermInput,
        explorer,
        controller,
        win,
        diag,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    result
}

/// Draws, blocks for input and dispatches it. Returns on quit.
pub fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    source: &mut impl InputSource,
    explorer: &mut Explorer,
    controller: &mut Controller,
    win: &mut Win,
    diag: &Diagnostics,
) -> io::Result<()>
where
    io::Error: From<<B as Backend>::Error>,
{
    let size = terminal.size()?;
    win.resize(size.width, size.height);

    loop {
        if controller.take_repaint() {
            // an external program drew over the screen
            terminal.clear()?;
        }
        if controller.is_resized() {
            let size = terminal.size()?;
            win.resize(size.width, size.height);
        }
        win.set_ui(controller, explorer).draw(terminal)?;

        if controller.read_input(source)?.control(explorer) == Flow::Quit {
            break;
        }
        if let Some(err) = diag.fatal() {
            diag.note(format!("exiting on error: {err}"));
            break;
        }
    }
    Ok(())
}
