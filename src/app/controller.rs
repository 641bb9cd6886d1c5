//! The input controller for fex.
//!
//! [Controller] buffers raw key codes, runs them through [transition] and
//! applies the resulting [Action] to the [Explorer]. Failures are reported to
//! the diagnostics context and the failed action is dropped.

use crate::app::command;
use crate::app::explorer::Explorer;
use crate::app::keymap::{Keymap, format_codes};
use crate::app::mode::{Action, Mode, Motion, transition};
use crate::core::diagnostics::Diagnostics;
use crate::core::error::{CommandError, Error};
use crate::core::proc::Launcher;
use crate::core::terminal::{InputEvent, InputSource};
use crate::utils::get_home;

use std::io;

/// Whether the event loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller {
    raw: Vec<char>,
    mode: Mode,
    message: String,
    resized: bool,
    keymap: Keymap,
    launcher: Launcher,
    diag: Diagnostics,
}

impl Controller {
    pub fn new(keymap: Keymap, launcher: Launcher, diag: Diagnostics) -> Self {
        Self {
            raw: Vec::new(),
            mode: Mode::Normal,
            message: String::new(),
            resized: false,
            keymap,
            launcher,
            diag,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[inline]
    pub fn raw(&self) -> &[char] {
        &self.raw
    }

    /// The one-shot message if one was set by the last dispatch, the mode
    /// status otherwise.
    pub fn status(&self) -> String {
        if self.message.is_empty() {
            self.mode.status()
        } else {
            self.message.clone()
        }
    }

    /// The pending raw buffer in key notation.
    pub fn echo(&self) -> String {
        format_codes(&self.raw)
    }

    /// Whether the last event was a terminal resize.
    #[inline]
    pub fn is_resized(&self) -> bool {
        self.resized
    }

    /// Whether a subprocess ran since the last call.
    pub fn take_repaint(&mut self) -> bool {
        self.launcher.take_repaint()
    }

    /// Blocks for the next key press and appends it to the raw buffer.
    ///
    /// A resize only raises the resize flag; the buffer and mode are kept.
    pub fn read_input(&mut self, source: &mut impl InputSource) -> io::Result<&mut Self> {
        self.resized = false;
        match source.next_event()? {
            InputEvent::Key(code) => {
                self.diag.trace(format!("input: {:?}", code));
                self.raw.push(code);
            }
            InputEvent::Resize => self.resized = true,
        }
        Ok(self)
    }

    /// Dispatches the raw buffer against `explorer`.
    pub fn control(&mut self, explorer: &mut Explorer) -> Flow {
        self.message.clear();
        if self.resized {
            return Flow::Continue;
        }

        let mode = std::mem::take(&mut self.mode);
        let was = std::mem::discriminant(&mode);
        let step = transition(&self.keymap, mode, &self.raw);
        if std::mem::discriminant(&step.mode) != was {
            self.diag.note(format!("mode: {}", step.mode.status()));
        }
        self.mode = step.mode;
        if step.consumed {
            self.raw.clear();
        }

        match self.apply(step.action, explorer) {
            Ok(flow) => flow,
            Err(e) => {
                self.diag.report(e);
                Flow::Continue
            }
        }
    }

    fn apply(&mut self, action: Action, explorer: &mut Explorer) -> Result<Flow, Error> {
        match action {
            Action::None => {}
            Action::Quit => return Ok(Flow::Quit),
            Action::Move { motion, sweep } => {
                let before = explorer.cursor();
                move_cursor(explorer, motion);
                if sweep {
                    let after = explorer.cursor();
                    for pos in before.min(after)..before.max(after) {
                        explorer.toggle_select(pos);
                    }
                }
            }
            Action::Open => self.open(explorer)?,
            Action::Describe => {
                if let Some(entry) = explorer.current_entry() {
                    self.message = match entry.description() {
                        "" => "no description".into(),
                        desc => desc.into(),
                    };
                }
            }
            Action::Back => explorer.go_back()?,
            Action::CycleSort => explorer.cycle_sort(),
            Action::ToggleSelect => {
                explorer.toggle_select(explorer.cursor());
            }
            Action::ClearSelection => explorer.clear_selection(),
            Action::Refresh => explorer.refresh()?,
            Action::Home => {
                let home = get_home().ok_or(CommandError::NoHome)?;
                explorer.change_directory(home)?;
            }
            Action::Filter(pattern) => explorer.filter_by_name(&pattern),
            Action::ClearFilter => explorer.clear_filter(),
            Action::ClearFilterAndReload => {
                explorer.clear_filter();
                explorer.refresh()?;
            }
            Action::SearchRecursive(pattern) => explorer.search_recursive(&pattern)?,
            Action::Execute(line) => {
                self.diag.note(format!("command: {line}"));
                command::execute(&line, explorer, &mut self.launcher)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Opens the selection, or the entry under the cursor when nothing is
    /// selected. Opening a single directory enters it.
    fn open(&mut self, explorer: &mut Explorer) -> Result<(), Error> {
        let selected: Vec<_> = explorer.selected_entries().cloned().collect();
        if !selected.is_empty() {
            for entry in &selected {
                self.launcher.open(entry, explorer.classifier())?;
            }
            return Ok(());
        }

        let Some(entry) = explorer.current_entry().cloned() else {
            return Ok(());
        };
        if let Some(dir) = self.launcher.open(&entry, explorer.classifier())? {
            explorer.change_directory(dir)?;
        }
        Ok(())
    }
}

fn move_cursor(explorer: &mut Explorer, motion: Motion) {
    let target = match motion {
        Motion::Down(n) => explorer.cursor().saturating_add(n),
        Motion::Up(n) => explorer.cursor().saturating_sub(n),
        Motion::Top => 0,
        Motion::Goto(0) => explorer.len().saturating_sub(1),
        Motion::Goto(pos) => pos,
    };
    explorer.set_cursor(target);
}
