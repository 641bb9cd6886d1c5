//! Modal input handling for fex.
//!
//! [transition] is a pure function from the current [Mode] and the pending raw
//! key buffer to the next mode and the [Action] to apply. It never touches the
//! explorer or the terminal, the controller does that with the returned [Step].

use crate::app::keymap::{DEL, ENTER, ESC, Keymap, Verb};

/// The interaction mode. Text modes carry the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Select,
    Search(String),
    RecurSearch(String),
    Command(String),
}

impl Mode {
    /// Status line text for this mode.
    pub fn status(&self) -> String {
        match self {
            Mode::Normal => "Normal".into(),
            Mode::Select => "Select".into(),
            Mode::Search(text) => format!("Search:{text}"),
            Mode::RecurSearch(text) => format!("Recursive Search:{text}"),
            Mode::Command(text) => format!(":{text}"),
        }
    }
}

/// Cursor movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Down(usize),
    Up(usize),
    Top,
    /// Absolute position; 0 means the last entry.
    Goto(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// With `sweep`, every entry passed over has its selection toggled.
    Move { motion: Motion, sweep: bool },
    Open,
    Describe,
    Back,
    CycleSort,
    ToggleSelect,
    ClearSelection,
    Refresh,
    Home,
    Filter(String),
    ClearFilter,
    ClearFilterAndReload,
    SearchRecursive(String),
    Execute(String),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub mode: Mode,
    pub action: Action,
    /// Whether the raw buffer was used up and must be cleared.
    pub consumed: bool,
}

impl Step {
    fn done(mode: Mode, action: Action) -> Self {
        Step {
            mode,
            action,
            consumed: true,
        }
    }

    fn pending(mode: Mode) -> Self {
        Step {
            mode,
            action: Action::None,
            consumed: false,
        }
    }
}

/// Splits the buffer into the leading repeat count and the verb.
///
/// The count saturates instead of overflowing; no digits means 0.
pub fn split_repeat(buf: &[char]) -> (usize, &[char]) {
    let digits = buf.iter().take_while(|c| c.is_ascii_digit()).count();
    let repeat = buf[..digits].iter().fold(0usize, |acc, c| {
        let d = c.to_digit(10).unwrap_or(0) as usize;
        acc.saturating_mul(10).saturating_add(d)
    });
    (repeat, &buf[digits..])
}

fn motion(verb: Verb, repeat: usize) -> Option<Motion> {
    match verb {
        Verb::Down => Some(Motion::Down(repeat.max(1))),
        Verb::Up => Some(Motion::Up(repeat.max(1))),
        Verb::Top => Some(Motion::Top),
        Verb::Bottom => Some(Motion::Goto(repeat)),
        _ => None,
    }
}

pub fn transition(keymap: &Keymap, mode: Mode, buf: &[char]) -> Step {
    match mode {
        Mode::Normal => normal(keymap, buf),
        Mode::Select => select(keymap, buf),
        Mode::Search(text) => text_input(buf, text, Mode::Search),
        Mode::RecurSearch(text) => text_input(buf, text, Mode::RecurSearch),
        Mode::Command(text) => text_input(buf, text, Mode::Command),
    }
}

fn normal(keymap: &Keymap, buf: &[char]) -> Step {
    let (repeat, verb) = split_repeat(buf);

    if verb.contains(&ESC) {
        return Step::done(Mode::Normal, Action::None);
    }
    let Some(v) = keymap.lookup(verb) else {
        return Step::pending(Mode::Normal);
    };

    if let Some(motion) = motion(v, repeat) {
        return Step::done(
            Mode::Normal,
            Action::Move {
                motion,
                sweep: false,
            },
        );
    }

    let (mode, action) = match v {
        Verb::Open => (Mode::Normal, Action::Open),
        Verb::Describe => (Mode::Normal, Action::Describe),
        Verb::Back => (Mode::Normal, Action::Back),
        Verb::CycleSort => (Mode::Normal, Action::CycleSort),
        Verb::ToggleSelect => (Mode::Normal, Action::ToggleSelect),
        Verb::ClearSelection => (Mode::Normal, Action::ClearSelection),
        Verb::Refresh => (Mode::Normal, Action::Refresh),
        Verb::Home => (Mode::Normal, Action::Home),
        Verb::SelectMode => (Mode::Select, Action::None),
        Verb::SearchMode => (Mode::Search(String::new()), Action::None),
        Verb::RecursiveSearchMode => (Mode::RecurSearch(String::new()), Action::None),
        Verb::CommandMode => (Mode::Command(String::new()), Action::None),
        Verb::Quit => (Mode::Normal, Action::Quit),
        Verb::Down | Verb::Up | Verb::Top | Verb::Bottom => (Mode::Normal, Action::None),
    };
    Step::done(mode, action)
}

fn select(keymap: &Keymap, buf: &[char]) -> Step {
    let (repeat, verb) = split_repeat(buf);
    let bound = keymap.lookup(verb);

    if bound == Some(Verb::Quit) {
        return Step::done(Mode::Select, Action::Quit);
    }
    if verb.contains(&ESC) {
        return Step::done(Mode::Normal, Action::None);
    }
    match bound {
        Some(Verb::Open) => Step::done(Mode::Select, Action::Open),
        Some(v) => match motion(v, repeat) {
            Some(motion) => Step::done(Mode::Select, Action::Move { motion, sweep: true }),
            None => Step::pending(Mode::Select),
        },
        None => Step::pending(Mode::Select),
    }
}

/// Shared line editing for the search, recursive search and command modes.
fn text_input(buf: &[char], mut text: String, wrap: fn(String) -> Mode) -> Step {
    let probe = wrap(String::new());

    match buf.first() {
        None => Step::done(wrap(text), Action::None),
        Some(&ESC) => {
            let action = match probe {
                Mode::Search(_) => Action::ClearFilter,
                Mode::RecurSearch(_) => Action::ClearFilterAndReload,
                _ => Action::None,
            };
            Step::done(Mode::Normal, action)
        }
        Some(&ENTER) => {
            let action = match probe {
                Mode::RecurSearch(_) => Action::SearchRecursive(text),
                Mode::Command(_) => Action::Execute(text),
                _ => Action::None,
            };
            Step::done(Mode::Normal, action)
        }
        Some(&DEL) => {
            let changed = text.pop().is_some();
            live_update(wrap, text, changed)
        }
        Some(_) => {
            let before = text.len();
            text.extend(buf.iter().filter(|c| !c.is_control()));
            let changed = text.len() != before;
            live_update(wrap, text, changed)
        }
    }
}

fn live_update(wrap: fn(String) -> Mode, text: String, changed: bool) -> Step {
    let mode = wrap(text);
    let action = match &mode {
        Mode::Search(text) if changed => Action::Filter(text.clone()),
        _ => Action::None,
    };
    Step::done(mode, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::ctrl;

    fn run(mode: Mode, keys: &str) -> Step {
        let buf: Vec<char> = keys.chars().collect();
        transition(&Keymap::default(), mode, &buf)
    }

    fn moved(motion: Motion, sweep: bool) -> Action {
        Action::Move { motion, sweep }
    }

    #[test]
    fn repeat_count_and_verb() {
        let buf: Vec<char> = "12gg".chars().collect();
        assert_eq!(split_repeat(&buf), (12, &['g', 'g'][..]));

        let huge: Vec<char> = "99999999999999999999999j".chars().collect();
        assert_eq!(split_repeat(&huge).0, usize::MAX);

        assert_eq!(split_repeat(&[]), (0, &[][..]));
    }

    #[test]
    fn normal_movement() {
        assert_eq!(run(Mode::Normal, "j").action, moved(Motion::Down(1), false));
        assert_eq!(run(Mode::Normal, "5k").action, moved(Motion::Up(5), false));
        assert_eq!(run(Mode::Normal, "G").action, moved(Motion::Goto(0), false));
        assert_eq!(run(Mode::Normal, "7G").action, moved(Motion::Goto(7), false));
        assert_eq!(run(Mode::Normal, "gg").action, moved(Motion::Top, false));
    }

    #[test]
    fn normal_pending_and_cancel() {
        let step = run(Mode::Normal, "g");
        assert!(!step.consumed);
        assert_eq!(step.mode, Mode::Normal);

        let step = run(Mode::Normal, "3");
        assert!(!step.consumed, "a bare count waits for its verb");

        let step = run(Mode::Normal, "3z\u{1b}");
        assert!(step.consumed);
        assert_eq!(step.action, Action::None);
    }

    #[test]
    fn normal_mode_changes() {
        assert_eq!(run(Mode::Normal, "v").mode, Mode::Select);
        assert_eq!(run(Mode::Normal, "/").mode, Mode::Search(String::new()));
        assert_eq!(run(Mode::Normal, "?").mode, Mode::RecurSearch(String::new()));
        assert_eq!(run(Mode::Normal, ":").mode, Mode::Command(String::new()));
        assert_eq!(run(Mode::Normal, "q").action, Action::Quit);
        assert_eq!(run(Mode::Normal, "\r").action, Action::Open);
    }

    #[test]
    fn select_mode_sweeps() {
        let step = run(Mode::Select, "3j");
        assert_eq!(step.mode, Mode::Select);
        assert_eq!(step.action, moved(Motion::Down(3), true));

        assert_eq!(run(Mode::Select, "\u{1b}").mode, Mode::Normal);
        assert_eq!(run(Mode::Select, "q").action, Action::Quit);
        assert_eq!(run(Mode::Select, "\r").action, Action::Open);

        let step = run(Mode::Select, "x");
        assert!(!step.consumed, "sort is not available while selecting");
    }

    #[test]
    fn search_filters_live() {
        let step = run(Mode::Search("ab".into()), "c");
        assert_eq!(step.mode, Mode::Search("abc".into()));
        assert_eq!(step.action, Action::Filter("abc".into()));

        let step = run(Mode::Search("ab".into()), "\u{7f}");
        assert_eq!(step.action, Action::Filter("a".into()));

        let step = run(Mode::Search(String::new()), "\u{7f}");
        assert_eq!(step.action, Action::None, "nothing to delete");

        let step = run(Mode::Search("ab".into()), "\u{1b}");
        assert_eq!(step.mode, Mode::Normal);
        assert_eq!(step.action, Action::ClearFilter);

        let step = run(Mode::Search("ab".into()), "\r");
        assert_eq!(step.mode, Mode::Normal);
        assert_eq!(step.action, Action::None);
    }

    #[test]
    fn recursive_search_fires_on_confirm() {
        let step = run(Mode::RecurSearch("ma".into()), "i");
        assert_eq!(step.action, Action::None);
        assert_eq!(step.mode, Mode::RecurSearch("mai".into()));

        let step = run(Mode::RecurSearch("main".into()), "\r");
        assert_eq!(step.action, Action::SearchRecursive("main".into()));

        let step = run(Mode::RecurSearch("main".into()), "\u{1b}");
        assert_eq!(step.action, Action::ClearFilterAndReload);
    }

    #[test]
    fn command_line() {
        let step = run(Mode::Command("cd".into()), " ");
        assert_eq!(step.mode, Mode::Command("cd ".into()));
        assert_eq!(step.action, Action::None);

        let step = run(Mode::Command("cd /tmp".into()), "\r");
        assert_eq!(step.action, Action::Execute("cd /tmp".into()));

        let buf = [ctrl('a')];
        let step = transition(&Keymap::default(), Mode::Command("x".into()), &buf);
        assert_eq!(step.mode, Mode::Command("x".into()), "control codes are not text");
    }

    #[test]
    fn status_text() {
        assert_eq!(Mode::Normal.status(), "Normal");
        assert_eq!(Mode::Search("a".into()).status(), "Search:a");
        assert_eq!(Mode::RecurSearch("b".into()).status(), "Recursive Search:b");
        assert_eq!(Mode::Command("cd".into()).status(), ":cd");
    }
}
