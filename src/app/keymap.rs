//! Key mapping for fex.
//!
//! Keys are handled as raw codes (`char`): printable characters as themselves,
//! `<enter>` as `\r`, `<esc>` as ESC, `<del>` as DEL and `<c-x>` as the matching
//! control character. A [Keymap] maps key sequences (the verb part of the raw
//! buffer) to a [Verb], built from the `[keys]` config section.

use crate::config::Keys;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashMap;

pub const ESC: char = '\u{1b}';
pub const DEL: char = '\u{7f}';
pub const ENTER: char = '\r';
pub const TAB: char = '\t';

/// Fixed vocabulary of normal/select mode commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Down,
    Up,
    Top,
    Bottom,
    Open,
    Describe,
    Back,
    CycleSort,
    ToggleSelect,
    ClearSelection,
    Refresh,
    Home,
    SelectMode,
    SearchMode,
    RecursiveSearchMode,
    CommandMode,
    Quit,
}

/// Stores the mapping from key sequence to verb.
#[derive(Debug, Clone)]
pub struct Keymap {
    map: HashMap<Vec<char>, Verb>,
    rejected: Vec<String>,
}

impl Keymap {
    /// Builds the keymap from the config
    #[rustfmt::skip]
    pub fn from_keys(keys: &Keys) -> Self {
        let mut map = HashMap::new();
        let mut rejected = Vec::new();

        macro_rules! bind {
            ($keys:expr, $verb:expr) => {
                bind($keys, $verb, &mut map, &mut rejected);
            };
        }

        use Verb as V;

        bind!(keys.down(),                  V::Down);
        bind!(keys.up(),                    V::Up);
        bind!(keys.top(),                   V::Top);
        bind!(keys.bottom(),                V::Bottom);
        bind!(keys.open(),                  V::Open);
        bind!(keys.describe(),              V::Describe);
        bind!(keys.back(),                  V::Back);
        bind!(keys.cycle_sort(),            V::CycleSort);
        bind!(keys.toggle_select(),         V::ToggleSelect);
        bind!(keys.clear_selection(),       V::ClearSelection);
        bind!(keys.refresh(),               V::Refresh);
        bind!(keys.home(),                  V::Home);
        bind!(keys.select_mode(),           V::SelectMode);
        bind!(keys.search_mode(),           V::SearchMode);
        bind!(keys.recursive_search_mode(), V::RecursiveSearchMode);
        bind!(keys.command_mode(),          V::CommandMode);
        bind!(keys.quit(),                  V::Quit);

        Keymap { map, rejected }
    }

    /// Looks up the verb bound to exactly this key sequence.
    pub fn lookup(&self, verb: &[char]) -> Option<Verb> {
        self.map.get(verb).copied()
    }

    /// Bindings from the config that could not be parsed.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_keys(&Keys::default())
    }
}

/// Parses key notation into raw codes.
///
/// Returns `None` for unknown `<...>` names, unterminated brackets, empty
/// input and sequences starting with a digit (those are repeat counts).
pub fn parse_keys(s: &str) -> Option<Vec<char>> {
    let mut out = Vec::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '<' || s.len() == 1 {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for n in chars.by_ref() {
            if n == '>' {
                closed = true;
                break;
            }
            name.push(n);
        }
        if !closed {
            return None;
        }
        out.push(parse_named(&name)?);
    }

    match out.first() {
        None => None,
        Some(c) if c.is_ascii_digit() => None,
        Some(_) => Some(out),
    }
}

fn parse_named(name: &str) -> Option<char> {
    let lower = name.to_lowercase();
    let code = match lower.as_str() {
        "enter" | "cr" => ENTER,
        "esc" => ESC,
        "space" | "spc" => ' ',
        "tab" => TAB,
        "del" | "bs" | "backspace" => DEL,
        "lt" => '<',
        _ => {
            let rest = lower.strip_prefix("c-").or_else(|| lower.strip_prefix("ctrl-"))?;
            let mut it = rest.chars();
            let c = it.next()?;
            if it.next().is_some() || !c.is_ascii_alphabetic() {
                return None;
            }
            ctrl(c)
        }
    };
    Some(code)
}

/// The control code for an ASCII letter, as the terminal reports Ctrl+letter.
pub fn ctrl(c: char) -> char {
    char::from(c.to_ascii_uppercase() as u8 & 0x1f)
}

/// Translates a key press into its raw code. Releases, repeats and keys
/// without a raw code are dropped.
pub fn key_to_code(key: KeyEvent) -> Option<char> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            c.is_ascii_alphabetic().then(|| ctrl(c))
        }
        KeyCode::Char(c) => Some(c),
        KeyCode::Enter => Some(ENTER),
        KeyCode::Esc => Some(ESC),
        KeyCode::Backspace => Some(DEL),
        KeyCode::Tab => Some(TAB),
        _ => None,
    }
}

/// Renders pending raw codes for the footer echo.
pub fn format_codes(buf: &[char]) -> String {
    let mut out = String::from(" ");
    for &c in buf {
        match c {
            ESC => out.push_str("<esc>"),
            DEL => out.push_str("<del>"),
            ENTER => out.push_str("<enter>"),
            ' ' => out.push_str("<space>"),
            TAB => out.push_str("<tab>"),
            '\u{1}'..='\u{1a}' => {
                out.push_str("C-");
                out.push(char::from(b'A' + c as u8 - 1));
            }
            c => out.push(c),
        }
    }
    out
}

fn bind(
    key_list: &[String],
    verb: Verb,
    map: &mut HashMap<Vec<char>, Verb>,
    rejected: &mut Vec<String>,
) {
    for k in key_list {
        match parse_keys(k) {
            Some(codes) => {
                map.insert(codes, verb);
            }
            None => rejected.push(k.clone()),
        }
    }
}
