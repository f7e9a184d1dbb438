#![forbid(unsafe_code)]

//! Key events and the input-sequence table.
//!
//! A [`Keymap`] pairs multi-byte input sequences with [`KeyCode`]s. It is
//! assembled from the terminal's key capabilities (`kcuu1`, `kf1`, ...) and
//! a default mix-in of common VT/ANSI sequences and control characters, then
//! ordered longest-first so that resolution always prefers the longest
//! sequence that prefixes the input.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;

/// Symbolic key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    /// Shift+Tab.
    BackTab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F12).
    F(u8),
    Find,
    Select,
}

impl KeyCode {
    /// Conventional `KEY_*` name, as curses spells it.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::Enter => Cow::Borrowed("KEY_ENTER"),
            Self::Escape => Cow::Borrowed("KEY_ESCAPE"),
            Self::Backspace => Cow::Borrowed("KEY_BACKSPACE"),
            Self::Tab => Cow::Borrowed("KEY_TAB"),
            Self::BackTab => Cow::Borrowed("KEY_BTAB"),
            Self::Delete => Cow::Borrowed("KEY_DELETE"),
            Self::Insert => Cow::Borrowed("KEY_INSERT"),
            Self::Home => Cow::Borrowed("KEY_HOME"),
            Self::End => Cow::Borrowed("KEY_END"),
            Self::PageUp => Cow::Borrowed("KEY_PGUP"),
            Self::PageDown => Cow::Borrowed("KEY_PGDOWN"),
            Self::Up => Cow::Borrowed("KEY_UP"),
            Self::Down => Cow::Borrowed("KEY_DOWN"),
            Self::Left => Cow::Borrowed("KEY_LEFT"),
            Self::Right => Cow::Borrowed("KEY_RIGHT"),
            Self::F(n) => Cow::Owned(format!("KEY_F{n}")),
            Self::Find => Cow::Borrowed("KEY_FIND"),
            Self::Select => Cow::Borrowed("KEY_SELECT"),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One decoded keystroke.
///
/// An empty event (no text, no code) means no key arrived before the
/// timeout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    raw_text: String,
    code: Option<KeyCode>,
}

impl KeyEvent {
    /// The "no key" event.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            raw_text: String::new(),
            code: None,
        }
    }

    /// A plain character.
    #[must_use]
    pub fn literal(ch: char) -> Self {
        Self {
            raw_text: ch.to_string(),
            code: None,
        }
    }

    /// A recognized multi-byte sequence.
    #[must_use]
    pub fn sequence(raw_text: impl Into<String>, code: KeyCode) -> Self {
        Self {
            raw_text: raw_text.into(),
            code: Some(code),
        }
    }

    /// Decoded text consumed by this event.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn is_sequence(&self) -> bool {
        self.code.is_some()
    }

    pub fn code(&self) -> Option<KeyCode> {
        self.code
    }

    /// `KEY_*` name paired with [`code`](Self::code).
    pub fn name(&self) -> Option<Cow<'static, str>> {
        self.code.map(|code| code.name())
    }

    /// Whether this is the "no key" event.
    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty()
    }

    /// Length in bytes of [`raw_text`](Self::raw_text).
    pub fn len(&self) -> usize {
        self.raw_text.len()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

/// Key capabilities consulted in the terminal's database.
pub const KEY_CAPABILITIES: &[(&str, KeyCode)] = &[
    ("kcuu1", KeyCode::Up),
    ("kcud1", KeyCode::Down),
    ("kcub1", KeyCode::Left),
    ("kcuf1", KeyCode::Right),
    ("khome", KeyCode::Home),
    ("kend", KeyCode::End),
    ("kich1", KeyCode::Insert),
    ("kdch1", KeyCode::Delete),
    ("knp", KeyCode::PageDown),
    ("kpp", KeyCode::PageUp),
    ("kbs", KeyCode::Backspace),
    ("kent", KeyCode::Enter),
    ("kcbt", KeyCode::BackTab),
    ("kf1", KeyCode::F(1)),
    ("kf2", KeyCode::F(2)),
    ("kf3", KeyCode::F(3)),
    ("kf4", KeyCode::F(4)),
    ("kf5", KeyCode::F(5)),
    ("kf6", KeyCode::F(6)),
    ("kf7", KeyCode::F(7)),
    ("kf8", KeyCode::F(8)),
    ("kf9", KeyCode::F(9)),
    ("kf10", KeyCode::F(10)),
    ("kf11", KeyCode::F(11)),
    ("kf12", KeyCode::F(12)),
];

/// Sequences recognized on every terminal. These override the database.
pub const DEFAULT_SEQUENCES: &[(&str, KeyCode)] = &[
    ("\n", KeyCode::Enter),
    ("\r", KeyCode::Enter),
    ("\x08", KeyCode::Backspace),
    ("\t", KeyCode::Tab),
    ("\x1b", KeyCode::Escape),
    ("\x7f", KeyCode::Backspace),
    ("\x1b[A", KeyCode::Up),
    ("\x1b[B", KeyCode::Down),
    ("\x1b[C", KeyCode::Right),
    ("\x1b[D", KeyCode::Left),
    ("\x1b[F", KeyCode::End),
    ("\x1b[H", KeyCode::Home),
    ("\x1b[K", KeyCode::End),
    ("\x1b[U", KeyCode::PageDown),
    ("\x1b[V", KeyCode::PageUp),
    ("\x1b[Z", KeyCode::BackTab),
    ("\x1bOM", KeyCode::Enter),
    ("\x1b[1~", KeyCode::Find),
    ("\x1b[2~", KeyCode::Insert),
    ("\x1b[3~", KeyCode::Delete),
    ("\x1b[4~", KeyCode::Select),
    ("\x1b[5~", KeyCode::PageUp),
    ("\x1b[6~", KeyCode::PageDown),
    ("\x1b[7~", KeyCode::Home),
    ("\x1b[8~", KeyCode::End),
    ("\x1b[OA", KeyCode::Up),
    ("\x1b[OB", KeyCode::Down),
    ("\x1b[OC", KeyCode::Right),
    ("\x1b[OD", KeyCode::Left),
    ("\x1b[OF", KeyCode::End),
    ("\x1b[OH", KeyCode::Home),
    ("\x1bOA", KeyCode::Up),
    ("\x1bOB", KeyCode::Down),
    ("\x1bOC", KeyCode::Right),
    ("\x1bOD", KeyCode::Left),
    ("\x1bOF", KeyCode::End),
    ("\x1bOH", KeyCode::Home),
    ("\x1bOP", KeyCode::F(1)),
    ("\x1bOQ", KeyCode::F(2)),
    ("\x1bOR", KeyCode::F(3)),
    ("\x1bOS", KeyCode::F(4)),
];

/// Input sequences ordered longest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    entries: Vec<(String, KeyCode)>,
}

impl Keymap {
    /// Build from explicit entries. Later duplicates replace earlier ones.
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, KeyCode)>) -> Self {
        let mut keymap = Self::default();
        for (sequence, code) in entries {
            keymap.insert(sequence.into(), code);
        }
        keymap.sort();
        keymap
    }

    /// Only the default sequences.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SEQUENCES.iter().copied())
    }

    /// Build from a terminal's key capabilities plus the defaults.
    ///
    /// `lookup` receives short capability names. When the terminal's
    /// one-column movement capabilities are distinctive (`cuf1` is not a
    /// space, `cub1` is not a backspace) they are accepted as Right/Left too,
    /// since some terminals send them from the arrow keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut keymap = Self::default();
        for (capname, code) in KEY_CAPABILITIES {
            if let Some(sequence) = lookup(capname).filter(|s| !s.is_empty()) {
                keymap.insert(sequence, *code);
            }
        }
        if let Some(cuf1) = lookup("cuf1").filter(|s| !s.is_empty() && s != " ") {
            keymap.insert(cuf1, KeyCode::Right);
        }
        if let Some(cub1) = lookup("cub1").filter(|s| !s.is_empty() && s != "\x08") {
            keymap.insert(cub1, KeyCode::Left);
        }
        for (sequence, code) in DEFAULT_SEQUENCES {
            keymap.insert((*sequence).to_string(), *code);
        }
        keymap.sort();
        keymap
    }

    fn insert(&mut self, sequence: String, code: KeyCode) {
        match self.entries.iter_mut().find(|(s, _)| *s == sequence) {
            Some(entry) => entry.1 = code,
            None => self.entries.push((sequence, code)),
        }
    }

    fn sort(&mut self) {
        // Stable: equal lengths keep insertion order.
        self.entries.sort_by_key(|(sequence, _)| Reverse(sequence.chars().count()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, KeyCode)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), *c))
    }

    /// Code bound to exactly `sequence`.
    pub fn get(&self, sequence: &str) -> Option<KeyCode> {
        self.entries
            .iter()
            .find(|(s, _)| s == sequence)
            .map(|(_, code)| *code)
    }

    /// Resolve the front of `text` into one event.
    ///
    /// The longest known sequence prefixing `text` wins; otherwise the first
    /// character is a literal event. Empty text yields the empty event.
    pub fn resolve(&self, text: &str) -> KeyEvent {
        if let Some((sequence, code)) = self.entries.iter().find(|(s, _)| text.starts_with(s.as_str())) {
            return KeyEvent::sequence(sequence.clone(), *code);
        }
        text.chars().next().map_or_else(KeyEvent::empty, KeyEvent::literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys() {
        let keymap = Keymap::with_defaults();
        let event = keymap.resolve("\x1b[A");
        assert!(event.is_sequence());
        assert_eq!(event.code(), Some(KeyCode::Up));
        assert_eq!(event.name().as_deref(), Some("KEY_UP"));
        assert_eq!(event.len(), 3);
    }

    #[test]
    fn bare_escape_is_prefix_of_everything() {
        let keymap = Keymap::with_defaults();
        assert_eq!(keymap.resolve("\x1b").code(), Some(KeyCode::Escape));
        assert_eq!(keymap.resolve("\x1b[").code(), Some(KeyCode::Escape));
        assert_eq!(keymap.resolve("\x1b[").raw_text(), "\x1b");
    }

    #[test]
    fn literal_takes_one_char() {
        let keymap = Keymap::with_defaults();
        let event = keymap.resolve("héllo");
        assert!(!event.is_sequence());
        assert_eq!(event.raw_text(), "h");
        assert_eq!(keymap.resolve("é!").raw_text(), "é");
    }

    #[test]
    fn empty_text_is_empty_event() {
        let keymap = Keymap::with_defaults();
        assert!(keymap.resolve("").is_empty());
        assert_eq!(keymap.resolve(""), KeyEvent::empty());
    }

    #[test]
    fn longest_first_order() {
        let keymap = Keymap::with_defaults();
        let lengths: Vec<usize> = keymap.iter().map(|(s, _)| s.chars().count()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn database_keys_and_defaults_merge() {
        let keymap = Keymap::from_lookup(|cap| match cap {
            "kf5" => Some("\x1b[15~".to_string()),
            "kcuu1" => Some("\x1bOA".to_string()),
            "cuf1" => Some("\x1b[C".to_string()),
            "cub1" => Some("\x08".to_string()),
            _ => None,
        });
        assert_eq!(keymap.resolve("\x1b[15~").code(), Some(KeyCode::F(5)));
        assert_eq!(keymap.get("\x1bOA"), Some(KeyCode::Up));
        // cub1 == backspace is not taken as an arrow key.
        assert_eq!(keymap.get("\x08"), Some(KeyCode::Backspace));
    }

    #[test]
    fn defaults_override_database() {
        let keymap = Keymap::from_lookup(|cap| (cap == "khome").then(|| "\x1b[1~".to_string()));
        assert_eq!(keymap.get("\x1b[1~"), Some(KeyCode::Find));
    }

    #[test]
    fn function_key_names() {
        assert_eq!(KeyCode::F(11).name(), "KEY_F11");
        assert_eq!(KeyCode::PageDown.to_string(), "KEY_PGDOWN");
        assert!(matches!(KeyCode::Up.name(), Cow::Borrowed("KEY_UP")));
        assert!(matches!(KeyCode::F(2).name(), Cow::Owned(_)));
    }
}
