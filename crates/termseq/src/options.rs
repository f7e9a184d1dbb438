#![forbid(unsafe_code)]

//! Terminal configuration.
//!
//! [`TerminalOptions`] holds what the caller decides; [`TerminalEnv`] holds
//! what the process environment says. Both are captured once, when the
//! [`Terminal`](crate::Terminal) is built.

use std::env;
use std::time::Duration;

use termseq_core::DEFAULT_ESC_DELAY;

/// Kind used when neither the options nor `$TERM` name one.
pub const FALLBACK_KIND: &str = "unknown";

/// Size used when no other source reports one.
pub const FALLBACK_SIZE: (u16, u16) = (80, 25);

/// Whether formatters emit sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StylingPolicy {
    /// Style only when the output stream is a terminal.
    #[default]
    Auto,
    /// Always style, even into pipes and files.
    Force,
    /// Never style.
    Never,
}

impl StylingPolicy {
    /// Resolve the policy for an output that is (or is not) a terminal.
    #[must_use]
    pub const fn applies(self, is_a_tty: bool) -> bool {
        match self {
            Self::Auto => is_a_tty,
            Self::Force => true,
            Self::Never => false,
        }
    }
}

/// Caller-chosen terminal configuration.
#[derive(Debug, Clone)]
pub struct TerminalOptions {
    /// Terminal kind; `None` reads `$TERM`.
    pub kind: Option<String>,
    /// Styling policy.
    pub styling: StylingPolicy,
    /// Fixed width, overriding every detected value.
    pub width: Option<u16>,
    /// Fixed height, overriding every detected value.
    pub height: Option<u16>,
    /// Attach the controlling terminal as the keyboard.
    pub keyboard: bool,
    /// Whether output goes to a terminal; `None` asks stdout.
    pub is_a_tty: Option<bool>,
    /// Wait for the remainder of an escape sequence.
    pub esc_delay: Duration,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            kind: None,
            styling: StylingPolicy::Auto,
            width: None,
            height: None,
            keyboard: true,
            is_a_tty: None,
            esc_delay: DEFAULT_ESC_DELAY,
        }
    }
}

impl TerminalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_styling(mut self, styling: StylingPolicy) -> Self {
        self.styling = styling;
        self
    }

    /// Shorthand for [`StylingPolicy::Force`].
    #[must_use]
    pub fn force_styling(self) -> Self {
        self.with_styling(StylingPolicy::Force)
    }

    #[must_use]
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    #[must_use]
    pub fn with_tty(mut self, is_a_tty: bool) -> Self {
        self.is_a_tty = Some(is_a_tty);
        self
    }

    #[must_use]
    pub fn with_esc_delay(mut self, esc_delay: Duration) -> Self {
        self.esc_delay = esc_delay;
        self
    }
}

/// Environment captured at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalEnv {
    /// `$TERM`, when set and non-empty.
    pub term: Option<String>,
    /// `$COLUMNS`, when a positive number.
    pub columns: Option<u16>,
    /// `$LINES`, when a positive number.
    pub lines: Option<u16>,
}

impl TerminalEnv {
    /// Read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Read through a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            term: get_env("TERM").filter(|term| !term.is_empty()),
            columns: get_env("COLUMNS").as_deref().and_then(parse_dimension),
            lines: get_env("LINES").as_deref().and_then(parse_dimension),
        }
    }

    /// Explicit values.
    #[must_use]
    pub fn from_values(term: Option<&str>, columns: Option<u16>, lines: Option<u16>) -> Self {
        Self {
            term: term.filter(|term| !term.is_empty()).map(str::to_string),
            columns: columns.filter(|&n| n > 0),
            lines: lines.filter(|&n| n > 0),
        }
    }

    /// The kind `options` select: explicit, then `$TERM`, then
    /// [`FALLBACK_KIND`].
    #[must_use]
    pub fn kind<'a>(&'a self, options: &'a TerminalOptions) -> &'a str {
        options
            .kind
            .as_deref()
            .or(self.term.as_deref())
            .unwrap_or(FALLBACK_KIND)
    }
}

fn parse_dimension(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|&n| n > 0)
}
