#![forbid(unsafe_code)]

//! The [`Terminal`]: one output, one keyboard, one capability registry.

use std::fmt;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use termseq_core::{
    Binding, ByteSource, CapabilityRegistry, KeyEvent, KeyboardDecoder, NoInput, RegistryHost,
    SequenceSet, Termcap,
};
use termseq_style::{Formatter, FormatterResolver};
use termseq_text::{Align, Split, WrapOptions};
use termseq_tty::{CbreakGuard, RawModeGuard, TtyInput};

use crate::guard::OutputGuard;
use crate::options::{FALLBACK_SIZE, TerminalEnv, TerminalOptions};
use crate::{Error, Result};

type Keyboard = KeyboardDecoder<Box<dyn ByteSource + Send>>;

/// A terminal: capability lookup, styling, sequence-aware text, and keys.
pub struct Terminal {
    binding: Binding,
    resolver: FormatterResolver,
    sequences: Arc<SequenceSet>,
    keyboard: Keyboard,
    keyboard_tty: Option<File>,
    env: TerminalEnv,
    is_a_tty: bool,
    width: Option<u16>,
    height: Option<u16>,
    esc_delay: Duration,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("kind", &self.kind())
            .field("does_styling", &self.does_styling())
            .field("is_a_tty", &self.is_a_tty)
            .field("keyboard", &self.keyboard_tty.is_some())
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Terminal for this process with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(TerminalOptions::default())
    }

    /// Terminal for this process, bound through [`RegistryHost::global`].
    pub fn with_options(options: TerminalOptions) -> Result<Self> {
        Self::with_host(RegistryHost::global(), TerminalEnv::from_env(), options)
    }

    /// Terminal bound through `host` with an explicit environment.
    pub fn with_host(host: &RegistryHost, env: TerminalEnv, options: TerminalOptions) -> Result<Self> {
        let kind = env.kind(&options).to_string();
        let binding = host.bind(&kind);
        let registry = Arc::clone(binding.registry());
        if !registry.is_known_kind() {
            tracing::warn!(kind = %registry.kind(), "no capabilities known for terminal kind");
        }

        let is_a_tty = options.is_a_tty.unwrap_or_else(|| io::stdout().is_terminal());
        let styling = options.styling.applies(is_a_tty);
        let sequences = registry.sequences()?;

        let mut source: Box<dyn ByteSource + Send> = Box::new(NoInput);
        let mut keyboard_tty = None;
        if options.keyboard {
            match TtyInput::open() {
                Ok(input) => {
                    keyboard_tty = input.file().try_clone().ok();
                    source = Box::new(input);
                }
                Err(err) => tracing::debug!(error = %err, "no keyboard attached"),
            }
        }

        tracing::debug!(
            kind = %registry.kind(),
            styling,
            is_a_tty,
            keyboard = keyboard_tty.is_some(),
            "terminal created"
        );

        Ok(Self {
            keyboard: KeyboardDecoder::new(source, registry.keymap()),
            resolver: FormatterResolver::new(registry, styling),
            binding,
            sequences,
            keyboard_tty,
            env,
            is_a_tty,
            width: options.width,
            height: options.height,
            esc_delay: options.esc_delay,
        })
    }

    /// Replace the keyboard with `source`, dropping any unread input.
    #[must_use]
    pub fn with_keyboard(mut self, source: impl ByteSource + Send + 'static) -> Self {
        let source: Box<dyn ByteSource + Send> = Box::new(source);
        self.keyboard = KeyboardDecoder::new(source, self.binding.registry().keymap());
        self.keyboard_tty = None;
        self
    }

    // --- Identity ----------------------------------------------------------

    /// Kind whose capabilities are in effect.
    pub fn kind(&self) -> &str {
        self.binding.registry().kind()
    }

    /// The registry binding, including whether the kind was substituted.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        self.binding.registry()
    }

    pub fn does_styling(&self) -> bool {
        self.resolver.does_styling()
    }

    pub fn is_a_tty(&self) -> bool {
        self.is_a_tty
    }

    // --- Size --------------------------------------------------------------

    /// `(width, height)`: overrides, then the window size, then
    /// `$COLUMNS`/`$LINES`, then 80x25.
    pub fn size(&self) -> (u16, u16) {
        let live = if self.is_a_tty || self.keyboard_tty.is_some() {
            self.window_size()
        } else {
            None
        };
        let width = self
            .width
            .or(live.map(|(w, _)| w))
            .or(self.env.columns)
            .unwrap_or(FALLBACK_SIZE.0);
        let height = self
            .height
            .or(live.map(|(_, h)| h))
            .or(self.env.lines)
            .unwrap_or(FALLBACK_SIZE.1);
        (width, height)
    }

    pub fn width(&self) -> u16 {
        self.size().0
    }

    pub fn height(&self) -> u16 {
        self.size().1
    }

    fn window_size(&self) -> Option<(u16, u16)> {
        let from_output = if self.is_a_tty {
            termseq_tty::window_size(io::stdout())
        } else {
            None
        };
        from_output.or_else(|| self.keyboard_tty.as_ref().and_then(|tty| termseq_tty::window_size(tty)))
    }

    fn ambient_width(&self, width: Option<usize>) -> usize {
        width.unwrap_or_else(|| usize::from(self.width()))
    }

    // --- Capabilities and formatting -------------------------------------

    /// Resolve a capability by sugar, raw, or long name.
    pub fn capability(&self, name: &str) -> Result<Arc<Termcap>> {
        Ok(self.registry().resolve(name)?)
    }

    /// Resolve a style name (`bold`, `on_bright_red`, `bold_underline_green`,
    /// `move_x`, ...).
    pub fn formatter(&self, attr: &str) -> Result<Formatter> {
        Ok(self.resolver.resolve(attr)?)
    }

    /// Plain sequence of `attr`.
    pub fn sequence(&self, attr: &str) -> Result<String> {
        Ok(self.formatter(attr)?.sequence().to_string())
    }

    /// Wrap `parts` in `attr`, re-asserting it after nested resets.
    pub fn paint<I, S>(&self, attr: &str, parts: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.formatter(attr)?.paint(parts)?)
    }

    /// Parameterized capability applied to `params`.
    pub fn call(&self, attr: &str, params: &[i32]) -> Result<Formatter> {
        Ok(self.formatter(attr)?.with_params(params)?)
    }

    /// Foreground palette color `index`.
    pub fn color(&self, index: i32) -> Result<Formatter> {
        Ok(self.resolver.color()?.with_params(&[index])?)
    }

    /// Background palette color `index`.
    pub fn on_color(&self, index: i32) -> Result<Formatter> {
        Ok(self.resolver.on_color()?.with_params(&[index])?)
    }

    /// Reset all attributes.
    pub fn normal(&self) -> Result<String> {
        Ok(self.resolver.normal()?)
    }

    pub fn number_of_colors(&self) -> i32 {
        self.resolver.number_of_colors()
    }

    /// OSC 8 hyperlink.
    pub fn link(&self, url: &str, text: &str, id: Option<&str>) -> String {
        self.resolver.link(url, text, id)
    }

    /// Cursor to column `x`, row `y` (zero-based).
    pub fn move_xy(&self, x: i32, y: i32) -> Result<String> {
        Ok(self.call("move", &[y, x])?.sequence().to_string())
    }

    pub fn move_x(&self, x: i32) -> Result<String> {
        Ok(self.call("move_x", &[x])?.sequence().to_string())
    }

    pub fn move_y(&self, y: i32) -> Result<String> {
        Ok(self.call("move_y", &[y])?.sequence().to_string())
    }

    // --- Sequence-aware text ----------------------------------------------

    /// The sequences this terminal recognizes inside text.
    pub fn sequences(&self) -> &SequenceSet {
        &self.sequences
    }

    /// Printable width of `text`.
    pub fn length(&self, text: &str) -> usize {
        termseq_text::printable_width(text, &self.sequences)
    }

    /// Left-align `text` in `width` columns (default: terminal width).
    pub fn ljust(&self, text: &str, width: Option<usize>, fill: char) -> String {
        self.pad(text, width, fill, Align::Left)
    }

    pub fn rjust(&self, text: &str, width: Option<usize>, fill: char) -> String {
        self.pad(text, width, fill, Align::Right)
    }

    pub fn center(&self, text: &str, width: Option<usize>, fill: char) -> String {
        self.pad(text, width, fill, Align::Center)
    }

    fn pad(&self, text: &str, width: Option<usize>, fill: char, align: Align) -> String {
        termseq_text::pad(text, &self.sequences, self.ambient_width(width), fill, align)
    }

    /// Cut `text` to `width` printable columns, keeping its sequences.
    pub fn truncate(&self, text: &str, width: Option<usize>) -> String {
        termseq_text::truncate(text, &self.sequences, self.ambient_width(width))
    }

    /// Wrap `text` to `width` columns (default: terminal width).
    pub fn wrap(&self, text: &str, width: Option<usize>) -> Vec<String> {
        let options = WrapOptions::new(self.ambient_width(width));
        termseq_text::wrap(text, &self.sequences, &options)
    }

    pub fn wrap_with(&self, text: &str, options: &WrapOptions) -> Vec<String> {
        termseq_text::wrap(text, &self.sequences, options)
    }

    /// Tokens of `text`; with `max_splits`, the remainder is one final
    /// token.
    pub fn split_seqs<'a>(&'a self, text: &'a str, max_splits: Option<usize>) -> Split<'a> {
        termseq_text::split(text, &self.sequences, max_splits)
    }

    /// Replace horizontal motion sequences with their effect.
    pub fn padd(&self, text: &str) -> String {
        termseq_text::padd(text, &self.sequences)
    }

    pub fn strip_seqs(&self, text: &str) -> String {
        termseq_text::strip_seqs(text, &self.sequences)
    }

    pub fn strip(&self, text: &str) -> String {
        termseq_text::strip(text, &self.sequences)
    }

    // --- Keyboard ---------------------------------------------------------

    /// Whether a key is waiting within `timeout` (`None` blocks).
    pub fn poll(&mut self, timeout: Option<Duration>) -> Result<bool> {
        if !self.keyboard.pending().is_empty() {
            return Ok(true);
        }
        Ok(self.keyboard.poll(timeout)?)
    }

    /// Alias of [`Terminal::poll`].
    pub fn kbhit(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.poll(timeout)
    }

    /// Next key, or the empty event once `timeout` passes.
    pub fn next_event(&mut self, timeout: Option<Duration>) -> Result<KeyEvent> {
        let esc_delay = self.esc_delay;
        self.next_event_with(timeout, esc_delay)
    }

    pub fn next_event_with(&mut self, timeout: Option<Duration>, esc_delay: Duration) -> Result<KeyEvent> {
        Ok(self.keyboard.next_event(timeout, esc_delay)?)
    }

    /// Decoded input not yet returned as an event.
    pub fn pending_input(&self) -> &str {
        self.keyboard.pending()
    }

    /// Raw mode on the keyboard; `None` without an attached terminal.
    pub fn raw(&self) -> Result<Option<RawModeGuard>> {
        match &self.keyboard_tty {
            Some(tty) => Ok(Some(RawModeGuard::on(tty)?)),
            None => Ok(None),
        }
    }

    /// Cbreak mode on the keyboard; `None` without an attached terminal.
    pub fn cbreak(&self) -> Result<Option<CbreakGuard>> {
        match &self.keyboard_tty {
            Some(tty) => Ok(Some(CbreakGuard::on(tty)?)),
            None => Ok(None),
        }
    }

    // --- Output guards ----------------------------------------------------

    /// Save the cursor, move to `(x, y)`, and restore it when the guard
    /// drops. A missing coordinate keeps the current one.
    pub fn location<W: Write>(&self, out: W, x: Option<i32>, y: Option<i32>) -> Result<OutputGuard<W>> {
        let mut entry = self.sequence("save")?;
        match (x, y) {
            (Some(x), Some(y)) => entry.push_str(&self.move_xy(x, y)?),
            (Some(x), None) => entry.push_str(&self.move_x(x)?),
            (None, Some(y)) => entry.push_str(&self.move_y(y)?),
            (None, None) => {}
        }
        let exit = self.sequence("restore")?;
        Ok(OutputGuard::enter(out, &entry, exit)?)
    }

    /// Alternate screen until the guard drops.
    pub fn fullscreen<W: Write>(&self, out: W) -> Result<OutputGuard<W>> {
        self.scoped(out, "enter_fullscreen", "exit_fullscreen")
    }

    /// Invisible cursor until the guard drops.
    pub fn hidden_cursor<W: Write>(&self, out: W) -> Result<OutputGuard<W>> {
        self.scoped(out, "hide_cursor", "normal_cursor")
    }

    fn scoped<W: Write>(&self, out: W, enter: &str, exit: &str) -> Result<OutputGuard<W>> {
        let entry = self.sequence(enter)?;
        let exit = self.sequence(exit)?;
        OutputGuard::enter(out, &entry, exit).map_err(Error::from)
    }
}
