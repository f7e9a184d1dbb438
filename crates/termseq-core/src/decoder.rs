#![forbid(unsafe_code)]

//! Keyboard decoder: bytes to codepoints to key events.
//!
//! # Design
//!
//! Two layers share one logical keyboard stream:
//!
//! - [`Utf8Decoder`] turns bytes into text incrementally. A codepoint split
//!   across reads stays in its partial state until the remaining bytes
//!   arrive; invalid input becomes U+FFFD.
//! - [`KeyboardDecoder`] buffers decoded text and resolves it against a
//!   [`Keymap`]. Unconsumed text carries over to the next call.
//!
//! Input sequences are prefix-ambiguous: a bare Escape starts every cursor
//! and function-key sequence. After resolving a bare Escape the decoder
//! keeps reading for up to `esc_delay` in case the rest of a longer
//! sequence is on its way.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::keyboard::{KeyCode, KeyEvent, Keymap};

/// Default wait for the remainder of an escape sequence.
pub const DEFAULT_ESC_DELAY: Duration = Duration::from_millis(350);

/// Blocking read primitive the decoder consumes.
pub trait ByteSource {
    /// Whether the stream is a keyboard at all.
    fn is_interactive(&self) -> bool;

    /// Wait up to `timeout` for input; `None` waits indefinitely.
    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<bool>;

    /// Read whatever is available now. An empty result means end of input.
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }

    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_available()
    }
}

/// A source with no keyboard behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl ByteSource for NoInput {
    fn is_interactive(&self) -> bool {
        false
    }

    fn poll(&mut self, _timeout: Option<Duration>) -> io::Result<bool> {
        Ok(false)
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

// ----------------------------------------------------------------------------
// UTF-8
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecodeState {
    #[default]
    Ground,
    Utf8 {
        /// Bytes collected so far.
        collected: u8,
        /// Total bytes expected.
        expected: u8,
    },
}

/// Incremental UTF-8 decoder.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    state: DecodeState,
    buffer: [u8; 4],
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a codepoint is partially received.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DecodeState::Utf8 { .. })
    }

    /// Decode `bytes`, appending complete codepoints to `out`.
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) {
        for &byte in bytes {
            self.process_byte(byte, out);
        }
    }

    fn process_byte(&mut self, byte: u8, out: &mut String) {
        match self.state {
            DecodeState::Ground => self.process_ground(byte, out),
            DecodeState::Utf8 {
                collected,
                expected,
            } => self.process_continuation(byte, collected, expected, out),
        }
    }

    fn process_ground(&mut self, byte: u8, out: &mut String) {
        let expected = match byte {
            0x00..=0x7F => {
                out.push(byte as char);
                return;
            }
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => {
                tracing::warn!(byte, "invalid UTF-8 lead byte in keyboard input");
                out.push(char::REPLACEMENT_CHARACTER);
                return;
            }
        };
        self.buffer[0] = byte;
        self.state = DecodeState::Utf8 {
            collected: 1,
            expected,
        };
    }

    fn process_continuation(&mut self, byte: u8, collected: u8, expected: u8, out: &mut String) {
        if (byte & 0xC0) != 0x80 {
            tracing::warn!(byte, "truncated UTF-8 sequence in keyboard input");
            self.state = DecodeState::Ground;
            out.push(char::REPLACEMENT_CHARACTER);
            self.process_ground(byte, out);
            return;
        }

        self.buffer[collected as usize] = byte;
        let collected = collected + 1;
        if collected < expected {
            self.state = DecodeState::Utf8 {
                collected,
                expected,
            };
            return;
        }

        self.state = DecodeState::Ground;
        match std::str::from_utf8(&self.buffer[..expected as usize]) {
            Ok(s) => out.push_str(s),
            Err(_) => {
                tracing::warn!("overlong or surrogate UTF-8 in keyboard input");
                out.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Key resolution
// ----------------------------------------------------------------------------

fn time_left(start: Instant, timeout: Option<Duration>) -> Option<Duration> {
    timeout.map(|t| t.saturating_sub(start.elapsed()))
}

/// Key event reader over one keyboard stream.
#[derive(Debug)]
pub struct KeyboardDecoder<S> {
    source: S,
    keymap: Arc<Keymap>,
    utf8: Utf8Decoder,
    pending: String,
}

impl<S: ByteSource> KeyboardDecoder<S> {
    pub fn new(source: S, keymap: Arc<Keymap>) -> Self {
        Self {
            source,
            keymap,
            utf8: Utf8Decoder::new(),
            pending: String::new(),
        }
    }

    /// Decoded text not yet consumed by an event.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Whether input is available within `timeout`.
    ///
    /// `Some(Duration::ZERO)` never blocks; `None` blocks until input.
    /// Always false on a non-interactive stream.
    pub fn poll(&mut self, timeout: Option<Duration>) -> Result<bool> {
        if !self.source.is_interactive() {
            return Ok(false);
        }
        Ok(self.source.poll(timeout)?)
    }

    /// Read and decode available bytes into `text`. False at end of input.
    fn read_into(&mut self, text: &mut String) -> Result<bool> {
        let bytes = self.source.read_available()?;
        if bytes.is_empty() {
            return Ok(false);
        }
        self.utf8.decode(&bytes, text);
        Ok(true)
    }

    /// Next key event.
    ///
    /// Returns the empty event when `timeout` elapses first (`None` waits
    /// indefinitely). On a non-interactive stream only previously buffered
    /// text is resolved and the call never blocks.
    pub fn next_event(&mut self, timeout: Option<Duration>, esc_delay: Duration) -> Result<KeyEvent> {
        let start = Instant::now();
        let mut text = std::mem::take(&mut self.pending);

        while self.poll(Some(Duration::ZERO))? {
            if !self.read_into(&mut text)? {
                break;
            }
        }
        let mut event = self.keymap.resolve(&text);

        // Incomplete multi-byte input resolves to nothing yet.
        while event.is_empty() && self.poll(time_left(start, timeout))? {
            if !self.read_into(&mut text)? {
                break;
            }
            event = self.keymap.resolve(&text);
        }

        if event.code() == Some(KeyCode::Escape) {
            let esc_start = Instant::now();
            while event.code() == Some(KeyCode::Escape)
                && self.poll(time_left(esc_start, Some(esc_delay)))?
            {
                if !self.read_into(&mut text)? {
                    break;
                }
                event = self.keymap.resolve(&text);
            }
        }

        self.pending = text.split_off(event.len());
        tracing::trace!(
            raw = ?event.raw_text(),
            code = ?event.code(),
            pending = self.pending.len(),
            "key event resolved"
        );
        Ok(event)
    }
}
