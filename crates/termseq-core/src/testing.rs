#![forbid(unsafe_code)]

//! Deterministic keyboard sources for tests.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crate::decoder::ByteSource;

/// A byte source that releases scripted chunks on a real-time schedule.
///
/// Each chunk becomes readable `delay` after the previous one (the first
/// after `delay` from construction). `poll` sleeps as a tty would.
#[derive(Debug)]
pub struct ScriptedSource {
    origin: Instant,
    chunks: VecDeque<(Duration, Vec<u8>)>,
    interactive: bool,
    offset: Duration,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            chunks: VecDeque::new(),
            interactive: true,
            offset: Duration::ZERO,
        }
    }

    /// Schedule `bytes` to arrive `delay` after the previous chunk.
    #[must_use]
    pub fn then(mut self, delay: Duration, bytes: &[u8]) -> Self {
        self.offset += delay;
        self.chunks.push_back((self.offset, bytes.to_vec()));
        self
    }

    /// Report the stream as not a keyboard.
    #[must_use]
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Chunks not yet read.
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }

    fn next_ready_at(&self) -> Option<Instant> {
        self.chunks.front().map(|(at, _)| self.origin + *at)
    }
}

impl ByteSource for ScriptedSource {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        let now = Instant::now();
        let Some(ready_at) = self.next_ready_at() else {
            if let Some(timeout) = timeout {
                std::thread::sleep(timeout);
            }
            return Ok(false);
        };
        if ready_at <= now {
            return Ok(true);
        }
        let wait = ready_at - now;
        match timeout {
            Some(timeout) if timeout < wait => {
                std::thread::sleep(timeout);
                Ok(false)
            }
            _ => {
                std::thread::sleep(wait);
                Ok(true)
            }
        }
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let now = Instant::now();
        let mut out = Vec::new();
        while let Some(ready_at) = self.next_ready_at() {
            if ready_at > now {
                break;
            }
            if let Some((_, bytes)) = self.chunks.pop_front() {
                out.extend(bytes);
            }
        }
        Ok(out)
    }
}
