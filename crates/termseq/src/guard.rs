#![forbid(unsafe_code)]

//! Scoped output state.

use std::fmt;
use std::io::{self, Write};

/// Writes an exit sequence when dropped.
///
/// The entry sequence is written (and flushed) when the guard is created.
/// Output written through the guard goes to the wrapped writer, and the
/// exit sequence follows on every exit path: normal scope end, `?`
/// returns, and unwinding.
pub struct OutputGuard<W: Write> {
    out: W,
    exit: String,
}

impl<W: Write> OutputGuard<W> {
    pub(crate) fn enter(mut out: W, entry: &str, exit: String) -> io::Result<Self> {
        out.write_all(entry.as_bytes())?;
        out.flush()?;
        Ok(Self { out, exit })
    }

    /// Sequence written on drop.
    #[must_use]
    pub fn exit_sequence(&self) -> &str {
        &self.exit
    }
}

impl<W: Write> Write for OutputGuard<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for OutputGuard<W> {
    fn drop(&mut self) {
        let _ = self.out.write_all(self.exit.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> fmt::Debug for OutputGuard<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputGuard")
            .field("exit", &self.exit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_body_exit() {
        let mut out = Vec::new();
        {
            let mut guard = OutputGuard::enter(&mut out, "<", ">".to_string()).unwrap();
            guard.write_all(b"body").unwrap();
            assert_eq!(guard.exit_sequence(), ">");
        }
        assert_eq!(out, b"<body>");
    }

    #[test]
    fn exit_written_on_early_return() {
        fn body(out: &mut Vec<u8>) -> io::Result<()> {
            let _guard = OutputGuard::enter(out, "[", "]".to_string())?;
            Err(io::Error::other("boom"))
        }
        let mut out = Vec::new();
        assert!(body(&mut out).is_err());
        assert_eq!(out, b"[]");
    }

    #[test]
    fn exit_written_on_unwind() {
        let out = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        struct Shared(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let writer = Shared(std::sync::Arc::clone(&out));
        let result = std::panic::catch_unwind(move || {
            let _guard = OutputGuard::enter(writer, "on", "off".to_string()).unwrap();
            panic!("inside guard");
        });
        assert!(result.is_err());
        assert_eq!(out.lock().unwrap().as_slice(), b"onoff");
    }

    #[test]
    fn empty_sequences_write_nothing() {
        let mut out = Vec::new();
        drop(OutputGuard::enter(&mut out, "", String::new()).unwrap());
        assert!(out.is_empty());
    }
}
