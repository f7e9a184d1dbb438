#![forbid(unsafe_code)]

//! Formatting values.
//!
//! A [`Formatter`] is what a style name resolves to. It always has a plain
//! sequence form ([`Formatter::sequence`]) and can wrap text
//! ([`Formatter::paint`]). Parameterized capabilities first take their
//! numbers ([`Formatter::with_params`]).
//!
//! Wrapping re-asserts the outer style after every reset found in the
//! wrapped parts, so nested styles compose:
//!
//! ```
//! use termseq_style::Formatter;
//!
//! let green = Formatter::simple("green", "\x1b[32m", "\x1b[m");
//! let bold = Formatter::simple("bold", "\x1b[1m", "\x1b[m");
//! let inner = bold.paint(["-b-"]).unwrap();
//! assert_eq!(
//!     green.paint(["-a-", inner.as_str(), "-e-"]).unwrap(),
//!     "\x1b[32m-a-\x1b[1m-b-\x1b[m\x1b[32m-e-\x1b[m",
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use termseq_core::{Error, Param, Result, Termcap};

/// A resolved style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    /// A fixed sequence.
    Simple {
        name: String,
        sequence: String,
        normal: String,
    },
    /// A capability waiting for its numeric parameters. `plain` is the
    /// sequence used when no parameters are given (empty when the
    /// capability has no such form).
    Parameterized {
        cap: Arc<Termcap>,
        plain: String,
        normal: String,
    },
    /// Several styles applied together.
    Compound {
        name: String,
        components: Vec<String>,
        sequence: String,
        normal: String,
    },
    /// Styling disabled or capability missing: text passes through.
    Null,
}

impl Formatter {
    pub fn simple(
        name: impl Into<String>,
        sequence: impl Into<String>,
        normal: impl Into<String>,
    ) -> Self {
        Self::Simple {
            name: name.into(),
            sequence: sequence.into(),
            normal: normal.into(),
        }
    }

    /// Name the formatter was resolved from, empty for [`Formatter::Null`].
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Simple { name, .. } | Self::Compound { name, .. } => name,
            Self::Parameterized { cap, .. } => cap.name(),
            Self::Null => "",
        }
    }

    /// The sequence this formatter emits on its own.
    #[must_use]
    pub fn sequence(&self) -> &str {
        match self {
            Self::Simple { sequence, .. } | Self::Compound { sequence, .. } => sequence,
            Self::Parameterized { plain, .. } => plain,
            Self::Null => "",
        }
    }

    /// The reset sequence appended after wrapped text.
    #[must_use]
    pub fn normal(&self) -> &str {
        match self {
            Self::Simple { normal, .. }
            | Self::Compound { normal, .. }
            | Self::Parameterized { normal, .. } => normal,
            Self::Null => "",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Number of numeric parameters this formatter expects.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Self::Parameterized { cap, .. } => cap.param_count(),
            _ => 0,
        }
    }

    /// Apply numeric parameters, yielding a fixed formatter.
    ///
    /// A parameterized formatter with a plain form accepts zero parameters
    /// and yields that form. Fixed formatters accept only zero parameters,
    /// and [`Formatter::Null`] accepts anything.
    pub fn with_params(&self, params: &[i32]) -> Result<Self> {
        match self {
            Self::Null => Ok(Self::Null),
            Self::Parameterized { cap, plain, normal } => {
                if params.is_empty() && !plain.is_empty() {
                    return Ok(Self::simple(cap.name(), plain.as_str(), normal.as_str()));
                }
                if params.len() != cap.param_count() {
                    return Err(Error::ParameterMismatch {
                        name: cap.name().to_string(),
                        expected: cap.param_count(),
                        got: params.len(),
                    });
                }
                let params: Vec<Param> = params.iter().copied().map(Param::from).collect();
                let rendered = cap.render(&params)?;
                if rendered.is_empty() {
                    return Ok(Self::Null);
                }
                Ok(Self::simple(cap.name(), rendered, normal.as_str()))
            }
            Self::Simple { .. } | Self::Compound { .. } if params.is_empty() => Ok(self.clone()),
            Self::Simple { name, .. } | Self::Compound { name, .. } => Err(Error::ParameterMismatch {
                name: name.clone(),
                expected: 0,
                got: params.len(),
            }),
        }
    }

    /// Wrap `parts` in this style.
    ///
    /// The result is the sequence, the parts (each reset inside them
    /// followed by this sequence again), and a final reset. Without a
    /// sequence the parts are only concatenated. A parameterized formatter
    /// lacking a plain form cannot wrap text.
    pub fn paint<I, S>(&self, parts: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Self::Parameterized { cap, plain, .. } = self
            && plain.is_empty()
        {
            return Err(Error::ParameterMismatch {
                name: cap.name().to_string(),
                expected: cap.param_count(),
                got: 0,
            });
        }
        Ok(wrap_parts(self.sequence(), self.normal(), parts))
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sequence())
    }
}

fn wrap_parts<I, S>(sequence: &str, normal: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(sequence);
    if sequence.is_empty() || normal.is_empty() {
        for part in parts {
            out.push_str(part.as_ref());
        }
        return out;
    }

    let reassert = format!("{normal}{sequence}");
    for part in parts {
        out.push_str(&part.as_ref().replace(normal, &reassert));
    }
    out.push_str(normal);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use termseq_core::MatchSpec;

    const NORMAL: &str = "\x1b(B\x1b[m";

    fn style(name: &str, seq: &str) -> Formatter {
        Formatter::simple(name, seq, NORMAL)
    }

    fn cub() -> Formatter {
        let cap = Termcap::build("move_left", "cub", "\x1b[%p1%dD", MatchSpec::params(1)).unwrap();
        Formatter::Parameterized {
            cap: Arc::new(cap),
            plain: "\x08".to_string(),
            normal: NORMAL.to_string(),
        }
    }

    fn setaf() -> Formatter {
        let cap = Termcap::build("color", "setaf", "\x1b[3%p1%dm", MatchSpec::params(1)).unwrap();
        Formatter::Parameterized {
            cap: Arc::new(cap),
            plain: String::new(),
            normal: NORMAL.to_string(),
        }
    }

    // =========================================================================
    // Wrapping
    // =========================================================================

    #[test]
    fn simple_wrap() {
        let bold = style("bold", "\x1b[1m");
        assert_eq!(bold.paint(["hi"]).unwrap(), format!("\x1b[1mhi{NORMAL}"));
    }

    #[test]
    fn nested_wrap_reasserts_outer_style() {
        let green = style("green", "\x1b[32m");
        let bold = style("bold", "\x1b[1m");
        let underline = style("underline", "\x1b[4m");

        let inner = bold
            .paint(["-b-", underline.paint(["-c-"]).unwrap().as_str(), "-d-"])
            .unwrap();
        let given = green.paint(["-a-", inner.as_str(), "-e-"]).unwrap();
        let expected = [
            "\x1b[32m", "-a-", "\x1b[1m", "-b-", "\x1b[4m", "-c-", NORMAL, "\x1b[32m", "\x1b[1m",
            "-d-", NORMAL, "\x1b[32m", "-e-", NORMAL,
        ]
        .concat();
        assert_eq!(given, expected);
    }

    #[test]
    fn off_and_on_nesting() {
        let green = style("green", "\x1b[32m");
        let underline = style("underline", "\x1b[4m");
        let on = underline.paint(["ON"]).unwrap();
        let given = green.paint(["off ", on.as_str(), " off ", on.as_str(), " off"]).unwrap();
        let expected = [
            "\x1b[32m", "off ", "\x1b[4m", "ON", NORMAL, "\x1b[32m", " off ", "\x1b[4m", "ON",
            NORMAL, "\x1b[32m", " off", NORMAL,
        ]
        .concat();
        assert_eq!(given, expected);
    }

    #[test]
    fn empty_sequence_only_joins() {
        let empty = style("bold", "");
        assert_eq!(empty.paint(["", "x", "huh?"]).unwrap(), "xhuh?");
        assert_eq!(Formatter::Null.paint(["a", "b"]).unwrap(), "ab");
        assert_eq!(Formatter::Null.paint(Vec::<String>::new()).unwrap(), "");
    }

    #[test]
    fn missing_reset_skips_trailer() {
        let bold = Formatter::simple("bold", "\x1b[1m", "");
        assert_eq!(bold.paint(["x"]).unwrap(), "\x1b[1mx");
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    #[test]
    fn parameterized_renders() {
        let red = setaf().with_params(&[1]).unwrap();
        assert_eq!(red.sequence(), "\x1b[31m");
        assert_eq!(red.paint(["x"]).unwrap(), format!("\x1b[31mx{NORMAL}"));
    }

    #[test]
    fn parameterized_with_plain_form() {
        let left = cub();
        assert_eq!(left.sequence(), "\x08");
        assert_eq!(left.with_params(&[]).unwrap().sequence(), "\x08");
        assert_eq!(left.with_params(&[2]).unwrap().sequence(), "\x1b[2D");
    }

    #[test]
    fn wrong_parameter_counts() {
        let err = setaf().with_params(&[]).unwrap_err();
        assert!(matches!(
            err,
            Error::ParameterMismatch {
                expected: 1,
                got: 0,
                ..
            }
        ));
        assert!(setaf().with_params(&[1, 2]).is_err());
        assert!(style("bold", "\x1b[1m").with_params(&[3]).is_err());
        assert!(setaf().paint(["text"]).is_err());
    }

    #[test]
    fn null_accepts_anything() {
        assert_eq!(Formatter::Null.with_params(&[1, 2, 3]).unwrap(), Formatter::Null);
        assert_eq!(Formatter::Null.to_string(), "");
    }

    #[test]
    fn display_is_the_sequence() {
        assert_eq!(style("bold", "\x1b[1m").to_string(), "\x1b[1m");
        assert_eq!(setaf().to_string(), "");
    }
}
