#![forbid(unsafe_code)]

//! One terminal capability: its name, raw template, and compiled matcher.
//!
//! A [`Termcap`] is built once per capability and terminal kind. The
//! matcher is derived by rendering the template with a sentinel number,
//! escaping the result, and replacing the sentinel with a numeric pattern.
//! Templates that apply `%i` render `sentinel + 1`, so the neighbours of the
//! sentinel are tried as well.

use regex::Regex;

use crate::error::{Error, Result};
use crate::tparm::{self, Param};

/// Default sentinel used to locate parameter slots in rendered output.
pub const DEFAULT_NUMERIC: i32 = 99;

/// How numeric parameter slots appear in the compiled matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamMatch {
    /// Digits must be present and are not captured.
    #[default]
    Exact,
    /// Digits must be present and are captured.
    Grouped,
    /// Every digit run in the rendering is replaced by a lazy `\d+?`.
    Any,
    /// Digits are captured when present.
    Optional,
}

impl ParamMatch {
    fn numeric_pattern(self) -> &'static str {
        match self {
            Self::Exact => r"\d+",
            Self::Grouped => r"(\d+)",
            Self::Any => r"\d+?",
            Self::Optional => r"(\d+)?",
        }
    }
}

/// Build parameters for [`Termcap::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpec {
    pub nparams: usize,
    pub numeric: i32,
    pub mode: ParamMatch,
}

impl Default for MatchSpec {
    fn default() -> Self {
        Self {
            nparams: 0,
            numeric: DEFAULT_NUMERIC,
            mode: ParamMatch::Exact,
        }
    }
}

impl MatchSpec {
    /// Unparameterized capability matched literally.
    pub const fn literal() -> Self {
        Self {
            nparams: 0,
            numeric: DEFAULT_NUMERIC,
            mode: ParamMatch::Exact,
        }
    }

    /// Capability taking `nparams` numeric parameters.
    pub const fn params(nparams: usize) -> Self {
        Self {
            nparams,
            numeric: DEFAULT_NUMERIC,
            mode: ParamMatch::Exact,
        }
    }

    #[must_use]
    pub const fn numeric(mut self, numeric: i32) -> Self {
        self.numeric = numeric;
        self
    }

    #[must_use]
    pub const fn mode(mut self, mode: ParamMatch) -> Self {
        self.mode = mode;
        self
    }
}

/// Result of matching a capability against the start of some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapMatch {
    /// Length in bytes of the matched prefix.
    pub len: usize,
    /// First captured numeric parameter, if the matcher captures one and
    /// it participated in the match.
    pub param: Option<u32>,
}

impl CapMatch {
    /// Whether a numeric parameter was captured.
    pub fn has_param(&self) -> bool {
        self.param.is_some()
    }
}

/// A resolved, matchable capability.
#[derive(Debug, Clone)]
pub struct Termcap {
    name: String,
    attribute: String,
    template: String,
    nparams: usize,
    pattern: String,
    matcher: Option<Regex>,
}

impl PartialEq for Termcap {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attribute == other.attribute
            && self.template == other.template
            && self.pattern == other.pattern
    }
}

impl Eq for Termcap {}

impl Termcap {
    /// Build a capability from its raw template.
    ///
    /// An empty template yields a valid capability that never matches and
    /// renders to the empty string.
    pub fn build(
        name: impl Into<String>,
        attribute: impl Into<String>,
        template: impl Into<String>,
        spec: MatchSpec,
    ) -> Result<Self> {
        let name = name.into();
        let attribute = attribute.into();
        let template = template.into();
        let pattern = if template.is_empty() {
            String::new()
        } else {
            derive_pattern(&name, &template, spec)?
        };
        let matcher = compile(&name, &pattern)?;
        Ok(Self {
            name,
            attribute,
            template,
            nparams: spec.nparams,
            pattern,
            matcher,
        })
    }

    /// Build a recognition-only capability from a ready-made pattern.
    pub fn from_pattern(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let pattern = pattern.into();
        let matcher = compile(&name, &pattern)?;
        Ok(Self {
            attribute: String::new(),
            name,
            template: String::new(),
            nparams: 0,
            pattern,
            matcher,
        })
    }

    /// Symbolic name (`"cursor_address"`, `"bold"`, ...).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw terminfo capability name (`"cup"`), empty for pattern-only caps.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Raw template, empty when the terminal lacks the capability.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn param_count(&self) -> usize {
        self.nparams
    }

    /// Pattern source the matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the terminal supports this capability at all.
    pub fn is_supported(&self) -> bool {
        self.matcher.is_some()
    }

    /// Expand the template with `params`.
    pub fn render(&self, params: &[Param]) -> Result<String> {
        tparm::expand(&self.template, params).map_err(|err| Error::Template {
            name: self.name.clone(),
            message: err.message().to_string(),
        })
    }

    /// Match this capability against the start of `text`.
    pub fn match_prefix(&self, text: &str) -> Option<CapMatch> {
        let matcher = self.matcher.as_ref()?;
        let caps = matcher.captures(text)?;
        let whole = caps.get(0)?;
        if whole.is_empty() {
            return None;
        }
        let param = caps
            .iter()
            .skip(1)
            .flatten()
            .next()
            .and_then(|m| m.as_str().parse::<u32>().ok());
        Some(CapMatch {
            len: whole.end(),
            param,
        })
    }

    /// Horizontal cursor displacement caused by `text`, a rendering of this
    /// capability.
    pub fn horizontal_distance(&self, text: &str) -> i64 {
        match self.name.as_str() {
            "cursor_left" | "backspace" => -1,
            "cursor_right" => 1,
            "tab" | "ascii_tab" => 8,
            "parm_left_cursor" | "parm_right_cursor" => {
                let unit = if self.name == "parm_left_cursor" { -1 } else { 1 };
                self.match_prefix(text)
                    .and_then(|m| m.param)
                    .map_or(0, |n| unit * i64::from(n))
            }
            _ => 0,
        }
    }
}

fn derive_pattern(name: &str, template: &str, spec: MatchSpec) -> Result<String> {
    if spec.nparams == 0 {
        return Ok(regex::escape(template));
    }
    let args = vec![Param::Number(spec.numeric); spec.nparams];
    let rendered = tparm::expand(template, &args).map_err(|err| Error::Template {
        name: name.to_string(),
        message: err.message().to_string(),
    })?;
    let escaped = regex::escape(&rendered);
    let numeric = spec.mode.numeric_pattern();

    if spec.mode != ParamMatch::Any {
        for num in (spec.numeric - 1)..=(spec.numeric + 1) {
            let needle = num.to_string();
            if escaped.contains(&needle) {
                return Ok(escaped.replace(&needle, numeric));
            }
        }
    }

    let digits = Regex::new(r"\d+").map_err(|err| Error::Pattern {
        name: name.to_string(),
        message: err.to_string(),
    })?;
    Ok(digits.replace_all(&escaped, numeric).into_owned())
}

fn compile(name: &str, pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("^(?:{pattern})"))
        .map(Some)
        .map_err(|err| Error::Pattern {
            name: name.to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUP: &str = "\x1b[%i%p1%d;%p2%dH";
    const SETAF: &str = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";

    #[test]
    fn literal_capability_matches_itself() {
        let bold = Termcap::build("bold", "bold", "\x1b[1m", MatchSpec::literal()).unwrap();
        assert_eq!(bold.pattern(), "\x1b\\[1m");
        let m = bold.match_prefix("\x1b[1mtext").unwrap();
        assert_eq!(m.len, 4);
        assert!(!m.has_param());
        assert!(bold.match_prefix("text\x1b[1m").is_none());
    }

    #[test]
    fn cursor_address_accounts_for_increment() {
        let spec = MatchSpec::params(2).mode(ParamMatch::Grouped);
        let cup = Termcap::build("cursor_address", "cup", CUP, spec).unwrap();
        let m = cup.match_prefix("\x1b[12;40Hrest").unwrap();
        assert_eq!(m.len, "\x1b[12;40H".len());
        assert_eq!(m.param, Some(12));
    }

    #[test]
    fn grouped_parameter_is_captured() {
        let spec = MatchSpec::params(1).mode(ParamMatch::Grouped);
        let cuf = Termcap::build("parm_right_cursor", "cuf", "\x1b[%p1%dC", spec).unwrap();
        assert_eq!(cuf.horizontal_distance("\x1b[5C"), 5);
        let cub = Termcap::build("parm_left_cursor", "cub", "\x1b[%p1%dD", spec).unwrap();
        assert_eq!(cub.horizontal_distance("\x1b[3D"), -3);
    }

    #[test]
    fn optional_capture_matches_without_digits() {
        let spec = MatchSpec::params(1).mode(ParamMatch::Optional);
        let cuf = Termcap::build("parm_right_cursor", "cuf", "\x1b[%p1%dC", spec).unwrap();
        let bare = cuf.match_prefix("\x1b[C").unwrap();
        assert_eq!(bare.param, None);
        let full = cuf.match_prefix("\x1b[7C").unwrap();
        assert_eq!(full.param, Some(7));
    }

    #[test]
    fn match_any_covers_color_range() {
        let spec = MatchSpec::params(1).numeric(1).mode(ParamMatch::Any);
        let setaf = Termcap::build("color", "setaf", SETAF, spec).unwrap();
        assert!(setaf.match_prefix("\x1b[31m").is_some());
        assert!(setaf.match_prefix("\x1b[97m").is_some());
        assert!(setaf.match_prefix("\x1b[1m").is_some());
    }

    #[test]
    fn empty_template_is_unsupported() {
        let spec = MatchSpec::params(1);
        let hpa = Termcap::build("column_address", "hpa", "", spec).unwrap();
        assert!(!hpa.is_supported());
        assert!(hpa.match_prefix("\x1b[5G").is_none());
        assert_eq!(hpa.render(&[Param::Number(4)]).unwrap(), "");
    }

    #[test]
    fn from_pattern_recognizes_sgr_256() {
        let cap = Termcap::from_pattern("color256", r"\x1b\[38;5;\d+m").unwrap();
        assert_eq!(cap.match_prefix("\x1b[38;5;123mX").map(|m| m.len), Some(11));
    }

    #[test]
    fn fixed_distances() {
        let bs = Termcap::build("backspace", "kbs", "\x08", MatchSpec::literal()).unwrap();
        assert_eq!(bs.horizontal_distance("\x08"), -1);
        let tab = Termcap::build("tab", "ht", "\t", MatchSpec::literal()).unwrap();
        assert_eq!(tab.horizontal_distance("\t"), 8);
        let bold = Termcap::build("bold", "bold", "\x1b[1m", MatchSpec::literal()).unwrap();
        assert_eq!(bold.horizontal_distance("\x1b[1m"), 0);
    }

    #[test]
    fn structural_equality() {
        let a = Termcap::build("bold", "bold", "\x1b[1m", MatchSpec::literal()).unwrap();
        let b = Termcap::build("bold", "bold", "\x1b[1m", MatchSpec::literal()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Termcap::from_pattern("broken", r"(\d+").unwrap_err();
        assert!(matches!(err, Error::Pattern { ref name, .. } if name == "broken"));
    }
}
