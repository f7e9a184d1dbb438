#![forbid(unsafe_code)]

//! The set of escape sequences recognized inside arbitrary text.
//!
//! Three sources feed a [`SequenceSet`], in registration order:
//!
//! 1. Every capability in [`CAPABILITIES`] that the terminal supports,
//!    compiled from its real template.
//! 2. [`RAW_MIXIN`]: plain ANSI forms of common movement and reset
//!    sequences, recognized even when the terminal describes them
//!    differently.
//! 3. [`ADDITIVES`]: sequences no terminfo entry describes (OSC 8
//!    hyperlinks, 256-color and RGB SGR, generic SGR runs).
//!
//! Matching at an offset picks the longest candidate. Equal lengths prefer
//! a match that captured a numeric parameter, then the earliest registered.

use crate::error::Result;
use crate::termcap::{CapMatch, MatchSpec, ParamMatch, Termcap};

/// Static description of one recognizable capability.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityInfo {
    /// Long terminfo name (`"cursor_address"`).
    pub name: &'static str,
    /// Short terminfo name (`"cup"`).
    pub capname: &'static str,
    pub spec: MatchSpec,
}

const fn cap(name: &'static str, capname: &'static str) -> CapabilityInfo {
    CapabilityInfo {
        name,
        capname,
        spec: MatchSpec::literal(),
    }
}

const fn parm(name: &'static str, capname: &'static str, nparams: usize) -> CapabilityInfo {
    CapabilityInfo {
        name,
        capname,
        spec: MatchSpec::params(nparams),
    }
}

const fn grouped(name: &'static str, capname: &'static str, nparams: usize) -> CapabilityInfo {
    CapabilityInfo {
        name,
        capname,
        spec: MatchSpec::params(nparams).mode(ParamMatch::Grouped),
    }
}

const fn color(name: &'static str, capname: &'static str) -> CapabilityInfo {
    CapabilityInfo {
        name,
        capname,
        spec: MatchSpec::params(1).numeric(1).mode(ParamMatch::Any),
    }
}

/// Capabilities recognized from the terminal's own templates.
pub const CAPABILITIES: &[CapabilityInfo] = &[
    cap("bell", "bel"),
    cap("carriage_return", "cr"),
    parm("change_scroll_region", "csr", 2),
    cap("clear_all_tabs", "tbc"),
    cap("clear_screen", "clear"),
    cap("clr_bol", "el1"),
    cap("clr_eol", "el"),
    cap("clr_eos", "ed"),
    grouped("column_address", "hpa", 1),
    grouped("cursor_address", "cup", 2),
    cap("cursor_down", "cud1"),
    cap("cursor_home", "home"),
    cap("cursor_invisible", "civis"),
    cap("cursor_left", "cub1"),
    cap("cursor_normal", "cnorm"),
    grouped("cursor_report", "u6", 2),
    cap("cursor_right", "cuf1"),
    cap("cursor_up", "cuu1"),
    cap("cursor_visible", "cvvis"),
    cap("delete_character", "dch1"),
    cap("delete_line", "dl1"),
    cap("enter_alt_charset_mode", "smacs"),
    cap("enter_am_mode", "smam"),
    cap("enter_blink_mode", "blink"),
    cap("enter_bold_mode", "bold"),
    cap("enter_ca_mode", "smcup"),
    cap("enter_dim_mode", "dim"),
    cap("enter_insert_mode", "smir"),
    cap("enter_italics_mode", "sitm"),
    cap("enter_reverse_mode", "rev"),
    cap("enter_secure_mode", "invis"),
    cap("enter_shadow_mode", "sshm"),
    cap("enter_standout_mode", "smso"),
    cap("enter_subscript_mode", "ssubm"),
    cap("enter_superscript_mode", "ssupm"),
    cap("enter_underline_mode", "smul"),
    parm("erase_chars", "ech", 1),
    cap("exit_alt_charset_mode", "rmacs"),
    cap("exit_am_mode", "rmam"),
    cap("exit_attribute_mode", "sgr0"),
    cap("exit_ca_mode", "rmcup"),
    cap("exit_insert_mode", "rmir"),
    cap("exit_italics_mode", "ritm"),
    cap("exit_shadow_mode", "rshm"),
    cap("exit_standout_mode", "rmso"),
    cap("exit_subscript_mode", "rsubm"),
    cap("exit_superscript_mode", "rsupm"),
    cap("exit_underline_mode", "rmul"),
    cap("flash_screen", "flash"),
    cap("insert_line", "il1"),
    cap("keypad_local", "rmkx"),
    cap("keypad_xmit", "smkx"),
    cap("orig_pair", "op"),
    parm("parm_dch", "dch", 1),
    parm("parm_delete_line", "dl", 1),
    grouped("parm_down_cursor", "cud", 1),
    parm("parm_ich", "ich", 1),
    parm("parm_index", "indn", 1),
    parm("parm_insert_line", "il", 1),
    grouped("parm_left_cursor", "cub", 1),
    grouped("parm_right_cursor", "cuf", 1),
    parm("parm_rindex", "rin", 1),
    grouped("parm_up_cursor", "cuu", 1),
    cap("reset_1string", "rs1"),
    cap("restore_cursor", "rc"),
    grouped("row_address", "vpa", 1),
    cap("save_cursor", "sc"),
    cap("scroll_forward", "ind"),
    cap("scroll_reverse", "ri"),
    color("set_a_foreground", "setaf"),
    color("set_a_background", "setab"),
    color("set_foreground", "setf"),
    color("set_background", "setb"),
    cap("set_tab", "hts"),
    cap("tab", "ht"),
];

/// Plain ANSI spellings recognized regardless of the terminal's entry.
pub const RAW_MIXIN: &[(&str, &str)] = &[
    ("bell", r"\x07"),
    ("carriage_return", r"\r"),
    ("cursor_left", r"\x08"),
    ("cursor_report", r"\x1b\[(\d+);(\d+)R"),
    ("cursor_right", r"\x1b\[C"),
    ("exit_attribute_mode", r"\x1b\[m"),
    ("parm_left_cursor", r"\x1b\[(\d+)D"),
    ("parm_right_cursor", r"\x1b\[(\d+)C"),
    ("restore_cursor", r"\x1b\[u"),
    ("save_cursor", r"\x1b\[s"),
    ("scroll_forward", r"\n"),
    ("set0_des_seq", r"\x1b\(B"),
    ("tab", r"\t"),
];

/// Sequences outside any terminfo description.
pub const ADDITIVES: &[(&str, &str)] = &[
    ("link", r"\x1b\]8;[^\x1b]*;[^\x1b]*\x1b\\"),
    ("color256", r"\x1b\[38;5;\d+m"),
    ("on_color256", r"\x1b\[48;5;\d+m"),
    ("color_rgb", r"\x1b\[38;2;\d+;\d+;\d+m"),
    ("on_color_rgb", r"\x1b\[48;2;\d+;\d+;\d+m"),
    ("shift_in", r"\x0f"),
    ("shift_out", r"\x0e"),
    ("set_a_attributes1", r"\x1b\[\d+m"),
    ("set_a_attributes2", r"\x1b\[\d+;\d+m"),
    ("set_a_attributes3", r"\x1b\[\d+;\d+;\d+m"),
    ("set_a_attributes4", r"\x1b\[\d+;\d+;\d+;\d+m"),
    ("sgr0", r"\x1b\[m"),
    ("backspace", r"\x08"),
    ("ascii_tab", r"\t"),
    ("clr_eol", r"\x1b\[K"),
    ("clr_eol0", r"\x1b\[0K"),
    ("clr_bol", r"\x1b\[1K"),
    ("clr_eos_line", r"\x1b\[2K"),
];

/// Look up the static description for a long or short capability name.
pub fn capability_info(name: &str) -> Option<&'static CapabilityInfo> {
    CAPABILITIES
        .iter()
        .find(|info| info.name == name || info.capname == name)
}

/// A sequence found at the start of some text.
#[derive(Debug, Clone, Copy)]
pub struct SequenceMatch<'a> {
    pub cap: &'a Termcap,
    /// The matched text.
    pub text: &'a str,
    pub param: Option<u32>,
}

impl SequenceMatch<'_> {
    /// Horizontal cursor displacement of the matched sequence.
    pub fn horizontal_distance(&self) -> i64 {
        self.cap.horizontal_distance(self.text)
    }
}

/// Every sequence recognizable for one terminal kind.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    caps: Vec<Termcap>,
}

impl SequenceSet {
    /// Wrap an explicit list, in registration order.
    pub fn new(caps: Vec<Termcap>) -> Self {
        Self { caps }
    }

    /// Build the full recognition set, asking `lookup` for raw templates by
    /// short capability name.
    pub fn build(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut caps = Vec::with_capacity(CAPABILITIES.len() + RAW_MIXIN.len() + ADDITIVES.len());
        for info in CAPABILITIES {
            let Some(template) = lookup(info.capname).filter(|t| !t.is_empty()) else {
                continue;
            };
            caps.push(Termcap::build(info.name, info.capname, template, info.spec)?);
        }
        for (name, pattern) in RAW_MIXIN.iter().chain(ADDITIVES) {
            caps.push(Termcap::from_pattern(*name, *pattern)?);
        }
        tracing::debug!(count = caps.len(), "sequence recognition set built");
        Ok(Self { caps })
    }

    pub fn len(&self) -> usize {
        self.caps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Termcap> {
        self.caps.iter()
    }

    /// Longest recognized sequence at the start of `text`.
    pub fn match_at<'a>(&'a self, text: &'a str) -> Option<SequenceMatch<'a>> {
        let mut best: Option<(&Termcap, CapMatch)> = None;
        for cap in &self.caps {
            let Some(found) = cap.match_prefix(text) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((_, current)) => {
                    found.len > current.len
                        || (found.len == current.len && found.has_param() && !current.has_param())
                }
            };
            if better {
                best = Some((cap, found));
            }
        }
        best.map(|(cap, found)| SequenceMatch {
            cap,
            text: &text[..found.len],
            param: found.param,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{BuiltinDatabase, CapabilityDatabase};

    fn xterm() -> SequenceSet {
        let db = BuiltinDatabase::new();
        SequenceSet::build(|cap| db.lookup("xterm-256color", cap)).unwrap()
    }

    #[test]
    fn all_static_patterns_compile() {
        let set = SequenceSet::build(|_| None).unwrap();
        assert_eq!(set.len(), RAW_MIXIN.len() + ADDITIVES.len());
    }

    #[test]
    fn longest_match_wins() {
        let set = xterm();
        // sgr0 on xterm is "\x1b(B\x1b[m", longer than set0_des_seq "\x1b(B".
        let m = set.match_at("\x1b(B\x1b[mtext").unwrap();
        assert_eq!(m.text, "\x1b(B\x1b[m");
        assert_eq!(m.cap.name(), "exit_attribute_mode");
    }

    #[test]
    fn captured_parameter_breaks_ties() {
        let set = xterm();
        let m = set.match_at("\x1b[5Cx").unwrap();
        assert_eq!(m.cap.name(), "parm_right_cursor");
        assert_eq!(m.param, Some(5));
        assert_eq!(m.horizontal_distance(), 5);
    }

    #[test]
    fn color_sequences_recognized() {
        let set = xterm();
        assert_eq!(set.match_at("\x1b[31mred").map(|m| m.text), Some("\x1b[31m"));
        assert_eq!(
            set.match_at("\x1b[38;5;196mred").map(|m| m.text),
            Some("\x1b[38;5;196m")
        );
        assert_eq!(
            set.match_at("\x1b[48;2;1;2;3m").map(|m| m.text),
            Some("\x1b[48;2;1;2;3m")
        );
    }

    #[test]
    fn hyperlink_recognized() {
        let set = xterm();
        let text = "\x1b]8;;https://example.com\x1b\\label";
        let m = set.match_at(text).unwrap();
        assert_eq!(m.cap.name(), "link");
        assert_eq!(m.text, "\x1b]8;;https://example.com\x1b\\");
    }

    #[test]
    fn plain_text_is_not_a_sequence() {
        let set = xterm();
        assert!(set.match_at("hello").is_none());
        assert!(set.match_at("").is_none());
    }

    #[test]
    fn movement_distances() {
        let set = xterm();
        assert_eq!(set.match_at("\x08").unwrap().horizontal_distance(), -1);
        assert_eq!(set.match_at("\t").unwrap().horizontal_distance(), 8);
        assert_eq!(set.match_at("\x1b[C").unwrap().horizontal_distance(), 1);
        assert_eq!(set.match_at("\x1b[4D").unwrap().horizontal_distance(), -4);
        assert_eq!(set.match_at("\x1b[1m").unwrap().horizontal_distance(), 0);
    }

    #[test]
    fn info_by_either_name() {
        assert_eq!(capability_info("cup").map(|i| i.name), Some("cursor_address"));
        assert_eq!(capability_info("cursor_address").map(|i| i.capname), Some("cup"));
        assert!(capability_info("nonesuch").is_none());
    }
}
