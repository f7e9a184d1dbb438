#![forbid(unsafe_code)]

//! Capability database collaborator.
//!
//! The registry asks a [`CapabilityDatabase`] for raw templates and numeric
//! properties by terminal kind. [`BuiltinDatabase`] ships compiled-in
//! terminfo entries for the common kinds:
//!
//! | Kind | Colors | Notes |
//! |------|--------|-------|
//! | `xterm-256color` | 256 | xterm-new with 256-color `setaf`/`setab` |
//! | `xterm` | 8 | xterm-new |
//! | `screen-256color` | 256 | no `hpa`/`vpa` |
//! | `screen` | 8 | no `hpa`/`vpa` |
//! | `tmux-256color` | 256 | screen with italics and standout fixed |
//! | `linux` | 8 | Linux console |
//! | `ansi` | 8 | no cursor visibility or save/restore |
//! | `vt100` | none | padded attributes |
//! | `dumb` | none | bell, carriage return, newline only |
//!
//! Templates are byte-for-byte what `infocmp` reports, padding included.
//! Unknown kinds resolve to no capabilities at all.

/// Source of raw capability templates.
pub trait CapabilityDatabase: Send + Sync {
    /// Raw template of `capname` for `kind`, if the terminal has it.
    fn lookup(&self, kind: &str, capname: &str) -> Option<String>;

    /// Numeric property (`colors`, `cols`, `lines`, `it`) for `kind`.
    fn numeric_property(&self, kind: &str, property: &str) -> Option<i32>;

    /// Whether `kind` has an entry at all.
    fn knows(&self, _kind: &str) -> bool {
        true
    }
}

/// Compiled-in terminal profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Xterm256Color,
    Xterm,
    Screen256Color,
    Screen,
    Tmux256Color,
    Linux,
    Ansi,
    Vt100,
    Dumb,
}

impl Profile {
    /// Terminfo name of the profile.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xterm256Color => "xterm-256color",
            Self::Xterm => "xterm",
            Self::Screen256Color => "screen-256color",
            Self::Screen => "screen",
            Self::Tmux256Color => "tmux-256color",
            Self::Linux => "linux",
            Self::Ansi => "ansi",
            Self::Vt100 => "vt100",
            Self::Dumb => "dumb",
        }
    }

    /// All compiled-in profiles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Xterm256Color,
            Self::Xterm,
            Self::Screen256Color,
            Self::Screen,
            Self::Tmux256Color,
            Self::Linux,
            Self::Ansi,
            Self::Vt100,
            Self::Dumb,
        ]
    }

    fn strings(&self) -> &'static [&'static [(&'static str, &'static str)]] {
        match self {
            Self::Xterm256Color => &[XTERM_256COLOR, XTERM],
            Self::Xterm => &[XTERM_8COLOR, XTERM],
            Self::Screen256Color => &[SCREEN_256COLOR, SCREEN],
            Self::Screen => &[SCREEN_8COLOR, SCREEN],
            Self::Tmux256Color => &[TMUX, SCREEN_256COLOR, SCREEN],
            Self::Linux => &[LINUX],
            Self::Ansi => &[ANSI],
            Self::Vt100 => &[VT100],
            Self::Dumb => &[DUMB],
        }
    }

    fn numbers(&self) -> &'static [(&'static str, i32)] {
        match self {
            Self::Xterm256Color => &[("colors", 256), ("cols", 80), ("it", 8), ("lines", 24), ("pairs", 65536)],
            Self::Xterm => &[("colors", 8), ("cols", 80), ("it", 8), ("lines", 24), ("pairs", 64)],
            Self::Screen256Color | Self::Tmux256Color => {
                &[("colors", 256), ("cols", 80), ("it", 8), ("lines", 24), ("pairs", 32767)]
            }
            Self::Screen => &[("colors", 8), ("cols", 80), ("it", 8), ("lines", 24), ("pairs", 64)],
            Self::Linux => &[("colors", 8), ("it", 8), ("ncv", 18), ("pairs", 64)],
            Self::Ansi => &[("colors", 8), ("cols", 80), ("it", 8), ("lines", 24), ("ncv", 3), ("pairs", 64)],
            Self::Vt100 => &[("cols", 80), ("it", 8), ("lines", 24), ("vt", 3)],
            Self::Dumb => &[("cols", 80)],
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database backed by the compiled-in [`Profile`] tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDatabase;

impl BuiltinDatabase {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CapabilityDatabase for BuiltinDatabase {
    fn lookup(&self, kind: &str, capname: &str) -> Option<String> {
        let profile: Profile = kind.parse().ok()?;
        profile
            .strings()
            .iter()
            .find_map(|layer| layer.iter().find(|(name, _)| *name == capname))
            .map(|(_, template)| (*template).to_string())
    }

    fn numeric_property(&self, kind: &str, property: &str) -> Option<i32> {
        let profile: Profile = kind.parse().ok()?;
        profile
            .numbers()
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| *value)
    }

    fn knows(&self, kind: &str) -> bool {
        kind.parse::<Profile>().is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const SETAF_256: &str = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";
const SETAB_256: &str = "\x1b[%?%p1%{8}%<%t4%p1%d%e%p1%{16}%<%t10%p1%{8}%-%d%e48;5;%p1%d%;m";

const XTERM_256COLOR: &[(&str, &str)] = &[("setab", SETAB_256), ("setaf", SETAF_256)];

const XTERM_8COLOR: &[(&str, &str)] = &[
    ("setab", "\x1b[4%p1%dm"),
    ("setaf", "\x1b[3%p1%dm"),
];

const XTERM: &[(&str, &str)] = &[
    ("bel", "\x07"),
    ("blink", "\x1b[5m"),
    ("bold", "\x1b[1m"),
    ("cbt", "\x1b[Z"),
    ("civis", "\x1b[?25l"),
    ("clear", "\x1b[H\x1b[2J"),
    ("cnorm", "\x1b[?12l\x1b[?25h"),
    ("cr", "\r"),
    ("csr", "\x1b[%i%p1%d;%p2%dr"),
    ("cub", "\x1b[%p1%dD"),
    ("cub1", "\x08"),
    ("cud", "\x1b[%p1%dB"),
    ("cud1", "\n"),
    ("cuf", "\x1b[%p1%dC"),
    ("cuf1", "\x1b[C"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("cuu", "\x1b[%p1%dA"),
    ("cuu1", "\x1b[A"),
    ("cvvis", "\x1b[?12;25h"),
    ("dch", "\x1b[%p1%dP"),
    ("dch1", "\x1b[P"),
    ("dim", "\x1b[2m"),
    ("dl", "\x1b[%p1%dM"),
    ("dl1", "\x1b[M"),
    ("ech", "\x1b[%p1%dX"),
    ("ed", "\x1b[J"),
    ("el", "\x1b[K"),
    ("el1", "\x1b[1K"),
    ("flash", "\x1b[?5h$<100/>\x1b[?5l"),
    ("home", "\x1b[H"),
    ("hpa", "\x1b[%i%p1%dG"),
    ("ht", "\t"),
    ("hts", "\x1bH"),
    ("ich", "\x1b[%p1%d@"),
    ("il", "\x1b[%p1%dL"),
    ("il1", "\x1b[L"),
    ("ind", "\n"),
    ("indn", "\x1b[%p1%dS"),
    ("invis", "\x1b[8m"),
    ("kbs", "\x7f"),
    ("kcbt", "\x1b[Z"),
    ("kcub1", "\x1bOD"),
    ("kcud1", "\x1bOB"),
    ("kcuf1", "\x1bOC"),
    ("kcuu1", "\x1bOA"),
    ("kdch1", "\x1b[3~"),
    ("kend", "\x1bOF"),
    ("kent", "\x1bOM"),
    ("kf1", "\x1bOP"),
    ("kf10", "\x1b[21~"),
    ("kf11", "\x1b[23~"),
    ("kf12", "\x1b[24~"),
    ("kf2", "\x1bOQ"),
    ("kf3", "\x1bOR"),
    ("kf4", "\x1bOS"),
    ("kf5", "\x1b[15~"),
    ("kf6", "\x1b[17~"),
    ("kf7", "\x1b[18~"),
    ("kf8", "\x1b[19~"),
    ("kf9", "\x1b[20~"),
    ("khome", "\x1bOH"),
    ("kich1", "\x1b[2~"),
    ("knp", "\x1b[6~"),
    ("kpp", "\x1b[5~"),
    ("op", "\x1b[39;49m"),
    ("rc", "\x1b8"),
    ("rev", "\x1b[7m"),
    ("ri", "\x1bM"),
    ("rin", "\x1b[%p1%dT"),
    ("ritm", "\x1b[23m"),
    ("rmacs", "\x1b(B"),
    ("rmam", "\x1b[?7l"),
    ("rmcup", "\x1b[?1049l\x1b[23;0;0t"),
    ("rmir", "\x1b[4l"),
    ("rmkx", "\x1b[?1l\x1b>"),
    ("rmso", "\x1b[27m"),
    ("rmul", "\x1b[24m"),
    ("rs1", "\x1bc"),
    ("sc", "\x1b7"),
    ("sgr0", "\x1b(B\x1b[m"),
    ("sitm", "\x1b[3m"),
    ("smacs", "\x1b(0"),
    ("smam", "\x1b[?7h"),
    ("smcup", "\x1b[?1049h\x1b[22;0;0t"),
    ("smir", "\x1b[4h"),
    ("smkx", "\x1b[?1h\x1b="),
    ("smso", "\x1b[7m"),
    ("smul", "\x1b[4m"),
    ("tbc", "\x1b[3g"),
    ("vpa", "\x1b[%i%p1%dd"),
];

const SCREEN_256COLOR: &[(&str, &str)] = &[("setab", SETAB_256), ("setaf", SETAF_256)];

const SCREEN_8COLOR: &[(&str, &str)] = &[
    ("setab", "\x1b[4%p1%dm"),
    ("setaf", "\x1b[3%p1%dm"),
];

const TMUX: &[(&str, &str)] = &[
    ("kend", "\x1b[4~"),
    ("khome", "\x1b[1~"),
    ("ritm", "\x1b[23m"),
    ("rmso", "\x1b[27m"),
    ("sitm", "\x1b[3m"),
    ("smso", "\x1b[7m"),
];

const SCREEN: &[(&str, &str)] = &[
    ("bel", "\x07"),
    ("blink", "\x1b[5m"),
    ("bold", "\x1b[1m"),
    ("cbt", "\x1b[Z"),
    ("civis", "\x1b[?25l"),
    ("clear", "\x1b[H\x1b[J"),
    ("cnorm", "\x1b[34h\x1b[?25h"),
    ("cr", "\r"),
    ("csr", "\x1b[%i%p1%d;%p2%dr"),
    ("cub", "\x1b[%p1%dD"),
    ("cub1", "\x08"),
    ("cud", "\x1b[%p1%dB"),
    ("cud1", "\n"),
    ("cuf", "\x1b[%p1%dC"),
    ("cuf1", "\x1b[C"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("cuu", "\x1b[%p1%dA"),
    ("cuu1", "\x1bM"),
    ("cvvis", "\x1b[34l"),
    ("dch", "\x1b[%p1%dP"),
    ("dch1", "\x1b[P"),
    ("dim", "\x1b[2m"),
    ("dl", "\x1b[%p1%dM"),
    ("dl1", "\x1b[M"),
    ("ed", "\x1b[J"),
    ("el", "\x1b[K"),
    ("el1", "\x1b[1K"),
    ("flash", "\x1bg"),
    ("home", "\x1b[H"),
    ("ht", "\t"),
    ("hts", "\x1bH"),
    ("ich", "\x1b[%p1%d@"),
    ("il", "\x1b[%p1%dL"),
    ("il1", "\x1b[L"),
    ("ind", "\n"),
    ("kbs", "\x08"),
    ("kcbt", "\x1b[Z"),
    ("kcub1", "\x1bOD"),
    ("kcud1", "\x1bOB"),
    ("kcuf1", "\x1bOC"),
    ("kcuu1", "\x1bOA"),
    ("kdch1", "\x1b[3~"),
    ("kend", "\x1b[4~"),
    ("kf1", "\x1bOP"),
    ("kf10", "\x1b[21~"),
    ("kf11", "\x1b[23~"),
    ("kf12", "\x1b[24~"),
    ("kf2", "\x1bOQ"),
    ("kf3", "\x1bOR"),
    ("kf4", "\x1bOS"),
    ("kf5", "\x1b[15~"),
    ("kf6", "\x1b[17~"),
    ("kf7", "\x1b[18~"),
    ("kf8", "\x1b[19~"),
    ("kf9", "\x1b[20~"),
    ("khome", "\x1b[1~"),
    ("kich1", "\x1b[2~"),
    ("knp", "\x1b[6~"),
    ("kpp", "\x1b[5~"),
    ("op", "\x1b[39;49m"),
    ("rc", "\x1b8"),
    ("rev", "\x1b[7m"),
    ("ri", "\x1bM"),
    ("rmacs", "\x0f"),
    ("rmcup", "\x1b[?1049l"),
    ("rmir", "\x1b[4l"),
    ("rmkx", "\x1b[?1l\x1b>"),
    ("rmso", "\x1b[23m"),
    ("rmul", "\x1b[24m"),
    ("sc", "\x1b7"),
    ("sgr0", "\x1b[m\x0f"),
    ("smacs", "\x0e"),
    ("smcup", "\x1b[?1049h"),
    ("smir", "\x1b[4h"),
    ("smkx", "\x1b[?1h\x1b="),
    ("smso", "\x1b[3m"),
    ("smul", "\x1b[4m"),
    ("tbc", "\x1b[3g"),
];

const LINUX: &[(&str, &str)] = &[
    ("bel", "\x07"),
    ("blink", "\x1b[5m"),
    ("bold", "\x1b[1m"),
    ("civis", "\x1b[?25l\x1b[?1c"),
    ("clear", "\x1b[H\x1b[J"),
    ("cnorm", "\x1b[?25h\x1b[?0c"),
    ("cr", "\r"),
    ("csr", "\x1b[%i%p1%d;%p2%dr"),
    ("cub", "\x1b[%p1%dD"),
    ("cub1", "\x08"),
    ("cud", "\x1b[%p1%dB"),
    ("cud1", "\n"),
    ("cuf", "\x1b[%p1%dC"),
    ("cuf1", "\x1b[C"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("cuu", "\x1b[%p1%dA"),
    ("cuu1", "\x1b[A"),
    ("cvvis", "\x1b[?25h\x1b[?8c"),
    ("dch", "\x1b[%p1%dP"),
    ("dch1", "\x1b[P"),
    ("dim", "\x1b[2m"),
    ("dl", "\x1b[%p1%dM"),
    ("dl1", "\x1b[M"),
    ("ech", "\x1b[%p1%dX"),
    ("ed", "\x1b[J"),
    ("el", "\x1b[K"),
    ("el1", "\x1b[1K"),
    ("home", "\x1b[H"),
    ("hpa", "\x1b[%i%p1%dG"),
    ("ht", "\t"),
    ("hts", "\x1bH"),
    ("ich", "\x1b[%p1%d@"),
    ("il", "\x1b[%p1%dL"),
    ("il1", "\x1b[L"),
    ("ind", "\n"),
    ("kbs", "\x7f"),
    ("kcbt", "\x1b[Z"),
    ("kcub1", "\x1b[D"),
    ("kcud1", "\x1b[B"),
    ("kcuf1", "\x1b[C"),
    ("kcuu1", "\x1b[A"),
    ("kdch1", "\x1b[3~"),
    ("kend", "\x1b[4~"),
    ("kf1", "\x1b[[A"),
    ("kf10", "\x1b[21~"),
    ("kf11", "\x1b[23~"),
    ("kf12", "\x1b[24~"),
    ("kf2", "\x1b[[B"),
    ("kf3", "\x1b[[C"),
    ("kf4", "\x1b[[D"),
    ("kf5", "\x1b[[E"),
    ("kf6", "\x1b[17~"),
    ("kf7", "\x1b[18~"),
    ("kf8", "\x1b[19~"),
    ("kf9", "\x1b[20~"),
    ("khome", "\x1b[1~"),
    ("kich1", "\x1b[2~"),
    ("knp", "\x1b[6~"),
    ("kpp", "\x1b[5~"),
    ("op", "\x1b[39;49m"),
    ("rc", "\x1b8"),
    ("rev", "\x1b[7m"),
    ("ri", "\x1bM"),
    ("rmacs", "\x1b[10m"),
    ("rmir", "\x1b[4l"),
    ("rmso", "\x1b[27m"),
    ("rmul", "\x1b[24m"),
    ("sc", "\x1b7"),
    ("setab", "\x1b[4%p1%dm"),
    ("setaf", "\x1b[3%p1%dm"),
    ("sgr0", "\x1b[m\x0f"),
    ("smacs", "\x1b[11m"),
    ("smir", "\x1b[4h"),
    ("smso", "\x1b[7m"),
    ("smul", "\x1b[4m"),
    ("tbc", "\x1b[3g"),
    ("vpa", "\x1b[%i%p1%dd"),
];

const ANSI: &[(&str, &str)] = &[
    ("bel", "\x07"),
    ("blink", "\x1b[5m"),
    ("bold", "\x1b[1m"),
    ("cbt", "\x1b[Z"),
    ("clear", "\x1b[H\x1b[J"),
    ("cr", "\r"),
    ("cub", "\x1b[%p1%dD"),
    ("cub1", "\x1b[D"),
    ("cud", "\x1b[%p1%dB"),
    ("cud1", "\x1b[B"),
    ("cuf", "\x1b[%p1%dC"),
    ("cuf1", "\x1b[C"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("cuu", "\x1b[%p1%dA"),
    ("cuu1", "\x1b[A"),
    ("dch", "\x1b[%p1%dP"),
    ("dch1", "\x1b[P"),
    ("dl", "\x1b[%p1%dM"),
    ("dl1", "\x1b[M"),
    ("ech", "\x1b[%p1%dX"),
    ("ed", "\x1b[J"),
    ("el", "\x1b[K"),
    ("el1", "\x1b[1K"),
    ("home", "\x1b[H"),
    ("ht", "\t"),
    ("hts", "\x1bH"),
    ("ich", "\x1b[%p1%d@"),
    ("il", "\x1b[%p1%dL"),
    ("il1", "\x1b[L"),
    ("ind", "\n"),
    ("indn", "\x1b[%p1%dS"),
    ("invis", "\x1b[8m"),
    ("kbs", "\x08"),
    ("kcbt", "\x1b[Z"),
    ("kcub1", "\x1b[D"),
    ("kcud1", "\x1b[B"),
    ("kcuf1", "\x1b[C"),
    ("kcuu1", "\x1b[A"),
    ("khome", "\x1b[H"),
    ("kich1", "\x1b[L"),
    ("op", "\x1b[39;49m"),
    ("rep", "%p1%c\x1b[%p2%{1}%-%db"),
    ("rev", "\x1b[7m"),
    ("rin", "\x1b[%p1%dT"),
    ("rmacs", "\x1b[10m"),
    ("rmso", "\x1b[m"),
    ("rmul", "\x1b[m"),
    ("setab", "\x1b[4%p1%dm"),
    ("setaf", "\x1b[3%p1%dm"),
    ("sgr0", "\x1b[0;10m"),
    ("smacs", "\x1b[11m"),
    ("smso", "\x1b[7m"),
    ("smul", "\x1b[4m"),
    ("tbc", "\x1b[2g"),
];

const VT100: &[(&str, &str)] = &[
    ("bel", "\x07"),
    ("blink", "\x1b[5m$<2>"),
    ("bold", "\x1b[1m$<2>"),
    ("clear", "\x1b[H\x1b[J$<50>"),
    ("cr", "\r"),
    ("csr", "\x1b[%i%p1%d;%p2%dr"),
    ("cub", "\x1b[%p1%dD"),
    ("cub1", "\x08"),
    ("cud", "\x1b[%p1%dB"),
    ("cud1", "\n"),
    ("cuf", "\x1b[%p1%dC"),
    ("cuf1", "\x1b[C$<2>"),
    ("cup", "\x1b[%i%p1%d;%p2%dH$<5>"),
    ("cuu", "\x1b[%p1%dA"),
    ("cuu1", "\x1b[A$<2>"),
    ("ed", "\x1b[J$<50>"),
    ("el", "\x1b[K$<3>"),
    ("el1", "\x1b[1K$<3>"),
    ("home", "\x1b[H"),
    ("ht", "\t"),
    ("hts", "\x1bH"),
    ("ind", "\n"),
    ("kbs", "\x08"),
    ("kcub1", "\x1bOD"),
    ("kcud1", "\x1bOB"),
    ("kcuf1", "\x1bOC"),
    ("kcuu1", "\x1bOA"),
    ("kent", "\x1bOM"),
    ("kf1", "\x1bOP"),
    ("kf2", "\x1bOQ"),
    ("kf3", "\x1bOR"),
    ("kf4", "\x1bOS"),
    ("rc", "\x1b8"),
    ("rev", "\x1b[7m$<2>"),
    ("ri", "\x1bM$<5>"),
    ("rmacs", "\x0f"),
    ("rmkx", "\x1b[?1l\x1b>"),
    ("rmso", "\x1b[m$<2>"),
    ("rmul", "\x1b[m$<2>"),
    ("sc", "\x1b7"),
    ("sgr0", "\x1b[m\x0f$<2>"),
    ("smacs", "\x0e"),
    ("smkx", "\x1b[?1h\x1b="),
    ("smso", "\x1b[7m$<2>"),
    ("smul", "\x1b[4m$<2>"),
    ("tbc", "\x1b[3g$<2>"),
];

const DUMB: &[(&str, &str)] = &[("bel", "\x07"), ("cr", "\r"), ("cud1", "\n"), ("ind", "\n")];
