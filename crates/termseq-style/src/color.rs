#![forbid(unsafe_code)]

//! Color mnemonics.
//!
//! Eight base names map to palette indices 0-7; the `bright_` forms add 8.
//! An `on_` prefix selects the background.

/// The eight base palette colors, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl BaseColor {
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    /// Palette index (0-7).
    #[must_use]
    pub const fn index(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.name() == name)
    }
}

/// A parsed color mnemonic such as `on_bright_red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorName {
    pub base: BaseColor,
    pub bright: bool,
    pub background: bool,
}

impl ColorName {
    /// Parse a foreground or background mnemonic.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.strip_prefix("on_") {
            Some(rest) => Self::parse_foreground(rest).map(|color| Self {
                background: true,
                ..color
            }),
            None => Self::parse_foreground(name),
        }
    }

    /// Parse a mnemonic without the `on_` prefix.
    #[must_use]
    pub fn parse_foreground(name: &str) -> Option<Self> {
        let (bright, base) = match name.strip_prefix("bright_") {
            Some(base) => (true, base),
            None => (false, name),
        };
        BaseColor::from_name(base).map(|base| Self {
            base,
            bright,
            background: false,
        })
    }

    /// Palette index, 8-15 for bright colors.
    #[must_use]
    pub const fn index(&self) -> i32 {
        self.base.index() + if self.bright { 8 } else { 0 }
    }
}
