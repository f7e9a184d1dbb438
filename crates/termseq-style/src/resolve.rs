#![forbid(unsafe_code)]

//! Resolving style names into [`Formatter`]s.
//!
//! Names are tried, in order, as:
//!
//! 1. a sugar or raw capability name (`bold`, `move_x`, `cup`),
//! 2. a background color (`on_red`, `on_bright_blue`),
//! 3. a foreground color (`green`, `bright_white`),
//! 4. an underscore-joined compound of styles and colors
//!    (`bold_underline_on_bright_red`). Every component must be known.
//!
//! A resolver without styling returns [`Formatter::Null`] for every name
//! and never consults the registry.

use std::sync::Arc;

use termseq_core::registry::{is_known_name, parameterized_sugar};
use termseq_core::{CapabilityRegistry, Error, Param, Result, Termcap};

use crate::cache::FormatterCache;
use crate::color::ColorName;
use crate::formatter::Formatter;

/// Attribute names that may appear inside a compound name.
pub const COMPOUNDABLES: &[&str] = &[
    "blink",
    "bold",
    "dim",
    "invisible",
    "reverse",
    "standout",
    "underline",
    "italic",
    "shadow",
    "subscript",
    "superscript",
];

/// Prefixes that only ever appear glued to the following word.
const MERGEABLE_PREFIXES: &[&str] = &["on", "bright", "on_bright"];

/// Split a compound name into components, keeping `on_`/`bright_` attached
/// to the color they qualify.
#[must_use]
pub fn split_compound(name: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for segment in name.split('_') {
        match parts.last_mut() {
            Some(last) if MERGEABLE_PREFIXES.contains(&last.as_str()) => {
                last.push('_');
                last.push_str(segment);
            }
            _ => parts.push(segment.to_string()),
        }
    }
    parts
}

fn is_compoundable(name: &str) -> bool {
    COMPOUNDABLES.contains(&name) || ColorName::parse(name).is_some()
}

/// Style-name resolver for one terminal.
#[derive(Debug)]
pub struct FormatterResolver {
    registry: Arc<CapabilityRegistry>,
    styling: bool,
    cache: FormatterCache,
}

impl FormatterResolver {
    pub fn new(registry: Arc<CapabilityRegistry>, styling: bool) -> Self {
        Self {
            registry,
            styling,
            cache: FormatterCache::new(),
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Whether formatters emit sequences at all.
    pub fn does_styling(&self) -> bool {
        self.styling
    }

    pub fn cache(&self) -> &FormatterCache {
        &self.cache
    }

    /// Resolve `attr`, caching the result under that name.
    pub fn resolve(&self, attr: &str) -> Result<Formatter> {
        if !self.styling {
            return Ok(Formatter::Null);
        }
        if let Some(found) = self.cache.get(attr) {
            return Ok(found);
        }
        let built = self.build(attr)?;
        tracing::debug!(
            kind = %self.registry.kind(),
            attr,
            null = built.is_null(),
            "formatter resolved"
        );
        Ok(self.cache.install(attr, built))
    }

    /// Reset sequence, empty without styling.
    pub fn normal(&self) -> Result<String> {
        if !self.styling {
            return Ok(String::new());
        }
        Ok(self.registry.resolve("normal")?.template().to_string())
    }

    /// Colors the terminal supports, 0 without styling.
    pub fn number_of_colors(&self) -> i32 {
        if self.styling {
            self.registry.number_of_colors()
        } else {
            0
        }
    }

    /// Foreground color taking a palette index (`setaf`, else `setf`).
    pub fn color(&self) -> Result<Formatter> {
        self.palette_formatter(false)
    }

    /// Background color taking a palette index (`setab`, else `setb`).
    pub fn on_color(&self) -> Result<Formatter> {
        self.palette_formatter(true)
    }

    /// OSC 8 hyperlink around `text`; plain `text` without styling.
    pub fn link(&self, url: &str, text: &str, id: Option<&str>) -> String {
        if !self.styling {
            return text.to_string();
        }
        let params = id.map(|id| format!("id={id}")).unwrap_or_default();
        format!("\x1b]8;{params};{url}\x1b\\{text}\x1b]8;;\x1b\\")
    }

    fn build(&self, attr: &str) -> Result<Formatter> {
        match attr {
            "color" => return self.color(),
            "on_color" => return self.on_color(),
            _ => {}
        }
        if is_known_name(attr) {
            return self.capability(attr);
        }
        if let Some(color) = ColorName::parse(attr) {
            return self.named_color(attr, color);
        }

        let components = split_compound(attr);
        if components.len() < 2 || !components.iter().all(|c| is_compoundable(c)) {
            return Err(Error::unknown(attr));
        }
        let mut sequence = String::new();
        for component in &components {
            sequence.push_str(self.build(component)?.sequence());
        }
        Ok(Formatter::Compound {
            name: attr.to_string(),
            components,
            sequence,
            normal: self.normal()?,
        })
    }

    fn capability(&self, attr: &str) -> Result<Formatter> {
        let cap = self.registry.resolve(attr)?;
        let normal = self.normal()?;

        if let Some(capname) = parameterized_sugar(attr) {
            let counted = self.registry.resolve_as(attr, capname, 1)?;
            if !cap.is_supported() && !counted.is_supported() {
                return Ok(Formatter::Null);
            }
            return Ok(Formatter::Parameterized {
                cap: counted,
                plain: cap.template().to_string(),
                normal,
            });
        }

        if !cap.is_supported() {
            return Ok(Formatter::Null);
        }
        if cap.param_count() == 0 {
            return Ok(Formatter::simple(attr, cap.template(), normal));
        }
        Ok(Formatter::Parameterized {
            cap,
            plain: String::new(),
            normal,
        })
    }

    fn palette_cap(&self, background: bool) -> Result<Option<Arc<Termcap>>> {
        let (primary, fallback) = if background {
            ("setab", "setb")
        } else {
            ("setaf", "setf")
        };
        for capname in [primary, fallback] {
            let cap = self.registry.resolve(capname)?;
            if cap.is_supported() {
                return Ok(Some(cap));
            }
        }
        Ok(None)
    }

    fn palette_formatter(&self, background: bool) -> Result<Formatter> {
        if !self.styling {
            return Ok(Formatter::Null);
        }
        match self.palette_cap(background)? {
            Some(cap) => Ok(Formatter::Parameterized {
                cap,
                plain: String::new(),
                normal: self.normal()?,
            }),
            None => Ok(Formatter::Null),
        }
    }

    fn named_color(&self, attr: &str, color: ColorName) -> Result<Formatter> {
        if self.registry.number_of_colors() == 0 {
            return Ok(Formatter::Null);
        }
        let Some(cap) = self.palette_cap(color.background)? else {
            return Ok(Formatter::Null);
        };
        let sequence = cap.render(&[Param::Number(color.index())])?;
        Ok(Formatter::simple(attr, sequence, self.normal()?))
    }
}
