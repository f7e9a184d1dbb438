#![forbid(unsafe_code)]

//! Capability registry and its process-wide host.
//!
//! A [`CapabilityRegistry`] answers "what does capability X look like on
//! this terminal kind" and caches the built [`Termcap`]s. Cache fills are
//! compute-then-install: a racing duplicate build produces an equal value
//! and the first install wins.
//!
//! # Single kind per process
//!
//! Terminfo-style databases honor only their first initialization in a
//! process. [`RegistryHost`] makes that explicit: the first kind bound owns
//! the host, and any later request for a different kind logs a warning and
//! receives the first kind's registry, flagged as
//! [`Binding::substituted`]. Tests construct their own hosts with
//! [`RegistryHost::new`] to stay independent of the global one.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::database::{BuiltinDatabase, CapabilityDatabase};
use crate::error::{Error, Result};
use crate::keyboard::{KEY_CAPABILITIES, Keymap};
use crate::sequences::{self, SequenceSet};
use crate::termcap::{MatchSpec, Termcap};

/// Friendly aliases onto raw capability names.
pub const SUGAR: &[(&str, &str)] = &[
    ("save", "sc"),
    ("restore", "rc"),
    ("clear_eol", "el"),
    ("clear_bol", "el1"),
    ("clear_eos", "ed"),
    ("position", "cup"),
    ("enter_fullscreen", "smcup"),
    ("exit_fullscreen", "rmcup"),
    ("move", "cup"),
    ("move_x", "hpa"),
    ("move_y", "vpa"),
    ("move_left", "cub1"),
    ("move_right", "cuf1"),
    ("move_up", "cuu1"),
    ("move_down", "cud1"),
    ("hide_cursor", "civis"),
    ("normal_cursor", "cnorm"),
    ("reset_colors", "op"),
    ("normal", "sgr0"),
    ("reverse", "rev"),
    ("invisible", "invis"),
    ("italic", "sitm"),
    ("no_italic", "ritm"),
    ("shadow", "sshm"),
    ("no_shadow", "rshm"),
    ("standout", "smso"),
    ("no_standout", "rmso"),
    ("subscript", "ssubm"),
    ("no_subscript", "rsubm"),
    ("superscript", "ssupm"),
    ("no_superscript", "rsupm"),
    ("underline", "smul"),
    ("no_underline", "rmul"),
];

/// Sugar names that also accept a count, and the capability used then.
pub const PARAMETERIZED_SUGAR: &[(&str, &str)] = &[
    ("move_left", "cub"),
    ("move_right", "cuf"),
    ("move_up", "cuu"),
    ("move_down", "cud"),
];

/// Raw capabilities accepted by name beyond the recognition table.
const EXTRA_CAPNAMES: &[(&str, usize)] = &[
    ("bel", 0),
    ("blink", 0),
    ("bold", 0),
    ("cbt", 0),
    ("dim", 0),
    ("invis", 0),
    ("rep", 2),
    ("rev", 0),
    ("rs2", 0),
    ("sgr0", 0),
    ("sitm", 0),
    ("ritm", 0),
    ("smso", 0),
    ("rmso", 0),
    ("smul", 0),
    ("rmul", 0),
    ("sshm", 0),
    ("rshm", 0),
    ("ssubm", 0),
    ("rsubm", 0),
    ("ssupm", 0),
    ("rsupm", 0),
];

/// Raw name a sugar alias stands for.
pub fn sugar_target(name: &str) -> Option<&'static str> {
    SUGAR.iter().find(|(s, _)| *s == name).map(|(_, cap)| *cap)
}

/// Parameterized capability a sugar alias switches to when given a count.
pub fn parameterized_sugar(name: &str) -> Option<&'static str> {
    PARAMETERIZED_SUGAR
        .iter()
        .find(|(s, _)| *s == name)
        .map(|(_, cap)| *cap)
}

/// Whether `name` is a sugar alias, a raw capability, or a long name.
pub fn is_known_name(name: &str) -> bool {
    sugar_target(name).is_some() || raw_spec(name).is_some()
}

/// Raw capability name and build spec for a raw or long name.
fn raw_spec(name: &str) -> Option<(&'static str, MatchSpec)> {
    if let Some(info) = sequences::capability_info(name) {
        return Some((info.capname, info.spec));
    }
    if let Some((capname, nparams)) = EXTRA_CAPNAMES.iter().find(|(c, _)| *c == name) {
        return Some((*capname, MatchSpec::params(*nparams)));
    }
    KEY_CAPABILITIES
        .iter()
        .find(|(c, _)| *c == name)
        .map(|(capname, _)| (*capname, MatchSpec::literal()))
}

/// Templates synthesized for kinds whose entries omit common capabilities.
fn proxy_template(kind: &str, capname: &str) -> Option<&'static str> {
    let screen_like = kind.starts_with("screen") || kind.starts_with("ansi");
    let ansi = kind.starts_with("ansi");
    match capname {
        "hpa" if screen_like => Some("\x1b[%i%p1%dG"),
        "vpa" if screen_like => Some("\x1b[%i%p1%dd"),
        "civis" if ansi => Some("\x1b[?25l"),
        "cnorm" if ansi => Some("\x1b[?25h"),
        "sc" if ansi => Some("\x1b[s"),
        "rc" if ansi => Some("\x1b[u"),
        _ => None,
    }
}

/// Capability cache for one terminal kind.
pub struct CapabilityRegistry {
    kind: String,
    db: Arc<dyn CapabilityDatabase>,
    cache: RwLock<HashMap<String, Arc<Termcap>>>,
    sequences: OnceLock<Arc<SequenceSet>>,
    keymap: OnceLock<Arc<Keymap>>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("kind", &self.kind)
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

impl CapabilityRegistry {
    pub fn new(kind: impl Into<String>, db: Arc<dyn CapabilityDatabase>) -> Self {
        Self {
            kind: kind.into(),
            db,
            cache: RwLock::new(HashMap::new()),
            sequences: OnceLock::new(),
            keymap: OnceLock::new(),
        }
    }

    /// Terminal kind this registry serves.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Raw template for a short capability name, proxies included.
    pub fn template(&self, capname: &str) -> Option<String> {
        self.db
            .lookup(&self.kind, capname)
            .or_else(|| proxy_template(&self.kind, capname).map(str::to_string))
    }

    /// Numeric property from the database.
    pub fn numeric_property(&self, property: &str) -> Option<i32> {
        self.db.numeric_property(&self.kind, property)
    }

    /// Whether the database has an entry for this kind.
    pub fn is_known_kind(&self) -> bool {
        self.db.knows(&self.kind)
    }

    /// Supported color count, 0 when the terminal has no color.
    pub fn number_of_colors(&self) -> i32 {
        self.numeric_property("colors").unwrap_or(0).max(0)
    }

    /// Resolve a sugar, raw, or long capability name.
    ///
    /// Unsupported capabilities resolve to an empty-template [`Termcap`];
    /// only names that are not capabilities at all are errors. Sugar names
    /// keep their own name on the returned value.
    pub fn resolve(&self, name: &str) -> Result<Arc<Termcap>> {
        if let Some(cap) = self.cached(name) {
            return Ok(cap);
        }
        let target = sugar_target(name).unwrap_or(name);
        let (capname, spec) = raw_spec(target).ok_or_else(|| Error::unknown(name))?;
        let template = self.template(capname).unwrap_or_default();
        let built = Arc::new(Termcap::build(name, capname, template, spec)?);
        tracing::debug!(
            kind = %self.kind,
            name,
            capname,
            supported = built.is_supported(),
            "capability resolved"
        );
        Ok(self.install(name, built))
    }

    /// Resolve `capname` with an explicit parameter count, cached under
    /// `label`. Used for sugar names that switch capability when given a
    /// count.
    pub fn resolve_as(&self, label: &str, capname: &str, nparams: usize) -> Result<Arc<Termcap>> {
        let key = format!("{label}#{nparams}");
        if let Some(cap) = self.cached(&key) {
            return Ok(cap);
        }
        let template = self.template(capname).unwrap_or_default();
        let built = Arc::new(Termcap::build(label, capname, template, MatchSpec::params(nparams))?);
        Ok(self.install(&key, built))
    }

    fn cached(&self, key: &str) -> Option<Arc<Termcap>> {
        let cache = self.cache.read().expect("CapabilityRegistry lock poisoned");
        cache.get(key).cloned()
    }

    fn install(&self, key: &str, built: Arc<Termcap>) -> Arc<Termcap> {
        let mut cache = self.cache.write().expect("CapabilityRegistry lock poisoned");
        Arc::clone(cache.entry(key.to_string()).or_insert(built))
    }

    fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Every sequence recognizable on this terminal kind.
    pub fn sequences(&self) -> Result<Arc<SequenceSet>> {
        if let Some(set) = self.sequences.get() {
            return Ok(Arc::clone(set));
        }
        let built = Arc::new(SequenceSet::build(|capname| self.template(capname))?);
        Ok(Arc::clone(self.sequences.get_or_init(|| built)))
    }

    /// Input-sequence table for this terminal kind.
    pub fn keymap(&self) -> Arc<Keymap> {
        let keymap = self
            .keymap
            .get_or_init(|| Arc::new(Keymap::from_lookup(|capname| self.db.lookup(&self.kind, capname))));
        Arc::clone(keymap)
    }
}

/// A registry handed out by a [`RegistryHost`].
#[derive(Debug, Clone)]
pub struct Binding {
    registry: Arc<CapabilityRegistry>,
    requested: String,
    substituted: bool,
}

impl Binding {
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Kind the caller asked for.
    pub fn requested_kind(&self) -> &str {
        &self.requested
    }

    /// Whether the registry serves a different kind than requested.
    pub fn substituted(&self) -> bool {
        self.substituted
    }
}

/// Owner of the single registry a process may bind.
pub struct RegistryHost {
    db: Arc<dyn CapabilityDatabase>,
    bound: RwLock<Option<Arc<CapabilityRegistry>>>,
}

impl std::fmt::Debug for RegistryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryHost")
            .field("bound_kind", &self.bound_kind())
            .finish_non_exhaustive()
    }
}

impl RegistryHost {
    pub fn new(db: impl CapabilityDatabase + 'static) -> Self {
        Self::with_database(Arc::new(db))
    }

    pub fn with_database(db: Arc<dyn CapabilityDatabase>) -> Self {
        Self {
            db,
            bound: RwLock::new(None),
        }
    }

    /// Process-wide host over [`BuiltinDatabase`].
    pub fn global() -> &'static RegistryHost {
        static GLOBAL: OnceLock<RegistryHost> = OnceLock::new();
        GLOBAL.get_or_init(|| RegistryHost::new(BuiltinDatabase::new()))
    }

    /// Kind currently owning the host.
    pub fn bound_kind(&self) -> Option<String> {
        let bound = self.bound.read().expect("RegistryHost lock poisoned");
        bound.as_ref().map(|r| r.kind().to_string())
    }

    /// Bind `kind`, or reuse the first-bound kind's registry with a warning.
    pub fn bind(&self, kind: &str) -> Binding {
        {
            let bound = self.bound.read().expect("RegistryHost lock poisoned");
            if let Some(registry) = bound.as_ref() {
                return self.reuse(registry, kind);
            }
        }
        let mut bound = self.bound.write().expect("RegistryHost lock poisoned");
        if let Some(registry) = bound.as_ref() {
            return self.reuse(registry, kind);
        }
        tracing::debug!(kind, "binding capability registry");
        let registry = Arc::new(CapabilityRegistry::new(kind, Arc::clone(&self.db)));
        *bound = Some(Arc::clone(&registry));
        Binding {
            registry,
            requested: kind.to_string(),
            substituted: false,
        }
    }

    fn reuse(&self, registry: &Arc<CapabilityRegistry>, kind: &str) -> Binding {
        let substituted = registry.kind() != kind;
        if substituted {
            tracing::warn!(
                requested = kind,
                bound = registry.kind(),
                "a terminal of a different kind was requested; capabilities of the \
                 first-bound kind remain in effect for this process"
            );
        }
        Binding {
            registry: Arc::clone(registry),
            requested: kind.to_string(),
            substituted,
        }
    }
}
