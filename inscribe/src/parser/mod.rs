// Copyright 2024 the Inscribe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markup parser plugins and the process-wide parser system.
//!
//! Parsers are registered as name → constructor pairs; the system
//! instantiates and initializes every registered parser exactly once, the
//! first time [`ParserSystem::initialize`] (or
//! [`ParserSystem::default_initialize`]) runs. Parsing never fails outward:
//! an unset or unsupported language degrades to the plain-text collapse.

mod mtext;

use std::sync::{Mutex, OnceLock, RwLock};

use markup_text::MarkupText;

use crate::error::GenerateError;
use crate::settings::PluginSettings;

pub use mtext::MTextParser;

/// A pluggable markup grammar.
pub trait MarkupParser: Send + Sync {
    /// Identity of the plugin in the registry.
    fn name(&self) -> &str;

    /// Whether this parser handles `language`. Comparison is ASCII
    /// case-insensitive.
    fn is_supported(&self, language: &str) -> bool;

    /// Applies plugin settings. When `supportLanguages` names a language
    /// this parser does not support, initialization must fail.
    fn initialize(&mut self, settings: &PluginSettings) -> Result<(), GenerateError>;

    /// Populates the structural containers of `markup` from its string.
    fn parse(&self, markup: &mut MarkupText) -> Result<(), GenerateError>;
}

/// Constructor registered for a named parser.
pub type ParserFactory = fn() -> Box<dyn MarkupParser>;

/// Registered factories in registration order. The built-in mtext parser
/// occupies the first slot.
fn factories() -> &'static RwLock<Vec<(String, ParserFactory)>> {
    static FACTORIES: OnceLock<RwLock<Vec<(String, ParserFactory)>>> = OnceLock::new();
    FACTORIES.get_or_init(|| {
        RwLock::new(vec![(
            "mtext".into(),
            (|| Box::new(MTextParser::new()) as Box<dyn MarkupParser>) as ParserFactory,
        )])
    })
}

/// Registers a parser constructor under `name`.
///
/// Must run before the system initializes; factories registered afterwards
/// are not picked up. A repeated name replaces the earlier factory in
/// place, keeping registration order deterministic.
pub fn register_parser(name: impl Into<String>, factory: ParserFactory) {
    let name = name.into();
    let mut factories = factories().write().unwrap();
    if let Some(entry) = factories.iter_mut().find(|(n, _)| *n == name) {
        entry.1 = factory;
    } else {
        factories.push((name, factory));
    }
}

static SYSTEM: OnceLock<ParserSystem> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// The process-wide parser service.
///
/// Created exactly once under a mutex; subsequent initialization calls are
/// no-ops reporting success.
pub struct ParserSystem {
    parsers: Vec<Box<dyn MarkupParser>>,
}

impl ParserSystem {
    /// Builds a standalone system from `settings`.
    ///
    /// The process-wide singleton wraps this; an explicitly constructed
    /// system can be injected into an orchestrator instead.
    pub fn new(settings: &PluginSettings) -> Result<Self, GenerateError> {
        Self::build(settings)
    }

    /// Whether the process-wide system has been created.
    pub fn is_initialized() -> bool {
        SYSTEM.get().is_some()
    }

    /// Creates the system from `settings` if it does not exist yet.
    ///
    /// Returns `true` when the system is available afterwards. Failure to
    /// initialize any registered parser fails the whole system closed, and
    /// a later call may retry.
    pub fn initialize(settings: &PluginSettings) -> bool {
        if SYSTEM.get().is_some() {
            return true;
        }
        let _guard = INIT_LOCK.lock().unwrap();
        if SYSTEM.get().is_some() {
            return true;
        }
        match Self::build(settings) {
            Ok(system) => SYSTEM.set(system).is_ok() || SYSTEM.get().is_some(),
            Err(err) => {
                tracing::warn!(%err, "parser system initialization failed");
                false
            }
        }
    }

    /// Creates the system with default settings.
    pub fn default_initialize() -> bool {
        Self::initialize(&PluginSettings::new())
    }

    /// The initialized system, creating it with defaults on first use.
    pub fn get_or_default() -> Option<&'static Self> {
        Self::default_initialize();
        SYSTEM.get()
    }

    fn build(settings: &PluginSettings) -> Result<Self, GenerateError> {
        let mut parsers = Vec::new();
        let factories = factories().read().unwrap();
        for (name, factory) in factories.iter() {
            let mut parser = factory();
            parser.initialize(settings).map_err(|err| {
                GenerateError::PluginInitFailure(format!("parser `{name}`: {err}"))
            })?;
            parsers.push(parser);
        }
        Ok(Self { parsers })
    }

    /// Populates `markup` from its string.
    ///
    /// When no language is set, no registered parser supports it, or the
    /// selected parser fails, the structure deterministically collapses to
    /// the plain-text shape. The return reports whether a markup grammar
    /// was actually applied.
    pub fn parse_text(&self, markup: &mut MarkupText) -> bool {
        let Some(language) = markup.language().map(str::to_owned) else {
            markup.collapse_to_plain_text();
            return false;
        };
        // First supporting parser in registration order wins.
        let Some(parser) = self.parsers.iter().find(|p| p.is_supported(&language)) else {
            tracing::debug!(language, "no parser supports language, using plain text");
            markup.collapse_to_plain_text();
            return false;
        };
        match parser.parse(markup) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(language, %err, "markup parse failed, using plain text");
                markup.collapse_to_plain_text();
                false
            }
        }
    }
}

impl core::fmt::Debug for ParserSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParserSystem")
            .field(
                "parsers",
                &self.parsers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
