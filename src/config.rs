//! Configuration
//!
//! Tunable ceilings for the engine, loaded hierarchically from:
//! - `linelogic.toml` (base configuration)
//! - `linelogic.local.toml` (git-ignored local overrides)
//! - Environment variables (`LINELOGIC_*` prefix)
//!
//! None of this is a wire protocol; it is the in-process knob a host
//! process uses to configure a [`crate::kb::KnowledgeBase`] at creation
//! time. A host that never calls [`Limits::load`] gets [`Limits::default`],
//! which matches the recommended constants in the data model.
//!
//! ## Example
//!
//! ```toml
//! # linelogic.toml
//! max_vars = 512
//! max_goal_stack_depth = 4096
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! LINELOGIC_MAX_VARS=512
//! LINELOGIC_LOGGING__LEVEL=debug
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::symbols::MAX_SYMBOLS;

/// Recommended bound on live variables in one [`crate::subst::Substitution`].
pub const DEFAULT_MAX_VARS: usize = 256;

/// Recommended bound on goal-stack depth before [`crate::engine::ProofFailure::RecursionBound`].
pub const DEFAULT_MAX_GOAL_STACK_DEPTH: usize = 1024;

/// Recommended bound on memoized goal-cache entries.
pub const DEFAULT_MAX_GOAL_CACHE: usize = 4096;

/// Recommended bound on stored rules before [`crate::kb::KbError::RuleTableFull`].
pub const DEFAULT_MAX_RULES: usize = 4096;

/// Engine-wide tunable limits and behavioral knobs.
///
/// Passed to [`crate::kb::KnowledgeBase::new`] (or defaulted). Everything
/// here enforces §7's `CapacityExceeded` and `RecursionBound` error kinds;
/// none of it changes which queries succeed, only how a query that would
/// run away fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Ceiling on live bindings in a substitution (`MAX_VARS`).
    #[serde(default = "default_max_vars")]
    pub max_vars: usize,

    /// Ceiling on distinct interned symbols (`MAX_SYMBOLS`). Capped at
    /// [`MAX_SYMBOLS`] regardless of configuration.
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,

    /// Ceiling on goal-stack depth during resolution (`MAX_GOAL_STACK_DEPTH`).
    #[serde(default = "default_max_goal_stack_depth")]
    pub max_goal_stack_depth: usize,

    /// Ceiling on memoized goal-cache entries (`MAX_GOAL_CACHE`).
    #[serde(default = "default_max_goal_cache")]
    pub max_goal_cache_entries: usize,

    /// Ceiling on stored rules (`MAX_RULES`).
    #[serde(default = "default_max_rules")]
    pub max_rules: usize,

    /// Eager (true) vs. lazy (false) release of linear resource memory on
    /// consumption. See `SPEC_FULL.md` §5.
    #[serde(default)]
    pub auto_deallocate: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration; consumed by a host process to set up `tracing`,
/// not read by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_vars() -> usize {
    DEFAULT_MAX_VARS
}
fn default_max_symbols() -> usize {
    MAX_SYMBOLS
}
fn default_max_goal_stack_depth() -> usize {
    DEFAULT_MAX_GOAL_STACK_DEPTH
}
fn default_max_goal_cache() -> usize {
    DEFAULT_MAX_GOAL_CACHE
}
fn default_max_rules() -> usize {
    DEFAULT_MAX_RULES
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_vars: default_max_vars(),
            max_symbols: default_max_symbols(),
            max_goal_stack_depth: default_max_goal_stack_depth(),
            max_goal_cache_entries: default_max_goal_cache(),
            max_rules: default_max_rules(),
            auto_deallocate: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Limits {
    /// Loads limits from default locations, merging:
    /// 1. `linelogic.toml` (base configuration)
    /// 2. `linelogic.local.toml` (local overrides, git-ignored)
    /// 3. Environment variables (`LINELOGIC_*` prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Limits::default()))
            .merge(Toml::file("linelogic.toml"))
            .merge(Toml::file("linelogic.local.toml"))
            .merge(Env::prefixed("LINELOGIC_").split("__"))
            .extract()
    }

    /// Loads limits from a specific file path, still honoring environment
    /// overrides.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Limits::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("LINELOGIC_").split("__"))
            .extract()
    }
}
