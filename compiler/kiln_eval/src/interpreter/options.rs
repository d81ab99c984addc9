//! Evaluation options.

use std::str::FromStr;

/// Environment variable overriding [`EvalOptions::optimization_level`].
pub const OPT_LEVEL_VAR: &str = "KILN_OPT_LEVEL";

/// Environment variable overriding [`EvalOptions::max_link_level`].
pub const LINK_LEVEL_VAR: &str = "KILN_LINK_LEVEL";

/// How an [`Interpreter`](super::Interpreter) prepares trees before running them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Effort passed to `optimize_tree`; 0 disables the optimizer.
    pub optimization_level: u8,
    /// Function-nesting levels a free variable may bind across in the
    /// initial resolution pass.
    pub max_link_level: u32,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            optimization_level: 1,
            max_link_level: 0,
        }
    }
}

impl EvalOptions {
    /// Defaults, overridden by `KILN_OPT_LEVEL` and `KILN_LINK_LEVEL`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that do not parse are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = parse_override(OPT_LEVEL_VAR, lookup(OPT_LEVEL_VAR)) {
            self.optimization_level = level;
        }
        if let Some(level) = parse_override(LINK_LEVEL_VAR, lookup(LINK_LEVEL_VAR)) {
            self.max_link_level = level;
        }
        self
    }
}

fn parse_override<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring invalid override");
            None
        }
    }
}
