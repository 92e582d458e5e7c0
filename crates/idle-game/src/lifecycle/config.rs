use super::GameError;
use std::env;

/// Environment variable overriding [`LoaderConfig::max_passes`].
pub const LOAD_PASSES_ENV: &str = "IDLE_GAME_LOAD_PASSES";

/// Settings for the [`ModuleLoader`](super::ModuleLoader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Upper bound on registration passes before deferred modules are given up on.
    pub max_passes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { max_passes: 5 }
    }
}

impl LoaderConfig {
    /// Defaults, overridden by `IDLE_GAME_LOAD_PASSES` when it is set.
    pub fn from_env() -> Result<Self, GameError> {
        match env::var(LOAD_PASSES_ENV) {
            Ok(value) => Ok(Self {
                max_passes: parse_passes(&value)?,
            }),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(env::VarError::NotUnicode(value)) => Err(GameError::InvalidConfig {
                var: LOAD_PASSES_ENV,
                value: value.to_string_lossy().into_owned(),
            }),
        }
    }
}

pub fn parse_passes(value: &str) -> Result<usize, GameError> {
    match value.trim().parse::<usize>() {
        Ok(passes) if passes > 0 => Ok(passes),
        _ => Err(GameError::InvalidConfig {
            var: LOAD_PASSES_ENV,
            value: value.to_string(),
        }),
    }
}
