use thiserror::Error;

/// Errors surfaced by the composition root. Module failures are not among them: those
/// stay inside the registry and are reported through its diagnostics.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid value for {var}: {value:?} (expected a positive integer)")]
    InvalidConfig { var: &'static str, value: String },

    #[error("Module {module} is not available")]
    Unavailable { module: String },

    #[error("Failed to serialize diagnostics: {0}")]
    Serialize(#[from] serde_json::Error),
}
