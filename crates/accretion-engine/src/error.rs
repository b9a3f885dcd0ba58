//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the run itself.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: accretion_core::ConfigError,
    },

    /// The world could not be built from the configuration.
    #[error("world setup error: {source}")]
    State {
        /// The underlying state error.
        #[from]
        source: accretion_core::StateError,
    },

    /// The simulation loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: accretion_core::RunnerError,
    },
}
