use std::path::PathBuf;
use thiserror::Error;

/// The central error type for Disputecast.
///
/// The playback core never fails; these variants cover the application
/// edges: script loading, configuration, scenario lookup and the terminal.
#[derive(Error, Debug)]
pub enum DisputecastError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse script {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Script '{0}' has no turns")]
    Empty(String),

    #[error("Scenario '{0}' is already defined")]
    DuplicateScenario(String),
}

pub type Result<T> = std::result::Result<T, DisputecastError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_SCRIPT_ERROR: u8 = 3;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<DisputecastError>() {
        return match err {
            DisputecastError::Config(_) => EXIT_CONFIG_ERROR,
            DisputecastError::Script(_) | DisputecastError::UnknownScenario(_) => {
                EXIT_SCRIPT_ERROR
            }
            _ => EXIT_ERROR,
        };
    }

    if e.downcast_ref::<ScriptError>().is_some() {
        return EXIT_SCRIPT_ERROR;
    }

    // Config failures arrive as anyhow context chains from toml/io
    if e.chain().any(|cause| cause.to_string().to_lowercase().contains("config")) {
        return EXIT_CONFIG_ERROR;
    }

    EXIT_ERROR
}
