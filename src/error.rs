use thiserror::Error;

/// Main error type for wfmap operations
///
/// Malformed workflow content never surfaces here: it is reported as
/// diagnostics, edge kinds and expansion markers. These variants cover
/// I/O in the calling layer and misuse of the core API.
#[derive(Error, Debug)]
pub enum WfmapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Malformed identity string: {0}")]
    InvalidIdentity(String),

    #[error("Identity {identity} is not a node of the call graph")]
    UnknownTarget { identity: String },

    #[error("No pseudocode supplied for {identity}")]
    MissingPseudocode { identity: String },

    #[error("Internal pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, WfmapError>;
