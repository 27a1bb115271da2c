use thiserror::Error;

/// Failure to load a policy document.
#[derive(Debug, Error)]
pub enum PolicyParseError {
    #[error("invalid policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("policy has no agreement content link")]
    MissingContent,
}
