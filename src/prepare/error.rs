use thiserror::Error;

/// Errors raised by the build collaborators.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build tool could not be started.
    #[error("{stage}: failed to run {program}: {source}")]
    Spawn {
        stage: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The build tool ran and reported failure.
    #[error("{stage}: {program} failed with {status}")]
    Failed {
        stage: &'static str,
        program: String,
        status: String,
    },

    /// A build descriptor or input is missing.
    #[error("{stage}: {message}")]
    Input {
        stage: &'static str,
        message: String,
    },
}

impl BuildError {
    pub fn stage(&self) -> &'static str {
        match self {
            BuildError::Spawn { stage, .. }
            | BuildError::Failed { stage, .. }
            | BuildError::Input { stage, .. } => stage,
        }
    }
}
