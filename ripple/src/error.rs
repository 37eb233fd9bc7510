use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One error enum for the whole facade: core crates never know about
/// HTTP, so `ripple-server` is the only place that maps these onto status
/// codes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("workspace document is invalid: {0}")]
    WorkspaceInvalid(String),

    #[error("no workspace has been loaded")]
    NoWorkspaceLoaded,

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("action '{0}' not found")]
    ActionNotFound(String),

    #[error("unknown sample '{0}'")]
    UnknownSample(String),

    #[error(transparent)]
    Graph(#[from] ripple_graph::Error),

    #[error(transparent)]
    Engine(#[from] ripple_engine::Error),
}
