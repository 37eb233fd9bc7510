use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("node '{0}' not found in graph")]
    NodeNotFound(String),

    #[error("edge endpoint '{0}' not found in graph")]
    EdgeEndpointNotFound(String),

    #[error("node '{0}' already exists")]
    NodeAlreadyExists(String),
}
