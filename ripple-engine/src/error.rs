use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to tokenize condition expression: {0}")]
    ConditionLex(String),

    #[error("failed to parse condition expression: {0}")]
    ConditionParse(String),

    #[error("action '{0}' not found")]
    ActionNotFound(String),

    #[error(transparent)]
    Graph(#[from] ripple_graph::Error),
}
