use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("graph error: {0}")]
    Graph(#[from] arbor_graph::GraphError),

    #[error("triple store error: {0}")]
    Triples(#[from] arbor_triples::TripleError),

    #[error("block store error: {0}")]
    Blocks(#[from] arbor_blocks::BlockError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
