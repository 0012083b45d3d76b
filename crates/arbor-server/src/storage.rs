use std::fs;
use std::sync::Arc;

use arbor_blocks::FsBlockStore;
use arbor_crypto::{BlockHasher, HashAlgorithm};
use arbor_graph::NodeGraph;
use arbor_triples::{InMemoryTripleStore, RedbTripleStore, TripleStore};
use tracing::info;

use crate::config::{ServerConfig, TripleBackend};
use crate::error::{ServerError, ServerResult};

/// The stores and graph opened from a [`ServerConfig`].
#[derive(Debug)]
pub struct Storage {
    config: ServerConfig,
    blocks: Arc<FsBlockStore>,
    graph: NodeGraph,
}

impl Storage {
    /// Create the home layout if needed, open both stores, and attach the
    /// graph (creating the root on first open).
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        config.create_layout()?;
        check_algorithm(&config)?;

        let blocks = Arc::new(FsBlockStore::new(
            config.data_dir(),
            BlockHasher::new(config.hash_algorithm),
        )?);
        let store: Arc<dyn TripleStore> = match config.triple_backend {
            TripleBackend::Memory => Arc::new(InMemoryTripleStore::new()),
            TripleBackend::Redb => Arc::new(RedbTripleStore::open(&config.db_path())?),
        };
        let graph = NodeGraph::open(store, blocks.clone())?;

        info!(
            home = %config.home.display(),
            backend = ?config.triple_backend,
            algorithm = %config.hash_algorithm,
            "storage opened"
        );
        Ok(Self {
            config,
            blocks,
            graph,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn blocks(&self) -> &FsBlockStore {
        &self.blocks
    }
}

/// Refuse to open a block directory written with another algorithm.
fn check_algorithm(config: &ServerConfig) -> ServerResult<()> {
    let expected = config.hash_algorithm.hex_len();
    for entry in fs::read_dir(config.data_dir())? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.chars().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }
        if name.len() != expected {
            let found = [HashAlgorithm::Sha1, HashAlgorithm::Blake3]
                .into_iter()
                .find(|a| a.hex_len() == name.len())
                .map_or_else(|| "unknown".to_string(), |a| a.to_string());
            return Err(ServerError::Config(format!(
                "block store at {} uses {found}, configured {}",
                config.data_dir().display(),
                config.hash_algorithm
            )));
        }
        break;
    }
    Ok(())
}
