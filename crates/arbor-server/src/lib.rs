//! Bootstrap for the Arbor storage daemon.
//!
//! Resolves the home directory layout, loads configuration, installs the
//! tracing subscriber, and wires a [`NodeGraph`](arbor_graph::NodeGraph) to
//! its triple store and block store.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::{ServerConfig, TripleBackend, HOME_ENV};
pub use error::{ServerError, ServerResult};
pub use logging::init_logging;
pub use storage::Storage;
