pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use error::{Error, Result};

// Export logic types
pub use logic::{CompilePolicy, FilterCompiler, OperatorTable, QueryAssembler, RequestQuery};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DataStore, ReqwestTransport, RestStore, Transport};

/// Initialize `env_logger` at `info` unless `RUST_LOG` says otherwise.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
