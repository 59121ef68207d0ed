//! MongoDB store backend, enabled by the `mongo-store` feature.

mod connection;
mod error;
mod models;
pub mod store;

/// Runtime configuration for the Mongo backend.
pub mod config;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoMatchStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
