use thiserror::Error;
use uuid::Uuid;

/// Result alias for Mongo backend operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures specific to the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver parse error.
        #[source]
        source: mongodb::error::Error,
    },
    /// A required environment variable is unset.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// The driver client could not be constructed.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The database never answered the bootstrap ping.
    #[error("MongoDB unreachable after {attempts} ping attempts")]
    InitialPing {
        /// Number of attempts made.
        attempts: u32,
        /// Last ping error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Index bootstrap failed.
    #[error("failed to ensure index `{index}` on `{collection}`")]
    EnsureIndex {
        /// Collection name.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Writing a match record failed.
    #[error("failed to save match `{id}`")]
    SaveMatch {
        /// Match id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Reading a match record failed.
    #[error("failed to load match `{id}`")]
    LoadMatch {
        /// Match id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The atomic opponent-slot claim failed.
    #[error("failed to claim opponent slot for match `{id}`")]
    ClaimSlot {
        /// Match id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Writing a progress row failed.
    #[error("failed to save round progress for match `{id}`")]
    SaveProgress {
        /// Match id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Listing progress rows failed.
    #[error("failed to list round progress for match `{id}`")]
    ListProgress {
        /// Match id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Writing a profile failed.
    #[error("failed to save profile `{id}`")]
    SaveProfile {
        /// Profile id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Batch profile lookup failed.
    #[error("failed to load profiles")]
    LoadProfiles {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Connectivity probe failed.
    #[error("MongoDB health ping failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
}
