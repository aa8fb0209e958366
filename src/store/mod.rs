//! Destination of the snapshots.

use derive_more::{Display, Error, From};

pub mod s3;

pub use s3::S3Store;

/// Blind overwrite writes of whole objects.
pub trait ObjectStore {
    /// Writes `body` to `key`, replacing whatever is stored there.
    fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Display, Error, From)]
/// Errors on persisting a snapshot.
pub enum StoreError {
    /// No destination bucket was configured.
    #[display("No destination bucket configured")]
    MissingBucket,
    /// The snapshot couldn't be serialized.
    #[display("Serializing the snapshot failed: {_0}")]
    #[from]
    Serialize(serde_json::Error),
    /// The store rejected the write or wasn't reachable.
    #[display("Writing to the object store failed: {_0}")]
    Write(#[error(ignore)] String),
}
