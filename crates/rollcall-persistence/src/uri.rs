//! Store selection from a connection string.

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::error::{PersistenceError, Result};
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::mongo::MongoStore;
use crate::store::Store;

/// Opens the store named by `uri`.
///
/// Supported schemes are `memory`, `file`, `mongodb` and `mongodb+srv`. A
/// `file` URI must carry an absolute path, e.g. `file:///var/lib/rollcall`.
/// MongoDB URIs are handed to the driver as given.
pub async fn connect(uri: &str) -> Result<Arc<dyn Store>> {
    let url = Url::parse(uri).map_err(|e| PersistenceError::InvalidUri(format!("{uri}: {e}")))?;

    match url.scheme() {
        "memory" => {
            info!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        "file" => {
            let dir = url
                .to_file_path()
                .map_err(|_| PersistenceError::InvalidUri(format!("{uri}: not a local path")))?;
            Ok(Arc::new(FileStore::open(dir)?))
        }
        "mongodb" | "mongodb+srv" => Ok(Arc::new(MongoStore::open(uri).await?)),
        other => Err(PersistenceError::UnsupportedUri(other.to_string())),
    }
}
