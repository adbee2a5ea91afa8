use mongodb::gridfs::GridFsBucket;
use mongodb::{Client, Collection};

use crate::config::Config;
use crate::models::FileRecord;

/// Shared application state.
///
/// Built once at startup and cloned into each handler; the driver handles
/// are cheap clones over a shared connection pool, so there is no
/// per-request mutable state anywhere.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The GridFS files collection ("fs.files"), which doubles as the
    /// metadata collection the listing and search paths read from.
    pub files: Collection<FileRecord>,
    /// The GridFS bucket the blobs are written to and streamed from.
    pub bucket: GridFsBucket,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let db = client.database(&config.db_name);
        let files = db.collection::<FileRecord>("fs.files");
        let bucket = db.gridfs_bucket(None);

        Ok(Self {
            config,
            files,
            bucket,
        })
    }
}
