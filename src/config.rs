use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MongoDB connection string
    pub mongo_uri: String,
    /// Database holding the GridFS bucket and its files collection
    pub db_name: String,
    /// Server bind address
    pub bind_addr: String,
    /// Name of the pre-provisioned Atlas Search index on the files collection
    pub search_index: String,
    /// Maximum accepted upload size in megabytes
    pub max_upload_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            db_name: "filevault".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            search_index: "default".to_string(),
            max_upload_mb: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("FILEVAULT_MONGO_URI") {
            config.mongo_uri = uri;
        }
        if let Ok(name) = std::env::var("FILEVAULT_DB") {
            config.db_name = name;
        }
        if let Ok(addr) = std::env::var("FILEVAULT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(index) = std::env::var("FILEVAULT_SEARCH_INDEX") {
            config.search_index = index;
        }
        if let Ok(val) = std::env::var("FILEVAULT_MAX_UPLOAD_MB") {
            if let Ok(v) = val.parse() {
                config.max_upload_mb = v;
            }
        }

        config
    }

    /// Upload size cap in bytes, applied as the request body limit on /upload.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}
