//! Blob store (spec §6): `put`/`get` keyed by
//! `{runId}/{hostname}/{first-16-hex-chars-of-contentHash}.html`. The API
//! façade writes here before a `report-result` is applied — spec §5's
//! "blob storage writes by the API façade occur before the coordinator
//! report; if the blob write fails, the report must not be applied".

use crate::collaborators::CollaboratorResult;
use std::collections::HashMap;
use std::path::PathBuf;

/// Builds the blob key for a fetched page (spec §6). `content_hash` is
/// expected to be a hex digest; only its first 16 characters are used.
pub fn blob_key(run_id: &str, hostname: &str, content_hash: &str) -> String {
    let prefix = &content_hash[..content_hash.len().min(16)];
    format!("{run_id}/{hostname}/{prefix}.html")
}

pub trait BlobStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> CollaboratorResult<()>;

    fn get(&self, key: &str) -> CollaboratorResult<Option<Vec<u8>>>;
}

/// Filesystem-backed `BlobStore`: one file per key under `root`, with a
/// sidecar `.meta.json` carrying `contentType` + `metadata`. Plain files are
/// the simplest faithful stand-in for an object store in a single-process
/// deployment; swap in an S3-backed implementation behind the same trait
/// for production object storage.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn meta_path_for(&self, key: &str) -> PathBuf {
        let mut path = self.path_for(key);
        path.set_extension("meta.json");
        path
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct BlobMeta {
    content_type: String,
    metadata: HashMap<String, String>,
}

impl BlobStore for FsBlobStore {
    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> CollaboratorResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;

        let meta = BlobMeta {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
        };
        std::fs::write(self.meta_path_for(key), serde_json::to_vec(&meta)?)?;
        Ok(())
    }

    fn get(&self, key: &str) -> CollaboratorResult<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
