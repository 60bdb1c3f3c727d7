use crate::{
    errors::{StoreError, UploadError},
    upload::{
        normalize::LineEndings,
        store::{AssetStore, Part},
    },
};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, info};

/// Size of one multipart chunk. Files not larger than this are uploaded in one request.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

const READ_BUFFER_SIZE: usize = 64 * 1024;

const CONTENT_TYPE: &str = "text/plain";

/// Publishes files to an [`AssetStore`] exactly once per distinct content.
///
/// Text files are fingerprinted with SHA-256 after their line endings are normalized, so the same
/// test written on different platforms maps to one object.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn AssetStore>,
}

struct Fingerprint {
    key: String,
    size: u64,
    // Normalized content, kept only while it fits in a single chunk.
    content: Option<Vec<u8>>,
}

impl Uploader {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Uploads a file and returns its URL. Empty files produce an empty URL.
    pub async fn upload_file(&self, path: &Path) -> Result<String, UploadError> {
        let name = file_name(path);
        let fingerprint = fingerprint(path).await?;

        if let Ok(url) = self.store.lookup(&fingerprint.key).await {
            debug!(file = %name, key = %fingerprint.key, %url, "asset already stored");
            return Ok(url);
        }

        if fingerprint.size == 0 {
            debug!(file = %name, "empty file is not uploaded");
            return Ok(String::new());
        }

        let start = Instant::now();
        let keys = vec![fingerprint.key.clone()];

        let url = match fingerprint.content {
            Some(content) => self
                .store
                .upload_single(&name, content, &keys)
                .await
                .map_err(|source| UploadError::Single {
                    name: name.clone(),
                    source,
                })?,
            None => self.upload_multipart(path, &name, &keys).await?,
        };

        info!(
            file = %name,
            key = %fingerprint.key,
            size = fingerprint.size,
            %url,
            elapsed = ?start.elapsed(),
            "asset uploaded"
        );

        Ok(url)
    }

    /// Uploads raw bytes as-is, without fingerprinting.
    pub async fn upload_bytes(&self, name: &str, data: Vec<u8>) -> Result<String, UploadError> {
        let url = self
            .store
            .upload_single(name, data, &[])
            .await
            .map_err(|source| UploadError::Single {
                name: name.to_string(),
                source,
            })?;
        debug!(file = %name, %url, "asset published");
        Ok(url)
    }

    async fn upload_multipart(
        &self,
        path: &Path,
        name: &str,
        keys: &[String],
    ) -> Result<String, UploadError> {
        let read_error = |source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).await.map_err(read_error)?;

        let upload_id = self
            .store
            .start_multipart(name, CONTENT_TYPE, keys)
            .await
            .map_err(|source| UploadError::Start {
                name: name.to_string(),
                source,
            })?;

        let mut normalizer = LineEndings::new();
        let mut buffer = vec![0; READ_BUFFER_SIZE];
        let mut chunk = Vec::with_capacity(CHUNK_SIZE + READ_BUFFER_SIZE);
        let mut parts = Vec::new();

        loop {
            let read = file.read(&mut buffer).await.map_err(read_error)?;
            if read == 0 {
                normalizer.finish(&mut chunk);
            } else {
                normalizer.feed(&buffer[..read], &mut chunk);
            }

            while chunk.len() >= CHUNK_SIZE {
                let rest = chunk.split_off(CHUNK_SIZE);
                let data = std::mem::replace(&mut chunk, rest);
                parts.push(self.upload_part(&upload_id, parts.len(), data).await?);
            }

            if read == 0 {
                break;
            }
        }

        if !chunk.is_empty() {
            parts.push(self.upload_part(&upload_id, parts.len(), chunk).await?);
        }

        if parts.is_empty() {
            return Ok(String::new());
        }

        self.store
            .complete_multipart(&upload_id, &parts)
            .await
            .map_err(|source| UploadError::Complete {
                upload_id: upload_id.clone(),
                source,
            })
    }

    async fn upload_part(
        &self,
        upload_id: &str,
        uploaded: usize,
        data: Vec<u8>,
    ) -> Result<Part, UploadError> {
        let number = u32::try_from(uploaded + 1).map_err(|_| UploadError::Part {
            upload_id: upload_id.to_string(),
            part: u32::MAX,
            source: StoreError::Rejected(format!("part #{} is out of range", uploaded + 1)),
        })?;
        let token = self
            .store
            .upload_part(upload_id, number, data)
            .await
            .map_err(|source| UploadError::Part {
                upload_id: upload_id.to_string(),
                part: number,
                source,
            })?;
        Ok(Part { number, token })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn fingerprint(path: &Path) -> Result<Fingerprint, UploadError> {
    let read_error = |source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(read_error)?;
    let mut hasher = Sha256::new();
    let mut normalizer = LineEndings::new();
    let mut buffer = vec![0; READ_BUFFER_SIZE];
    let mut normalized = Vec::with_capacity(READ_BUFFER_SIZE);
    let mut content = Some(Vec::new());
    let mut size = 0u64;

    loop {
        let read = file.read(&mut buffer).await.map_err(read_error)?;
        normalized.clear();
        if read == 0 {
            normalizer.finish(&mut normalized);
        } else {
            normalizer.feed(&buffer[..read], &mut normalized);
        }

        hasher.update(&normalized);
        size += normalized.len() as u64;

        if let Some(kept) = content.as_mut() {
            if size as usize <= CHUNK_SIZE {
                kept.extend_from_slice(&normalized);
            } else {
                content = None;
            }
        }

        if read == 0 {
            break;
        }
    }

    Ok(Fingerprint {
        key: format!("sha256:{}", hex::encode(hasher.finalize())),
        size,
        content,
    })
}
