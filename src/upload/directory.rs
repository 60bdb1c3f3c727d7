use crate::{
    errors::StoreError,
    upload::store::{AssetStore, Part},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Asset store backed by a local directory that a web server exposes under `base_url`.
///
/// Layout:
/// - `objects/<id>/<name>`: published objects, served as `<base_url>/<id>/<name>`
/// - `keys/<key>`: URL of the object registered under a lookup key
/// - `uploads/<id>/`: multipart sessions in progress (`session.json` plus one file per part)
pub struct DirectoryStore {
    root: PathBuf,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct Session {
    name: String,
    keys: Vec<String>,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join("keys").join(key.replace([':', '/', '\\'], "-"))
    }

    fn upload_dir(&self, upload_id: &str) -> Result<PathBuf, StoreError> {
        // Upload ids are generated here; anything else cannot name a session.
        Uuid::parse_str(upload_id)
            .map(|id| self.root.join("uploads").join(id.to_string()))
            .map_err(|_| StoreError::UnknownUpload(upload_id.to_string()))
    }

    async fn publish(&self, name: &str, data: &[u8], keys: &[String]) -> Result<String, StoreError> {
        let name = object_name(name);
        let id = Uuid::new_v4().to_string();

        let dir = self.root.join("objects").join(&id);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&name), data).await?;

        let url = format!("{}/{id}/{name}", self.base_url);

        if !keys.is_empty() {
            fs::create_dir_all(self.root.join("keys")).await?;
            for key in keys {
                fs::write(self.key_path(key), &url).await?;
            }
        }

        Ok(url)
    }
}

// Only the final path component is kept, so names cannot escape the object directory.
fn object_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "blob".to_string())
}

fn part_token(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[async_trait]
impl AssetStore for DirectoryStore {
    async fn lookup(&self, key: &str) -> Result<String, StoreError> {
        match fs::read_to_string(self.key_path(key)).await {
            Ok(url) => Ok(url),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(error) => Err(error.into()),
        }
    }

    async fn upload_single(
        &self,
        name: &str,
        data: Vec<u8>,
        keys: &[String],
    ) -> Result<String, StoreError> {
        self.publish(name, &data, keys).await
    }

    async fn start_multipart(
        &self,
        name: &str,
        _content_type: &str,
        keys: &[String],
    ) -> Result<String, StoreError> {
        let upload_id = Uuid::new_v4().to_string();
        let dir = self.upload_dir(&upload_id)?;
        fs::create_dir_all(&dir).await?;

        let session = Session {
            name: name.to_string(),
            keys: keys.to_vec(),
        };
        let session = serde_json::to_vec(&session)
            .map_err(|error| StoreError::Rejected(error.to_string()))?;
        fs::write(dir.join("session.json"), session).await?;

        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        upload_id: &str,
        number: u32,
        data: Vec<u8>,
    ) -> Result<String, StoreError> {
        let dir = self.upload_dir(upload_id)?;
        if fs::metadata(&dir).await.is_err() {
            return Err(StoreError::UnknownUpload(upload_id.to_string()));
        }

        fs::write(dir.join(format!("{number}.part")), &data).await?;
        Ok(part_token(&data))
    }

    async fn complete_multipart(
        &self,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<String, StoreError> {
        let dir = self.upload_dir(upload_id)?;
        let session = match fs::read(dir.join("session.json")).await {
            Ok(session) => session,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(StoreError::UnknownUpload(upload_id.to_string()))
            }
            Err(error) => return Err(error.into()),
        };
        let session: Session = serde_json::from_slice(&session)
            .map_err(|error| StoreError::Rejected(error.to_string()))?;

        let mut data = Vec::new();
        for part in parts {
            let chunk = fs::read(dir.join(format!("{}.part", part.number)))
                .await
                .map_err(|_| StoreError::PartMismatch(part.number))?;
            if part_token(&chunk) != part.token {
                return Err(StoreError::PartMismatch(part.number));
            }
            data.extend_from_slice(&chunk);
        }

        let url = self.publish(&session.name, &data, &session.keys).await?;
        fs::remove_dir_all(&dir).await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn objects_are_indexed_by_key() {
        let root = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(root.path(), "https://assets.example/");

        assert!(matches!(
            store.lookup("sha256:00").await,
            Err(StoreError::NotFound)
        ));

        let url = store
            .upload_single("../../etc/passwd", b"data".to_vec(), &["sha256:00".to_string()])
            .await
            .unwrap();
        assert!(url.starts_with("https://assets.example/"));
        assert!(url.ends_with("/passwd"));
        assert_eq!(store.lookup("sha256:00").await.unwrap(), url);

        let id = url.split('/').nth(3).unwrap();
        let stored = std::fs::read(root.path().join("objects").join(id).join("passwd")).unwrap();
        assert_eq!(stored, b"data");
    }

    #[tokio::test]
    async fn multipart_session() {
        let root = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(root.path(), "file:///srv");

        let id = store
            .start_multipart("big.in", "text/plain", &["sha256:ff".to_string()])
            .await
            .unwrap();
        let first = store.upload_part(&id, 1, b"abc".to_vec()).await.unwrap();
        let second = store.upload_part(&id, 2, b"de".to_vec()).await.unwrap();

        let forged = store
            .complete_multipart(&id, &[Part { number: 1, token: second.clone() }])
            .await;
        assert!(matches!(forged, Err(StoreError::PartMismatch(1))));

        let url = store
            .complete_multipart(&id, &[
                Part { number: 1, token: first },
                Part { number: 2, token: second },
            ])
            .await
            .unwrap();
        assert_eq!(store.lookup("sha256:ff").await.unwrap(), url);
        assert!(!root.path().join("uploads").join(&id).exists());

        assert!(matches!(
            store.upload_part("not-a-session", 1, vec![]).await,
            Err(StoreError::UnknownUpload(_))
        ));
    }
}
