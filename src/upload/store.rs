use crate::errors::StoreError;
use async_trait::async_trait;

/// A part of a multipart upload acknowledged by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub number: u32,
    pub token: String,
}

/// Remote blob storage the importer publishes assets to.
///
/// Objects can be registered under lookup keys when they are created; [`AssetStore::lookup`]
/// resolves such a key back to the object URL.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<String, StoreError>;

    async fn upload_single(
        &self,
        name: &str,
        data: Vec<u8>,
        keys: &[String],
    ) -> Result<String, StoreError>;

    /// Returns the upload id.
    async fn start_multipart(
        &self,
        name: &str,
        content_type: &str,
        keys: &[String],
    ) -> Result<String, StoreError>;

    /// Returns the token the part must be referenced by on completion.
    async fn upload_part(
        &self,
        upload_id: &str,
        number: u32,
        data: Vec<u8>,
    ) -> Result<String, StoreError>;

    async fn complete_multipart(&self, upload_id: &str, parts: &[Part])
        -> Result<String, StoreError>;
}
