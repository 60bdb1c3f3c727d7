use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sunwalker_importer::{
    errors::UploadError,
    upload::{
        memory::{Call, MemoryStore, Phase},
        uploader::CHUNK_SIZE,
        Uploader,
    },
};

fn write(dir: &Path, name: &str, data: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn setup() -> (tempfile::TempDir, Arc<MemoryStore>, Uploader) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let uploader = Uploader::new(store.clone());
    (dir, store, uploader)
}

#[tokio::test]
async fn same_content_is_uploaded_once() {
    let (dir, store, uploader) = setup();
    let path = write(dir.path(), "01", "1 2\n");

    let first = uploader.upload_file(&path).await.unwrap();
    let second = uploader.upload_file(&path).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.single_uploads(), 1);
    assert_eq!(store.lookups(), 2);
    assert_eq!(store.object(&first).unwrap(), b"1 2\n");
}

#[tokio::test]
async fn line_endings_do_not_change_the_key() {
    let (dir, store, uploader) = setup();
    let unix = write(dir.path(), "unix.txt", "1\n2\n");
    let windows = write(dir.path(), "windows.txt", "1\r\n2\r\n");
    let mac = write(dir.path(), "mac.txt", "1\r2\r");

    let url = uploader.upload_file(&windows).await.unwrap();
    assert_eq!(uploader.upload_file(&unix).await.unwrap(), url);
    assert_eq!(uploader.upload_file(&mac).await.unwrap(), url);

    assert_eq!(store.single_uploads(), 1);
    assert_eq!(store.object(&url).unwrap(), b"1\n2\n");
}

#[tokio::test]
async fn known_key_skips_the_upload() {
    let (dir, store, uploader) = setup();
    let path = write(dir.path(), "answer", "hello\r\n");
    let key = format!("sha256:{}", hex::encode(Sha256::digest(b"hello\n")));
    store.preload(&key, "https://assets.example/hello");

    let url = uploader.upload_file(&path).await.unwrap();

    assert_eq!(url, "https://assets.example/hello");
    assert_eq!(store.calls(), vec![Call::Lookup { key }]);
}

#[tokio::test]
async fn empty_file_has_no_url() {
    let (dir, store, uploader) = setup();
    let path = write(dir.path(), "empty", "");

    assert_eq!(uploader.upload_file(&path).await.unwrap(), "");
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn chunk_sized_file_is_uploaded_in_one_request() {
    let (dir, store, uploader) = setup();
    let path = write(dir.path(), "exact", vec![b'x'; CHUNK_SIZE]);

    uploader.upload_file(&path).await.unwrap();

    assert_eq!(store.single_uploads(), 1);
    assert_eq!(store.parts_uploaded(), 0);
}

#[tokio::test]
async fn large_file_is_uploaded_in_parts() {
    let (dir, store, uploader) = setup();
    let path = write(dir.path(), "big.in", vec![b'7'; CHUNK_SIZE + 1000]);

    let url = uploader.upload_file(&path).await.unwrap();

    let parts: Vec<(u32, usize)> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Part { number, size, .. } => Some((number, size)),
            _ => None,
        })
        .collect();
    assert_eq!(parts, vec![(1, CHUNK_SIZE), (2, 1000)]);
    assert_eq!(store.completed_uploads(), 1);
    assert_eq!(store.single_uploads(), 0);
    assert_eq!(store.object(&url).unwrap().len(), CHUNK_SIZE + 1000);

    // The completed object is registered under its key
    assert_eq!(uploader.upload_file(&path).await.unwrap(), url);
    assert_eq!(store.parts_uploaded(), 2);
}

#[tokio::test]
async fn large_file_is_normalized_before_splitting() {
    let (dir, store, uploader) = setup();
    let mut data = Vec::new();
    let lines = CHUNK_SIZE * 2 / 6 + 1;
    for _ in 0..lines {
        data.extend_from_slice(b"12345\r\n");
    }
    let path = write(dir.path(), "crlf.in", &data);
    assert!(data.len() > CHUNK_SIZE * 2);

    let url = uploader.upload_file(&path).await.unwrap();

    let object = store.object(&url).unwrap();
    assert_eq!(object.len(), lines * 6);
    assert!(!object.contains(&b'\r'));
    assert_eq!(store.parts_uploaded(), 3);
    assert_eq!(store.bytes_received(), lines * 6);
}

#[tokio::test]
async fn raw_bytes_are_published_verbatim() {
    let (_dir, store, uploader) = setup();

    let url = uploader
        .upload_bytes("pic.png", b"\x89PNG\r\n".to_vec())
        .await
        .unwrap();

    assert!(url.ends_with("/pic.png"));
    assert_eq!(store.object(&url).unwrap(), b"\x89PNG\r\n");
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn failures_name_the_phase() {
    let (dir, _, _) = setup();
    let small = write(dir.path(), "small", "1\n");
    let big = write(dir.path(), "big", vec![b'1'; CHUNK_SIZE + 1]);

    let failing = |phase| {
        let store = Arc::new(MemoryStore::new());
        store.fail_on(phase);
        Uploader::new(store)
    };

    assert!(matches!(
        failing(Phase::Single).upload_file(&small).await,
        Err(UploadError::Single { name, .. }) if name == "small"
    ));
    assert!(matches!(
        failing(Phase::Start).upload_file(&big).await,
        Err(UploadError::Start { .. })
    ));
    assert!(matches!(
        failing(Phase::Part).upload_file(&big).await,
        Err(UploadError::Part { part: 1, .. })
    ));
    assert!(matches!(
        failing(Phase::Complete).upload_file(&big).await,
        Err(UploadError::Complete { .. })
    ));

    let (_, _, uploader) = setup();
    assert!(matches!(
        uploader.upload_file(&dir.path().join("missing")).await,
        Err(UploadError::Read { .. })
    ));
}
