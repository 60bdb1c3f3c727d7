//! Concurrent publishing of package files.
//!
//! Test data is uploaded as one all-or-nothing batch: the first failure drops every upload still
//! in flight and fails the import. Auxiliary files (headers, attachments, images) are optional and
//! only logged when they cannot be published.

use crate::{
    errors::UploadError,
    problem::{
        program::File,
        snapshot::{Test, TestData},
    },
    upload::Uploader,
};
use futures_util::{stream, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Maximum number of uploads running at the same time.
pub const UPLOAD_CONCURRENCY: usize = 5;

/// Field of a test that receives the URL of an uploaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Input(usize),
    Answer(usize),
    ExampleInput(usize),
    ExampleAnswer(usize),
}

/// Test files waiting to be uploaded, each bound to the test field it fills.
#[derive(Debug, Default)]
pub struct TestUploads {
    jobs: Vec<(Slot, PathBuf)>,
}

impl TestUploads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: Slot, path: PathBuf) {
        self.jobs.push((slot, path));
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Uploads every queued file and writes the URLs into `tests`. Tests are only touched once
    /// all uploads have succeeded.
    pub async fn run(self, uploader: &Uploader, tests: &mut [Test]) -> Result<(), UploadError> {
        let urls: Vec<(Slot, String)> = stream::iter(self.jobs)
            .map(|(slot, path)| async move {
                let url = uploader.upload_file(&path).await?;
                Ok::<_, UploadError>((slot, url))
            })
            .buffer_unordered(UPLOAD_CONCURRENCY)
            .try_collect()
            .await?;

        for (slot, url) in urls {
            match slot {
                Slot::Input(test) => tests[test].input = TestData::Url(url),
                Slot::Answer(test) => tests[test].answer = TestData::Url(url),
                Slot::ExampleInput(test) => tests[test].example_input_url = Some(url),
                Slot::ExampleAnswer(test) => tests[test].example_answer_url = Some(url),
            }
        }

        Ok(())
    }
}

/// Uploads helper files with deduplication. Each becomes a [`File`] named after its file name;
/// failures are logged and skipped.
pub async fn helper_files(uploader: &Uploader, paths: Vec<PathBuf>, role: &str) -> Vec<File> {
    stream::iter(paths)
        .map(|path| async move {
            match uploader.upload_file(&path).await {
                Ok(url) => Some(File {
                    path: file_name(&path),
                    source_url: url,
                }),
                Err(err) => {
                    error!(%role, path = %path.display(), error = %err, "unable to upload extra file");
                    None
                }
            }
        })
        .buffered(UPLOAD_CONCURRENCY)
        .filter_map(|file| async move { file })
        .collect()
        .await
}

/// Publishes files verbatim under the given names and returns `(name, url)` pairs in input order.
/// Unreadable files and failed uploads are logged and skipped.
pub async fn publish_files(
    uploader: &Uploader,
    files: Vec<(String, PathBuf)>,
    role: &str,
) -> Vec<(String, String)> {
    stream::iter(files)
        .map(|(name, path)| async move {
            let data = match tokio::fs::read(&path).await {
                Ok(data) => data,
                Err(err) => {
                    error!(%role, path = %path.display(), error = %err, "unable to read file");
                    return None;
                }
            };
            match uploader.upload_bytes(&name, data).await {
                Ok(url) => Some((name, url)),
                Err(err) => {
                    error!(%role, path = %path.display(), error = %err, "unable to upload file");
                    None
                }
            }
        })
        .buffered(UPLOAD_CONCURRENCY)
        .filter_map(|published| async move { published })
        .collect()
        .await
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lower-cased extension without the dot.
pub fn extension(path: &Path) -> String {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

pub async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}

/// Reads a UTF-8 text file; invalid sequences are replaced.
pub async fn read_text(path: &Path) -> std::io::Result<String> {
    let data = tokio::fs::read(path).await?;
    Ok(match String::from_utf8(data) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), "file is not valid UTF-8");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

/// Regular files directly inside `dir`, sorted by name. A missing directory yields nothing.
pub async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    list_entries(dir, false).await
}

/// Subdirectories directly inside `dir`, sorted by name, skipping hidden ones.
pub async fn list_dirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    list_entries(dir, true).await
}

async fn list_entries(dir: &Path, dirs: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if dirs && file_type.is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
            found.push(entry.path());
        } else if !dirs && file_type.is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::memory::{MemoryStore, Phase};
    use std::sync::Arc;

    fn blank_test() -> Test {
        Test {
            testset_id: String::new(),
            index: 1,
            example: false,
            score: 0.0,
            input: TestData::Url(String::new()),
            answer: TestData::Url(String::new()),
            example_input_url: None,
            example_answer_url: None,
        }
    }

    #[tokio::test]
    async fn urls_land_in_their_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut uploads = TestUploads::new();
        for (i, name) in ["1.in", "1.ans", "2.in", "2.ans"].iter().enumerate() {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("data {i}\n")).unwrap();
            let test = i / 2;
            uploads.push(if i % 2 == 0 { Slot::Input(test) } else { Slot::Answer(test) }, path);
        }
        uploads.push(Slot::ExampleInput(0), dir.path().join("1.in"));

        let store = Arc::new(MemoryStore::new());
        let uploader = Uploader::new(store.clone());
        let mut tests = vec![blank_test(), blank_test()];
        uploads.run(&uploader, &mut tests).await.unwrap();

        for test in &tests {
            assert!(test.input.url().unwrap().ends_with(".in"));
            assert!(test.answer.url().unwrap().ends_with(".ans"));
        }
        assert!(tests[0].example_input_url.is_some());
        assert_eq!(tests[1].example_input_url, None);
    }

    #[tokio::test]
    async fn first_failure_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut uploads = TestUploads::new();
        let path = dir.path().join("1.in");
        std::fs::write(&path, "1\n").unwrap();
        uploads.push(Slot::Input(0), path);
        uploads.push(Slot::Answer(0), dir.path().join("missing.ans"));

        let store = Arc::new(MemoryStore::new());
        store.fail_on(Phase::Single);
        let uploader = Uploader::new(store);
        let mut tests = vec![blank_test()];
        assert!(uploads.run(&uploader, &mut tests).await.is_err());
        assert_eq!(tests[0], blank_test());
    }

    #[tokio::test]
    async fn optional_uploads_skip_failures() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("testlib.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let uploader = Uploader::new(Arc::new(MemoryStore::new()));
        let files = helper_files(
            &uploader,
            vec![dir.path().join("absent.h"), header.clone()],
            "checker",
        )
        .await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "testlib.h");

        let published = publish_files(
            &uploader,
            vec![
                ("grader.cpp".to_string(), header),
                ("gone".to_string(), dir.path().join("gone")),
            ],
            "attachment",
        )
        .await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "grader.cpp");
    }
}
