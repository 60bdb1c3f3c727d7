use crate::{problem::assets, upload::Uploader};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Component, Path};
use tracing::{debug, warn};

lazy_static! {
    static ref INCLUDE_GRAPHICS: Regex = Regex::new(r"(\\includegraphics.*?\{)(.+?)(\})").unwrap();
}

// Image references must stay inside the statement directory.
fn is_local(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Uploads images referenced by `\includegraphics` relative to `dir` and points every reference
/// at the published URL. Each distinct file name is uploaded once. References that are already
/// URLs, point outside `dir` or cannot be published are left as they are.
pub async fn publish_images(uploader: &Uploader, dir: &Path, text: &str) -> String {
    let mut names: Vec<String> = Vec::new();
    for captures in INCLUDE_GRAPHICS.captures_iter(text) {
        let name = &captures[2];
        if name.contains("://") || names.iter().any(|known| known == name) {
            continue;
        }
        if !is_local(name) {
            warn!(image = %name, "skipping image outside the statement directory");
            continue;
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        return text.to_string();
    }

    let files = names
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            (name, path)
        })
        .collect();
    let urls: HashMap<String, String> = assets::publish_files(uploader, files, "image")
        .await
        .into_iter()
        .collect();

    for (name, url) in &urls {
        debug!(image = %name, %url, "image published");
    }

    INCLUDE_GRAPHICS
        .replace_all(text, |captures: &Captures| match urls.get(&captures[2]) {
            Some(url) => format!("{}{}{}", &captures[1], url, &captures[3]),
            None => captures[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn repeated_image_is_uploaded_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"\x89PNG").unwrap();

        let store = Arc::new(MemoryStore::new());
        let uploader = Uploader::new(store.clone());
        let text = r"\includegraphics[width=5cm]{pic.png} and \includegraphics{pic.png}";
        let rewritten = publish_images(&uploader, dir.path(), text).await;

        assert_eq!(store.single_uploads(), 1);
        assert!(!rewritten.contains("{pic.png}"));
        assert_eq!(rewritten.matches("memory://").count(), 2);
        assert!(rewritten.starts_with(r"\includegraphics[width=5cm]{memory://"));
    }

    #[tokio::test]
    async fn rewriting_twice_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();

        let store = Arc::new(MemoryStore::new());
        let uploader = Uploader::new(store.clone());
        let once = publish_images(&uploader, dir.path(), r"\includegraphics{a.png}").await;
        let twice = publish_images(&uploader, dir.path(), &once).await;

        assert_eq!(once, twice);
        assert_eq!(store.single_uploads(), 1);
    }

    #[tokio::test]
    async fn images_outside_the_directory_are_not_read() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("statement");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(root.path().join("secret.png"), b"secret").unwrap();

        let store = Arc::new(MemoryStore::new());
        let uploader = Uploader::new(store.clone());
        let secret = root.path().join("secret.png");
        let text = format!(
            r"\includegraphics{{../secret.png}} \includegraphics{{{}}}",
            secret.display()
        );

        assert_eq!(publish_images(&uploader, &dir, &text).await, text);
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn local_names() {
        assert!(is_local("pic.png"));
        assert!(is_local("./img/pic.png"));
        assert!(!is_local("img/../../pic.png"));
        assert!(!is_local("/etc/passwd"));
    }

    #[tokio::test]
    async fn missing_image_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = Uploader::new(Arc::new(MemoryStore::new()));
        let text = r"see \includegraphics{nope.png}";
        assert_eq!(publish_images(&uploader, dir.path(), text).await, text);
    }
}
