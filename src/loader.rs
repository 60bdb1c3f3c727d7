use crate::{
    catalog::Catalog, errors::Result, kattis::converter::KattisLoader,
    polygon::converter::PolygonLoader, problem::snapshot::Snapshot, upload::Uploader,
};
use async_trait::async_trait;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Turns an unpacked problem package into a [`Snapshot`].
#[async_trait]
pub trait ProblemLoader: Send + Sync {
    async fn snapshot(&self, root: &Path) -> Result<Snapshot>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Polygon,
    Kattis,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polygon" => Ok(Format::Polygon),
            "kattis" => Ok(Format::Kattis),
            _ => Err(format!("unknown package format {s:?}, expected polygon or kattis")),
        }
    }
}

impl Format {
    pub fn loader(self, uploader: Uploader, catalog: Arc<Catalog>) -> Box<dyn ProblemLoader> {
        match self {
            Format::Polygon => Box::new(PolygonLoader::new(uploader, catalog)),
            Format::Kattis => Box::new(KattisLoader::new(uploader, catalog)),
        }
    }
}
