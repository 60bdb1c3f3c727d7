use serde::{Deserialize, Serialize};

/// A program executed by the judge: checker, validator, interactor, script or template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub runtime: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

/// An auxiliary file placed next to a program, e.g. a testlib header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    pub source_url: String,
}

impl Program {
    pub fn new(runtime: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            source: source.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<File>) -> Self {
        self.files = files;
        self
    }
}
