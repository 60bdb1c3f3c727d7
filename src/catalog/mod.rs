//! Lookup tables shared by the importers: runtimes, languages, locales and topics.
//!
//! A [`Catalog`] is immutable once built and handed to every loader behind an `Arc`, so tests can
//! swap in their own tables.

mod languages;
mod topics;

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    polygon_runtimes: HashMap<String, String>,
    extensions: HashMap<String, String>,
    languages_by_extension: HashMap<String, String>,
    default_runtimes: HashMap<String, String>,
    template_runtimes: BTreeMap<String, Vec<String>>,
    locales: HashMap<String, String>,
    topics: HashMap<String, Vec<String>>,
}

fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

impl Catalog {
    /// Tables the importer ships with.
    pub fn builtin() -> Self {
        let mut languages_by_extension: HashMap<String, String> = languages::EXTENSIONS
            .iter()
            .map(|(language, extension)| (extension.to_string(), language.to_string()))
            .collect();
        languages_by_extension.extend(table(languages::EXTENSION_ALIASES));

        Self {
            polygon_runtimes: table(languages::POLYGON_RUNTIMES),
            extensions: table(languages::EXTENSIONS),
            languages_by_extension,
            default_runtimes: table(languages::DEFAULT_RUNTIMES),
            template_runtimes: languages::TEMPLATE_RUNTIMES
                .iter()
                .map(|(language, runtimes)| {
                    (
                        language.to_string(),
                        runtimes.iter().map(|runtime| runtime.to_string()).collect(),
                    )
                })
                .collect(),
            locales: table(languages::LOCALES),
            topics: topics::TAG_TOPICS
                .iter()
                .map(|(tag, ids)| (tag.to_string(), ids.iter().map(|id| id.to_string()).collect()))
                .collect(),
        }
    }

    pub fn with_polygon_runtime(mut self, source_type: &str, runtime: &str) -> Self {
        self.polygon_runtimes
            .insert(source_type.to_string(), runtime.to_string());
        self
    }

    pub fn with_language(mut self, language: &str, extension: &str, runtime: &str) -> Self {
        self.extensions
            .insert(language.to_string(), extension.to_string());
        self.languages_by_extension
            .insert(extension.to_string(), language.to_string());
        self.default_runtimes
            .insert(language.to_string(), runtime.to_string());
        self
    }

    pub fn with_topics(mut self, tag: &str, topics: &[&str]) -> Self {
        self.topics.insert(
            tag.to_lowercase(),
            topics.iter().map(|topic| topic.to_string()).collect(),
        );
        self
    }

    /// Runtime for a Polygon source type such as `cpp.g++17`.
    pub fn polygon_runtime(&self, source_type: &str) -> Option<&str> {
        self.polygon_runtimes.get(source_type).map(String::as_str)
    }

    /// Language of a file extension given without the leading dot, case-insensitively.
    pub fn language_of_extension(&self, extension: &str) -> Option<&str> {
        self.languages_by_extension
            .get(&extension.to_lowercase())
            .map(String::as_str)
    }

    pub fn extension_of_language(&self, language: &str) -> Option<&str> {
        self.extensions.get(language).map(String::as_str)
    }

    pub fn runtime_of_language(&self, language: &str) -> Option<&str> {
        self.default_runtimes.get(language).map(String::as_str)
    }

    /// Languages with published templates, in language order, with their runtimes.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.template_runtimes
            .iter()
            .map(|(language, runtimes)| (language.as_str(), runtimes.as_slice()))
    }

    /// Locale code for a statement language name such as `english`.
    pub fn locale(&self, language: &str) -> Option<&str> {
        self.locales.get(language).map(String::as_str)
    }

    /// Topic ids for a set of free-form tags. Unknown tags are ignored, the result is sorted and
    /// de-duplicated.
    pub fn topics<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut topics = BTreeSet::new();
        for tag in tags {
            if let Some(ids) = self.topics.get(&tag.to_lowercase()) {
                topics.extend(ids.iter().cloned());
            }
        }
        topics.into_iter().collect()
    }
}

/// Language part of a runtime id, e.g. `cpp` for `cpp:17-gnu10`.
pub fn language_of_runtime(runtime: &str) -> &str {
    runtime.split(':').next().unwrap_or(runtime)
}

/// C and C++ programs carry their `.h` neighbours as auxiliary files.
pub fn uses_headers(language: &str) -> bool {
    matches!(language, "c" | "cpp")
}
