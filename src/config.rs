use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Deserialize)]
pub struct StoreConfig {
    /// Directory holding uploaded objects.
    pub root: String,
    /// Prefix of the URLs handed out for stored objects.
    pub base_url: String,
}

#[derive(Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directives, used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}
