use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_KEY_FIELD: &str = "id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub client: ClientConfig,
}

/// Where the resource lives and how its records are identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the resource, e.g. `http://localhost:3000/users`.
    pub url: String,
    /// Record identifier field used by byKey, update and remove.
    #[serde(default = "default_key")]
    pub key: String,
    /// Fail on filters or sorts that cannot be compiled instead of dropping them.
    #[serde(default)]
    pub strict: bool,
    /// Options for the grid-side data source; carried along untouched.
    #[serde(flatten)]
    pub options: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub timeout_secs: Option<u64>,
}

fn default_key() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: default_key(),
            strict: false,
            options: HashMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn passthrough(&self) -> &HashMap<String, Value> {
        &self.options
    }
}

impl From<&str> for StoreConfig {
    fn from(url: &str) -> Self {
        StoreConfig::new(url)
    }
}

impl From<String> for StoreConfig {
    fn from(url: String) -> Self {
        StoreConfig::new(url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new("http://127.0.0.1:3000/items")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Some(30),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `grid-store` file and
    /// `GRID_*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("grid-store").required(false));

        config = config.add_source(Self::environment());

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    // GRID_STORE__URL, GRID_STORE__KEY, GRID_CLIENT__TIMEOUT_SECS ...
    fn environment() -> config::Environment {
        config::Environment::with_prefix("GRID")
            .separator("__")
            .prefix_separator("_")
            .try_parsing(true)
    }
}
