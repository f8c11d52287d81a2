use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().unwrap()
    }
}

/// Where rating triples come from. `kind` selects the backend; the unused
/// fields of the other backend are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Delimited text file of `user,item,rating` rows.
    pub path: String,
    /// Postgres connection string.
    pub url: String,
    pub table: String,
    pub user_column: String,
    pub item_column: String,
    pub preference_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub default_threshold: f64,
    pub default_limit: usize,
    pub max_limit: usize,
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            source: SourceConfig {
                kind: SourceKind::File,
                path: "data/ratings.csv".to_string(),
                url: "postgresql://localhost:5432/likemind".to_string(),
                table: "ratings".to_string(),
                user_column: "user_id".to_string(),
                item_column: "item_id".to_string(),
                preference_column: "preference".to_string(),
            },
            recommender: RecommenderConfig {
                default_threshold: 0.1,
                default_limit: 1,
                max_limit: 100,
                request_timeout_ms: 2000,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("LIKEMIND"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
