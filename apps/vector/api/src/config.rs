use core_config::{AppInfo, FromEnv, app_info, env_optional, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_vector::{QdrantConfig, VectorConfig};

pub use core_config::Environment;

/// Application configuration composed from the shared config components.
///
/// A backend whose URL variable is unset runs in memory.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub vector: VectorConfig,
    /// `Some` when `QDRANT_URL` is set
    pub qdrant: Option<QdrantConfig>,
    /// `Some` when `DATABASE_URL` is set
    pub database: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let qdrant = match env_optional("QDRANT_URL") {
            Some(_) => Some(QdrantConfig::from_env()?),
            None => None,
        };
        let database = match env_optional("DATABASE_URL") {
            Some(_) => Some(PostgresConfig::from_env()?),
            None => None,
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            vector: VectorConfig::from_env()?,
            qdrant,
            database,
        })
    }
}
