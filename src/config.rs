use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration.
///
/// Values are layered: built-in defaults, then process environment variables
/// named after the fields in upper case (`PORT`, `DATABASE_URL`, `SECRET_KEY`,
/// ...). `main` loads a `.env` file into the environment first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    /// Token lifetime, e.g. `24h`, `30m`, `7d`
    pub jwt_expires_in: String,
    /// Directory uploaded images are written to
    pub media_root: PathBuf,
    /// URL prefix stored images are served under
    pub media_url: String,
    pub cors_allow_origin: String,
    /// Maximum accepted size of an uploaded image, in bytes
    pub max_upload_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "sqlite://recipe.db".to_string(),
            secret_key: "change-me".to_string(),
            jwt_expires_in: "24h".to_string(),
            media_root: PathBuf::from("media"),
            media_url: "/media".to_string(),
            cors_allow_origin: "*".to_string(),
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(::config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;

        if config.secret_key == Config::default().secret_key {
            tracing::warn!("SECRET_KEY is not set, using the built-in development key");
        }

        Ok(config)
    }

    /// Public URL of a stored media file, given its path relative to `media_root`.
    pub fn media_file_url(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.media_url.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }
}
