use anyhow::{bail, Context, Result};

use crate::export::{MAX_RASTER_SCALE, MIN_RASTER_SCALE};
use crate::layout::PageFormat;
use crate::render::Template;
use crate::storage::DEFAULT_STORAGE_KEY;

/// Where the resume record is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis { url: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub storage_key: String,
    pub port: u16,
    pub rust_log: String,
    pub page_format: PageFormat,
    pub raster_scale: f32,
    pub default_template: Template,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "redis" => StoreBackend::Redis {
                url: lookup("REDIS_URL")
                    .context("Required environment variable 'REDIS_URL' is not set")?,
            },
            other => bail!("STORE_BACKEND must be 'memory' or 'redis', got '{other}'"),
        };

        let raster_scale = match lookup("RASTER_SCALE") {
            Some(raw) => raw
                .parse::<f32>()
                .context("RASTER_SCALE must be a number")?,
            None => MIN_RASTER_SCALE,
        };
        if !(MIN_RASTER_SCALE..=MAX_RASTER_SCALE).contains(&raster_scale) {
            bail!(
                "RASTER_SCALE must be between {MIN_RASTER_SCALE} and {MAX_RASTER_SCALE}, got {raster_scale}"
            );
        }

        Ok(Config {
            store,
            storage_key: lookup("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            page_format: match lookup("PAGE_FORMAT") {
                Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
                None => PageFormat::A4,
            },
            raster_scale,
            default_template: match lookup("DEFAULT_TEMPLATE") {
                Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
                None => Template::Classic,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.storage_key, "resume_data_v1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.page_format, PageFormat::A4);
        assert_eq!(config.raster_scale, 2.0);
        assert_eq!(config.default_template, Template::Classic);
    }

    #[test]
    fn test_redis_requires_url() {
        assert!(config_from(&[("STORE_BACKEND", "redis")]).is_err());
        let config = config_from(&[
            ("STORE_BACKEND", "redis"),
            ("REDIS_URL", "redis://localhost:6379"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Redis {
                url: "redis://localhost:6379".to_string()
            }
        );
    }

    #[test]
    fn test_scale_outside_supported_range_rejected() {
        assert!(config_from(&[("RASTER_SCALE", "1.5")]).is_err());
        assert!(config_from(&[("RASTER_SCALE", "8")]).is_err());
        assert_eq!(config_from(&[("RASTER_SCALE", "3")]).unwrap().raster_scale, 3.0);
    }

    #[test]
    fn test_page_format_and_template_parse() {
        let config = config_from(&[("PAGE_FORMAT", "letter"), ("DEFAULT_TEMPLATE", "modern")]).unwrap();
        assert_eq!(config.page_format, PageFormat::Letter);
        assert_eq!(config.default_template, Template::Modern);
        assert!(config_from(&[("PAGE_FORMAT", "a3")]).is_err());
    }
}
