use anyhow::{Context, Result};
use std::env;
use tracing::{info, warn};

use crate::models::{AdmissionConfig, DEFAULT_DENIED_EXTENSIONS};

const DEFAULT_ALLOWED_FILE_TYPES: &str = "application/pdf;text/csv";
const DEFAULT_MAX_FILE_SIZE_KB: &str = "10240";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// `;`-delimited MIME allow-list, as configured.
    pub allowed_file_types: String,
    /// Maximum upload size in kilobytes, as configured.
    pub max_file_size_kb: String,
    pub denied_file_extensions: String,
    pub max_concurrent_requests: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_source(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = match lookup("PORT") {
            Some(_) => Self::parse_var(&lookup, "PORT", 8080),
            None => Self::parse_var(&lookup, "SERVER_PORT", 8080),
        };

        let config = Config {
            server_host: Self::string_var(&lookup, "SERVER_HOST", "0.0.0.0"),
            server_port,
            allowed_file_types: Self::string_var(
                &lookup,
                "ALLOWED_FILE_TYPES",
                DEFAULT_ALLOWED_FILE_TYPES,
            ),
            max_file_size_kb: Self::string_var(
                &lookup,
                "MAX_FILE_SIZE_KB",
                DEFAULT_MAX_FILE_SIZE_KB,
            ),
            denied_file_extensions: Self::string_var(
                &lookup,
                "DENIED_FILE_EXTENSIONS",
                &DEFAULT_DENIED_EXTENSIONS.join(";"),
            ),
            max_concurrent_requests: Self::parse_var(&lookup, "MAX_CONCURRENT_REQUESTS", 100),
            log_format: LogFormat::from_value(lookup("LOG_FORMAT").as_deref()),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn string_var<F>(lookup: &F, var_name: &str, default: &str) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(var_name) {
            Some(val) if !val.trim().is_empty() => val,
            _ => {
                info!("{} not set, using default: {}", var_name, default);
                default.to_string()
            }
        }
    }

    fn parse_var<F, T>(lookup: &F, var_name: &str, default: T) -> T
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match lookup(var_name) {
            Some(val) => match val.trim().parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    default
                }
            },
            None => {
                info!("{} not set, using default: {:?}", var_name, default);
                default
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_REQUESTS must be greater than 0"));
        }
        let admission = self.admission()?;
        if admission.max_size_kb <= 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_KB must be greater than 0"));
        }
        if admission.allowed_types.is_empty() {
            warn!("ALLOWED_FILE_TYPES is empty; every upload will be rejected by type");
        }
        Ok(())
    }

    /// Parses the raw admission parameters.
    pub fn admission(&self) -> Result<AdmissionConfig> {
        let config = AdmissionConfig::from_params(&self.allowed_file_types, &self.max_file_size_kb)
            .context("Failed to parse MAX_FILE_SIZE_KB")?;
        Ok(config.with_denied_extensions(&self.denied_file_extensions))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
