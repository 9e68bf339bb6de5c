use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub generation_temperature: f32,
    pub openai_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let openai_base_url = get_env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        url::Url::parse(&openai_base_url).map_err(|e| {
            Error::Config(format!("Invalid value for OPENAI_BASE_URL: {}", e))
        })?;

        let generation_temperature =
            get_env_parse_or("GENERATION_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&generation_temperature) {
            return Err(Error::Config(format!(
                "GENERATION_TEMPERATURE must be within 0.0..=2.0, got {}",
                generation_temperature
            )));
        }

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            openai_api_key: get_env("OPENAI_API_KEY")?,
            openai_base_url: openai_base_url.trim_end_matches('/').to_string(),
            openai_model: get_env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            generation_temperature,
            openai_timeout_secs: get_env_parse_or("OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Configuration with defaults and a placeholder key, for wiring tests.
    pub fn for_tests() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            generation_temperature: DEFAULT_TEMPERATURE,
            openai_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
