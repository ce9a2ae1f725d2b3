use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub aviationstack_api_key: Option<String>,
    pub aviationstack_base_url: String,
    pub geoapify_api_key: Option<String>,
    pub geoapify_base_url: String,
    pub openmeteo_base_url: String,
    pub messages_dir: String,
    pub bind_addr: String,
}

impl Config {
    /// Missing API keys stay `None` so the dependent route answers with
    /// a 500 instead of the whole server refusing to start.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            aviationstack_api_key: env::var("AVIATIONSTACK_API_KEY").ok(),
            aviationstack_base_url: env::var("AVIATIONSTACK_BASE_URL")
                .unwrap_or_else(|_| "http://api.aviationstack.com/v1".to_string()),
            geoapify_api_key: env::var("GEOAPIFY_API_KEY").ok(),
            geoapify_base_url: env::var("GEOAPIFY_BASE_URL")
                .unwrap_or_else(|_| "https://api.geoapify.com".to_string()),
            openmeteo_base_url: env::var("OPENMETEO_BASE_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com".to_string()),
            messages_dir: env::var("MESSAGES_DIR").unwrap_or_else(|_| "./db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            aviationstack_api_key: None,
            aviationstack_base_url: "http://127.0.0.1:1/v1".to_string(),
            geoapify_api_key: None,
            geoapify_base_url: "http://127.0.0.1:1".to_string(),
            openmeteo_base_url: "http://127.0.0.1:1".to_string(),
            messages_dir: "./db".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}
