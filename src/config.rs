use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the broadcast schedule source
    #[serde(default = "default_schedule_api_url")]
    pub schedule_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Page size for taste listings
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum number of proposals produced per selection pass
    #[serde(default = "default_proposal_cap")]
    pub proposal_cap: usize,
}

fn default_schedule_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_page_size() -> usize {
    10
}

fn default_proposal_cap() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_api_url: default_schedule_api_url(),
            host: default_host(),
            port: default_port(),
            page_size: default_page_size(),
            proposal_cap: default_proposal_cap(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
