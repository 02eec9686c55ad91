use serde::Deserialize;
use std::path::PathBuf;
use url::{Host, Url};

//--------------------------------------------------------------------------------------------------
// Config to be read from file
//--------------------------------------------------------------------------------------------------

const DEFAULT_API_BASE_URL: &str = "https://localhost:44390/api/v1/authentication";
const DEFAULT_TOKEN_PATH: &str = ".hotelctl-token";

#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    pub token_path: Option<String>,
    // Unset means "decide from the API host"
    pub local_development: Option<bool>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name("config.local").required(false))
            .add_source(config::Environment::with_prefix("HOTELCTL").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn token_path(&self) -> PathBuf {
        PathBuf::from(self.token_path.as_deref().unwrap_or(DEFAULT_TOKEN_PATH))
    }

    pub fn is_local_development(&self) -> bool {
        if let Some(local_development) = self.local_development {
            return local_development;
        }

        let Ok(url) = Url::parse(&self.api_base_url) else {
            return false;
        };

        match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        }
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
