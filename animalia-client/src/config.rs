use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TOKEN_PATH: &str = ".animalia/tokens.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Page size must be at least 1")]
    ZeroPageSize,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token_path: PathBuf,
    pub page_size: u32,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl {
            url: api_url.to_owned(),
            reason: e.to_string(),
        })?;

        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: api_url.to_string(),
                reason: "not usable as a base URL".to_owned(),
            });
        }

        Ok(Self {
            api_url,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    #[must_use]
    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        self.page_size = page_size;
        Ok(self)
    }
}
