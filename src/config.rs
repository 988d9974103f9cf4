use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub include_answers: bool,
    pub auto_submit_on_timeout: bool,
    pub certificate_poll_interval_ms: u64,
    pub certificate_max_polls: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            api_token: None,
            request_timeout_secs: 30,
            include_answers: true,
            auto_submit_on_timeout: false,
            certificate_poll_interval_ms: 2000,
            certificate_max_polls: 10,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let mut config = Self::new(&get_env("HOMECARE_API_BASE_URL")?)?;
        config.api_token = env::var("HOMECARE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        if let Some(v) = get_env_parse_opt("HOMECARE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout_secs = v;
        }
        if let Some(v) = get_env_parse_opt("HOMECARE_INCLUDE_ANSWERS")? {
            config.include_answers = v;
        }
        if let Some(v) = get_env_parse_opt("HOMECARE_AUTO_SUBMIT_ON_TIMEOUT")? {
            config.auto_submit_on_timeout = v;
        }
        if let Some(v) = get_env_parse_opt("HOMECARE_CERTIFICATE_POLL_INTERVAL_MS")? {
            config.certificate_poll_interval_ms = v;
        }
        if let Some(v) = get_env_parse_opt("HOMECARE_CERTIFICATE_MAX_POLLS")? {
            config.certificate_max_polls = v;
        }
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn certificate_poll_interval(&self) -> Duration {
        Duration::from_millis(self.certificate_poll_interval_ms)
    }

    /// Resolves an API path such as `/exams-v2/42` against the base URL,
    /// keeping any path prefix the base URL carries (e.g. `/api`).
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        let joined = format!("{}/{}", base, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid HOMECARE_API_BASE_URL {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "Unsupported scheme '{}' for API base URL",
            other
        ))),
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(None),
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let config = Config::new("https://care.example.org/api/").unwrap();
        assert_eq!(
            config.endpoint("/exams-v2/7").unwrap().as_str(),
            "https://care.example.org/api/exams-v2/7"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(Config::new("ftp://care.example.org"), Err(Error::Config(_))));
        assert!(matches!(Config::new("not a url"), Err(Error::Config(_))));
    }

    #[test]
    fn defaults_leave_timeout_enforcement_off() {
        let config = Config::new("http://localhost:4000").unwrap();
        assert!(!config.auto_submit_on_timeout);
        assert!(config.include_answers);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
