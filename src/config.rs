use std::time::Duration;

/// Process-wide settings, read once at startup and handed to the orchestrator by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub random_user_url: String,
    pub countries_base_url: String,
    pub exchange_base_url: String,
    pub news_base_url: String,
    /// Credential for the exchange-rate upstream. `None` disables the currency branch.
    pub exchange_api_key: Option<String>,
    /// Credential for the news upstream. `None` disables the news branch.
    pub news_api_key: Option<String>,
    /// Upper bound for every single upstream call.
    pub upstream_timeout: Duration,
    pub static_dir: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            random_user_url: url_var("RANDOM_USER_URL", "https://randomuser.me/api/")?,
            countries_base_url: url_var("COUNTRIES_BASE_URL", "https://restcountries.com/v3.1")?,
            exchange_base_url: url_var(
                "EXCHANGE_BASE_URL",
                "https://v6.exchangerate-api.com/v6",
            )?,
            news_base_url: url_var("NEWS_BASE_URL", "https://newsapi.org/v2")?,
            exchange_api_key: optional_secret("EXCHANGE_API_KEY"),
            news_api_key: optional_secret("NEWS_API_KEY"),
            upstream_timeout: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "8".to_string())
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a whole number"))
                .and_then(|secs| {
                    if !(1..=60).contains(&secs) {
                        anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be between 1 and 60");
                    }
                    Ok(Duration::from_secs(secs))
                })?,
            static_dir: std::env::var("STATIC_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "public".to_string()),
            rate_limit_per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a positive number"))?,
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))?,
        };

        // Never log the credentials themselves
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Random user URL: {}", config.random_user_url);
        tracing::debug!("Countries base URL: {}", config.countries_base_url);
        tracing::debug!("Exchange base URL: {}", config.exchange_base_url);
        tracing::debug!("News base URL: {}", config.news_base_url);
        tracing::debug!("Upstream timeout: {:?}", config.upstream_timeout);
        tracing::debug!("Server Port: {}", config.port);
        if config.exchange_api_key.is_none() {
            tracing::warn!("EXCHANGE_API_KEY not set, exchange rates will be unavailable");
        }
        if config.news_api_key.is_none() {
            tracing::warn!("NEWS_API_KEY not set, news headlines will be unavailable");
        }

        Ok(config)
    }
}

fn url_var(name: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(name).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url)
}

fn optional_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_var_rejects_non_http_scheme() {
        std::env::set_var("TEST_URL_VAR_FTP", "ftp://example.com");
        assert!(url_var("TEST_URL_VAR_FTP", "https://fallback.test").is_err());
    }

    #[test]
    fn test_url_var_falls_back_to_default() {
        let url = url_var("TEST_URL_VAR_UNSET", "https://fallback.test").unwrap();
        assert_eq!(url, "https://fallback.test");
    }

    #[test]
    fn test_blank_secret_counts_as_unset() {
        std::env::set_var("TEST_BLANK_SECRET", "   ");
        assert_eq!(optional_secret("TEST_BLANK_SECRET"), None);

        std::env::set_var("TEST_PRESENT_SECRET", "abc123");
        assert_eq!(
            optional_secret("TEST_PRESENT_SECRET"),
            Some("abc123".to_string())
        );
    }
}
