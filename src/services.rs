use crate::config::Config;
use crate::errors::AppError;
use crate::models::{CountryFacts, ExchangeRates, Identity, NewsHeadline, MAX_HEADLINES};
use crate::upstream_client::{settle, UpstreamClient, UpstreamError, UpstreamRequest};
use crate::upstream_models::{
    headlines_from_articles, CountryResponse, ExchangeRateResponse, NewsResponse,
    RandomUserResponse,
};
use reqwest::header::HeaderName;
use url::Url;

/// Appends `segments` to `base`, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = Url::parse(base)
        .map_err(|e| UpstreamError::InvalidRequest(format!("bad base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidRequest(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ============ Identity ============

pub struct IdentityService {
    client: UpstreamClient,
    url: String,
}

impl IdentityService {
    pub fn new(config: &Config, client: UpstreamClient) -> Self {
        Self {
            client,
            url: config.random_user_url.clone(),
        }
    }

    /// Fetches one random person. This is the only call whose failure fails the request.
    pub async fn fetch(&self) -> Result<Identity, AppError> {
        let url = Url::parse(&self.url)
            .map_err(|e| UpstreamError::InvalidRequest(format!("bad identity URL: {}", e)))?;
        let request = UpstreamRequest::get("identity", url);

        let raw = self
            .client
            .call::<RandomUserResponse>(&request)
            .await?
            .ok_or_else(|| {
                AppError::InvalidUpstreamData("identity upstream returned no user".to_string())
            })?;

        let identity = Identity::from(raw);
        tracing::info!(
            "Fetched identity {} {} from {}",
            identity.first_name,
            identity.last_name,
            identity.country
        );
        Ok(identity)
    }
}

// ============ Country ============

pub struct CountryService {
    client: UpstreamClient,
    base_url: String,
}

impl CountryService {
    pub fn new(config: &Config, client: UpstreamClient) -> Self {
        Self {
            client,
            base_url: config.countries_base_url.clone(),
        }
    }

    /// Builds `{base}/name/{country}?fullText=true` so that "Niger" never matches "Nigeria".
    pub fn request_for(&self, country_name: &str) -> Result<UpstreamRequest, UpstreamError> {
        let mut url = endpoint(&self.base_url, &["name", country_name])?;
        url.query_pairs_mut()
            .append_pair("fullText", "true")
            .append_pair("fields", "name,capital,languages,currencies,flags");
        Ok(UpstreamRequest::get("country", url))
    }

    /// Resolves country facts, or `None` when the upstream has no exact match or fails.
    pub async fn lookup(&self, country_name: &str) -> Option<CountryFacts> {
        tracing::info!("Looking up country facts for {}", country_name);

        let outcome = match self.request_for(country_name) {
            Ok(request) => self.client.call::<CountryResponse>(&request).await,
            Err(e) => Err(e),
        };

        let facts = settle("country", outcome).map(CountryFacts::from)?;
        tracing::debug!(
            "Country facts for {}: capital={}, currency_code={:?}",
            country_name,
            facts.capital,
            facts.currency_code
        );
        Some(facts)
    }
}

// ============ Exchange rates ============

pub struct ExchangeRateService {
    client: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateService {
    pub fn new(config: &Config, client: UpstreamClient) -> Self {
        Self {
            client,
            base_url: config.exchange_base_url.clone(),
            api_key: config.exchange_api_key.clone(),
        }
    }

    /// Builds `{base}/{key}/latest/{code}`; the key is redacted from logs.
    pub fn request_for(
        &self,
        api_key: &str,
        currency_code: &str,
    ) -> Result<UpstreamRequest, UpstreamError> {
        let url = endpoint(&self.base_url, &[api_key, "latest", currency_code])?;
        Ok(UpstreamRequest::get("exchange", url).redacting(api_key))
    }

    /// Rates from `currency_code` to USD and KZT.
    ///
    /// `None` when unconfigured or when the upstream fails; a single missing
    /// target becomes "N/A" instead.
    pub async fn rates_for(&self, currency_code: &str) -> Option<ExchangeRates> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                "Exchange API key not configured, skipping rates for {}",
                currency_code
            );
            return None;
        };

        let outcome = match self.request_for(api_key, currency_code) {
            Ok(request) => self.client.call::<ExchangeRateResponse>(&request).await,
            Err(e) => Err(e),
        };

        let table = settle("exchange", outcome)?;
        let rates = ExchangeRates::from_table(currency_code, &table);
        tracing::info!("Exchange rates fetched: {:?}", rates);
        Some(rates)
    }
}

// ============ News ============

pub struct NewsService {
    client: UpstreamClient,
    base_url: String,
    api_key: Option<String>,
}

impl NewsService {
    pub fn new(config: &Config, client: UpstreamClient) -> Self {
        Self {
            client,
            base_url: config.news_base_url.clone(),
            api_key: config.news_api_key.clone(),
        }
    }

    pub fn request_for(
        &self,
        api_key: &str,
        country_name: &str,
    ) -> Result<UpstreamRequest, UpstreamError> {
        let mut url = endpoint(&self.base_url, &["everything"])?;
        url.query_pairs_mut()
            .append_pair("q", country_name)
            .append_pair("language", "en")
            .append_pair("sortBy", "relevancy")
            .append_pair("pageSize", &MAX_HEADLINES.to_string());
        Ok(UpstreamRequest::get("news", url)
            .header(HeaderName::from_static("x-api-key"), api_key))
    }

    /// Up to five headlines about `country_name`, in upstream relevance order.
    pub async fn headlines_for(&self, country_name: &str) -> Option<Vec<NewsHeadline>> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                "News API key not configured, skipping headlines for {}",
                country_name
            );
            return None;
        };

        tracing::info!("Fetching news for: {}", country_name);
        let outcome = match self.request_for(api_key, country_name) {
            Ok(request) => self.client.call::<NewsResponse>(&request).await,
            Err(e) => Err(e),
        };

        let headlines = headlines_from_articles(settle("news", outcome)?);
        tracing::info!("Fetched {} news articles", headlines.len());
        Some(headlines)
    }
}
