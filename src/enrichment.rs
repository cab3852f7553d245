/// Orchestration of one "describe a random person" request.
///
/// 1. Fetch the identity (hard dependency)
/// 2. Fan out: country branch and news branch run concurrently
/// 3. Gate: the currency lookup starts only once the country branch yielded a currency code
/// 4. Join both branches; neither one's absence affects the other
/// 5. Merge into one `AggregatedResult`
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{AggregatedResult, CountryFacts, ExchangeRates, Identity};
use crate::services::{CountryService, ExchangeRateService, IdentityService, NewsService};
use crate::upstream_client::UpstreamClient;
use tracing::Instrument;
use uuid::Uuid;

pub struct EnrichmentOrchestrator {
    identity: IdentityService,
    country: CountryService,
    exchange: ExchangeRateService,
    news: NewsService,
}

impl EnrichmentOrchestrator {
    /// Builds every service around one shared HTTP client.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = UpstreamClient::new(config.upstream_timeout)?;

        Ok(Self {
            identity: IdentityService::new(config, client.clone()),
            country: CountryService::new(config, client.clone()),
            exchange: ExchangeRateService::new(config, client.clone()),
            news: NewsService::new(config, client),
        })
    }

    /// Runs the whole workflow. Fails only when the identity cannot be fetched.
    pub async fn describe_random_person(&self) -> Result<AggregatedResult, AppError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("describe_random_person", %request_id);

        async {
            tracing::info!("Step 1: Fetching identity");
            let identity = self.identity.fetch().await?;
            Ok::<_, AppError>(self.enrich(identity).await)
        }
        .instrument(span)
        .await
    }

    /// Steps 2-5. Never fails: every branch degrades to absent on its own.
    pub async fn enrich(&self, identity: Identity) -> AggregatedResult {
        let country_name = identity.country.as_str();

        tracing::info!("Step 2: Fanning out country and news branches for {}", country_name);
        let ((country_details, exchange_rates), news_headlines) = tokio::join!(
            self.country_branch(country_name),
            self.news.headlines_for(country_name)
        );

        tracing::info!(
            "Step 5: Merging (exchange rates: {}, headlines: {})",
            exchange_rates.is_some(),
            news_headlines.as_ref().map_or(0, Vec::len)
        );
        AggregatedResult::merge(identity, country_details, exchange_rates, news_headlines)
    }

    /// Country lookup followed, only when a currency code came back, by the rate lookup.
    async fn country_branch(&self, country_name: &str) -> (CountryFacts, Option<ExchangeRates>) {
        let Some(facts) = self.country.lookup(country_name).await else {
            tracing::info!(
                "Step 3: No country facts for {}, using fallback record",
                country_name
            );
            return (CountryFacts::fallback(country_name), None);
        };

        let rates = match facts.currency_code.as_deref() {
            Some(code) => {
                tracing::info!("Step 3: Currency {} resolved, fetching rates", code);
                self.exchange.rates_for(code).await
            }
            None => {
                tracing::info!("Step 3: {} lists no currency, skipping rates", country_name);
                None
            }
        };

        (facts, rates)
    }
}
