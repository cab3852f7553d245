/// Tests for the individual enrichment services against mocked upstreams
/// Each service must turn every failure into an absent result
use random_user_explorer::config::Config;
use random_user_explorer::core::errors::AppError;
use random_user_explorer::core::models::Rate;
use random_user_explorer::core::services::{
    CountryService, ExchangeRateService, IdentityService, NewsService,
};
use random_user_explorer::integrations::upstream_client::UpstreamClient;
use serde_json::{json, Number};
use std::time::Duration;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(server_uri: &str) -> Config {
    Config {
        port: 0,
        random_user_url: format!("{}/api/", server_uri),
        countries_base_url: format!("{}/v3.1", server_uri),
        exchange_base_url: format!("{}/v6", server_uri),
        news_base_url: format!("{}/v2", server_uri),
        exchange_api_key: Some("test_exchange_key".to_string()),
        news_api_key: Some("test_news_key".to_string()),
        upstream_timeout: Duration::from_millis(500),
        static_dir: "public".to_string(),
        rate_limit_per_second: 10,
        rate_limit_burst: 20,
    }
}

fn client(config: &Config) -> UpstreamClient {
    UpstreamClient::new(config.upstream_timeout).unwrap()
}

#[cfg(test)]
mod identity_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_results_is_hard_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = IdentityService::new(&config, client(&config));

        let result = service.fetch().await;
        assert!(matches!(result, Err(AppError::InvalidUpstreamData(_))));
    }

    #[tokio::test]
    async fn test_malformed_identity_is_hard_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"gender": "female", "name": {"first": "Only"}}]
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = IdentityService::new(&config, client(&config));

        let result = service.fetch().await;
        assert!(matches!(result, Err(AppError::InvalidUpstreamData(_))));
    }
}

#[cfg(test)]
mod country_tests {
    use super::*;

    #[tokio::test]
    async fn test_multi_word_country_is_path_escaped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3.1/name/United%20States"))
            .and(query_param("fullText", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": {"common": "United States"},
                "capital": ["Washington D.C."],
                "languages": {"eng": "English"},
                "currencies": {"USD": {"name": "United States dollar", "symbol": "$"}},
                "flags": {"png": "https://flagcdn.com/w320/us.png"}
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = CountryService::new(&config, client(&config));

        let facts = service.lookup("United States").await.unwrap();
        assert_eq!(facts.capital, "Washington D.C.");
        assert_eq!(facts.currency_code.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn test_server_error_is_absent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = CountryService::new(&config, client(&config));

        assert!(service.lookup("France").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_absent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"name": {"common": "France"}}]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = CountryService::new(&config, client(&config));

        assert!(service.lookup("France").await.is_none());
    }
}

#[cfg(test)]
mod exchange_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_target_is_sentinel_not_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/test_exchange_key/latest/GBP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "conversion_rates": {"GBP": 1, "USD": 1.27}
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = ExchangeRateService::new(&config, client(&config));

        let rates = service.rates_for("GBP").await.unwrap();
        assert_eq!(rates.base_currency, "GBP");
        assert_eq!(rates.usd_rate, Rate::Quoted(Number::from_f64(1.27).unwrap()));
        assert_eq!(rates.kzt_rate, Rate::NotAvailable);
    }

    #[tokio::test]
    async fn test_unsupported_code_is_absent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "result": "error",
                "error-type": "unsupported-code"
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = ExchangeRateService::new(&config, client(&config));

        assert!(service.rates_for("XXX").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let mock_server = MockServer::start().await;
        Mock::given(path_regex("^/v6/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.exchange_api_key = None;
        let service = ExchangeRateService::new(&config, client(&config));

        assert!(service.rates_for("EUR").await.is_none());
    }
}

#[cfg(test)]
mod news_tests {
    use super::*;

    #[tokio::test]
    async fn test_headlines_query_and_placeholders() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "South Africa"))
            .and(query_param("sortBy", "relevancy"))
            .and(query_param("language", "en"))
            .and(header("x-api-key", "test_news_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {"title": "Rand rallies", "description": null, "url": "https://news.test/a", "urlToImage": "https://img.test/a.jpg"},
                    {"title": null, "description": "Body only", "url": null, "urlToImage": null}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = NewsService::new(&config, client(&config));

        let headlines = service.headlines_for("South Africa").await.unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].title, "Rand rallies");
        assert_eq!(headlines[0].description, "No description available");
        assert_eq!(headlines[0].image.as_deref(), Some("https://img.test/a.jpg"));
        assert_eq!(headlines[1].title, "No title");
        assert_eq!(headlines[1].url, None);
    }

    #[tokio::test]
    async fn test_error_status_is_absent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid or incorrect."
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let service = NewsService::new(&config, client(&config));

        assert!(service.headlines_for("France").await.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_never_calls_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(path_regex("^/v2/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&mock_server.uri());
        config.news_api_key = None;
        let service = NewsService::new(&config, client(&config));

        for country in ["France", "Testland", "United Kingdom"] {
            assert!(service.headlines_for(country).await.is_none());
        }
    }
}
